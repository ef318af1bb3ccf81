//! Integration tests for Marquee
//!
//! These tests verify the integration between different components of the system.
//! They walk resources through the streamer window by window, exercise the full
//! HTTP surface against a real filesystem store, and enforce workspace style rules.

#[path = "style.rs"]
mod style;

#[path = "integration/range_streaming.rs"]
mod range_streaming;

#[path = "integration/http_surface.rs"]
mod http_surface;
