//! Marquee Web - HTTP streaming server
//!
//! Serves library media over HTTP with range request support.
//! Provides JSON endpoints for browsing the library and byte-range
//! streaming endpoints for playback.

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]

pub mod handlers;
pub mod server;

// Re-export main types
pub use server::{AppState, build_router, run_server};
