//! HTTP request handlers organized by functionality

pub mod api;
pub mod streaming;

// Re-export handler functions
pub use api::{LibraryQuery, api_library, api_library_entry};
pub use streaming::{stream_feature, stream_media};
