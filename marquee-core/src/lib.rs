//! Marquee Core - Range-streaming and media library functionality
//!
//! This crate provides the building blocks for chunked HTTP range
//! streaming of local media: range header parsing and window resolution,
//! a substitutable backing-store abstraction, a filesystem media library,
//! and configuration management.

pub mod config;
pub mod library;
pub mod range;
pub mod store;
pub mod streaming;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::MarqueeConfig;
pub use library::{MediaFile, MediaLibrary};
pub use range::{RangeError, RangeRequest, ResolvedRange};
pub use store::{FEATURE_ID, FsMediaStore, MediaStore, StoreError};
pub use streaming::{RangeStreamer, StreamPhase};

/// Core errors that can bubble up from any Marquee subsystem.
#[derive(Debug, thiserror::Error)]
pub enum MarqueeError {
    #[error("Range error: {0}")]
    Range(#[from] RangeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MarqueeError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            MarqueeError::Range(RangeError::MissingHeader) => {
                "Requires Range header".to_string()
            }
            MarqueeError::Range(RangeError::Unsatisfiable { start, total }) => {
                format!("Position {start} is outside the {total}-byte resource")
            }
            MarqueeError::Store(StoreError::NotFound { id }) => {
                format!("Media resource {id} not found")
            }
            MarqueeError::Store(_) => "Storage error occurred".to_string(),
            MarqueeError::Configuration { reason } => format!("Configuration error: {reason}"),
            MarqueeError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error is due to client or user input, not a server fault.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            MarqueeError::Range(_)
                | MarqueeError::Store(StoreError::NotFound { .. })
                | MarqueeError::Configuration { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MarqueeError>;
