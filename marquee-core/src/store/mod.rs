//! Backing store abstraction for media resources.
//!
//! Streaming never touches the filesystem directly; it goes through the
//! [`MediaStore`] trait, which exposes exactly the three capabilities range
//! streaming needs: a fresh size query, an existence check, and a bounded
//! read handle over an inclusive byte window. Any filesystem, object store,
//! or in-memory implementation satisfying the contract is substitutable.

pub mod fs;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;

use async_trait::async_trait;
use tokio::io::AsyncRead;

pub use fs::FsMediaStore;

/// Resource id reserved for the default feature presentation.
///
/// The plain `/video` endpoint streams this resource; library entries use
/// their scan-derived ids instead.
pub const FEATURE_ID: &str = "feature";

/// Bounded read handle over one resource window.
///
/// The handle owns whatever underlying resource it reads from (typically an
/// open file descriptor) and yields at most the window's length. Dropping it
/// releases the resource, so abandoning a stream mid-transfer cannot leak
/// handles.
pub type RangeReader = Box<dyn AsyncRead + Send + Unpin>;

/// Unified error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No resource is registered under the requested id.
    #[error("resource not found: {id}")]
    NotFound {
        /// Id the caller asked for.
        id: String,
    },

    /// Byte window is malformed (start past end).
    #[error("invalid range: start {start} > end {end}")]
    InvalidRange {
        /// Start byte position of the invalid window.
        start: u64,
        /// End byte position of the invalid window.
        end: u64,
    },

    /// Requested window extends beyond the resource.
    #[error("range {start}-{end} exceeds resource size {size}")]
    RangeExceedsResource {
        /// Start byte position of the window.
        start: u64,
        /// End byte position of the window.
        end: u64,
        /// Current size of the resource.
        size: u64,
    },

    /// Underlying I/O operation failed.
    #[error("i/o error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Capabilities a backing store must provide for range streaming.
///
/// Size is queried fresh on every call; implementations must not cache it,
/// since a resource may be replaced between requests.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Returns the resource's current total size in bytes.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` - No resource under this id
    /// - `StoreError::Io` - Size query failed
    async fn size_of(&self, id: &str) -> StoreResult<u64>;

    /// Reports whether a resource currently exists under this id.
    async fn exists(&self, id: &str) -> bool;

    /// Opens a read handle bounded to the inclusive window `[start, end]`.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` - No resource under this id
    /// - `StoreError::InvalidRange` - `start` is past `end`
    /// - `StoreError::RangeExceedsResource` - Window reaches past the
    ///   resource's current size
    /// - `StoreError::Io` - Opening or positioning the handle failed
    async fn open_range(&self, id: &str, start: u64, end: u64) -> StoreResult<RangeReader>;
}
