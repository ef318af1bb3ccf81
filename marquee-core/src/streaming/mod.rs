//! Range-streaming pipeline for partial content delivery.
//!
//! The pipeline validates a client's `Range` header, resolves it into a
//! chunk-clamped window against the backing store's fresh size, and emits a
//! 206 response whose body streams exactly that window. Byte transfer is
//! delegated to the [`MediaStore`](crate::store::MediaStore) collaborator;
//! this module owns the protocol semantics and the per-request lifecycle.

pub mod streamer;

pub use streamer::RangeStreamer;

/// Lifecycle of one range request, observable in debug logs.
///
/// Every request starts at `Idle` and ends in exactly one of the terminal
/// phases. `Validating` covers header and resource checks before any bytes
/// move; `RangeResolved` marks a committed window; `Streaming` begins once
/// response headers are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    /// Constructed, not yet handling the request.
    Idle,
    /// Checking the range header and resource presence.
    Validating,
    /// Window resolved and validated against the resource size.
    RangeResolved,
    /// Response headers sent; body bytes in flight.
    Streaming,
    /// All bytes in the window were delivered.
    Completed,
    /// Terminated early: validation failure, I/O error, or disconnect.
    Aborted,
}

impl StreamPhase {
    /// Whether this phase ends the request.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}
