//! Chunk-clamped partial content responses over a media store.
//!
//! [`RangeStreamer`] is the request-level entry point: it turns a resource
//! id plus request headers into a 206 response streaming one chunk-clamped
//! window. The store handle backing the body lives inside the stream state,
//! so completion, mid-stream failure, and client disconnect all release it
//! the same way: by dropping the stream.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::{Bytes, BytesMut};
use futures::{Stream, stream};
use tokio::io::AsyncReadExt;
use tracing::{debug, error};

use crate::config::StreamingConfig;
use crate::range::{RangeRequest, ResolvedRange};
use crate::store::{MediaStore, RangeReader};
use crate::streaming::StreamPhase;

/// Produces bounded partial-content responses for media resources.
///
/// Holds no per-request state; concurrent requests are fully independent,
/// each opening its own bounded read handle on the store.
pub struct RangeStreamer {
    store: Arc<dyn MediaStore>,
    config: StreamingConfig,
}

impl RangeStreamer {
    /// Creates a streamer over `store` with explicit streaming settings.
    pub fn new(store: Arc<dyn MediaStore>, config: StreamingConfig) -> Self {
        Self { store, config }
    }

    /// Maximum bytes any single response will carry.
    pub fn chunk_size(&self) -> u64 {
        self.config.chunk_size
    }

    /// Streams one chunk-clamped window of `id` as a 206 response.
    ///
    /// The window always starts at the requested position and never exceeds
    /// one chunk; a client wanting more issues its next request at the
    /// previous window's `end + 1`. The resource size is queried fresh, so
    /// a file replaced since the last request resolves against its new
    /// size.
    ///
    /// # Errors
    ///
    /// - `RangeError::MissingHeader` - Request carried no `Range` header
    /// - `RangeError::Unsatisfiable` - Requested start is at or past the
    ///   resource's end
    /// - `StoreError::NotFound` - No resource under this id
    /// - `StoreError::Io` - Opening the bounded read handle failed
    pub async fn stream(
        &self,
        id: &str,
        headers: &HeaderMap,
        content_type: &str,
    ) -> crate::Result<Response> {
        trace_phase(id, StreamPhase::Validating);

        let request = RangeRequest::from_headers(headers)?;
        let total = self.store.size_of(id).await?;
        let range = ResolvedRange::resolve(request, total, self.config.chunk_size)?;

        trace_phase(id, StreamPhase::RangeResolved);
        debug!(
            resource = id,
            start = range.start,
            end = range.end,
            total,
            requested_end = ?request.end,
            "resolved range window"
        );

        let reader = self.store.open_range(id, range.start, range.end).await?;

        trace_phase(id, StreamPhase::Streaming);
        let body = Body::from_stream(range_body(
            reader,
            range,
            self.config.io_read_size,
            id.to_string(),
        ));

        let response = Response::builder()
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_LENGTH, range.content_length().to_string())
            .header(header::CONTENT_RANGE, range.content_range_header())
            .header(header::ACCEPT_RANGES, "bytes")
            .body(body)
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response());

        Ok(response)
    }
}

fn trace_phase(resource: &str, phase: StreamPhase) {
    debug!(resource, phase = ?phase, "stream phase");
}

/// State threaded through the body stream.
///
/// Owns the bounded read handle; dropping the state (stream finished,
/// errored, or abandoned by a disconnecting client) releases it.
struct BodyState {
    reader: RangeReader,
    resource: String,
    remaining: u64,
    read_size: usize,
    failed: bool,
}

impl Drop for BodyState {
    fn drop(&mut self) {
        // Reached only on client disconnect: completion and read failures
        // drain `remaining` before the state is dropped.
        if self.remaining > 0 {
            trace_phase(&self.resource, StreamPhase::Aborted);
            debug!(
                resource = %self.resource,
                undelivered = self.remaining,
                "stream dropped before completion"
            );
        }
    }
}

/// Streams the resolved window from `reader` in store-read-sized pieces.
///
/// A read failure or premature end of the resource yields one `Err` item
/// and fuses the stream; the transport terminates the connection, which is
/// the only remaining signal once partial-content headers are out.
fn range_body(
    reader: RangeReader,
    range: ResolvedRange,
    read_size: usize,
    resource: String,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
    let state = BodyState {
        reader,
        resource,
        remaining: range.content_length(),
        read_size: read_size.max(1),
        failed: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.remaining == 0 {
            if !state.failed {
                trace_phase(&state.resource, StreamPhase::Completed);
            }
            return None;
        }

        let capacity = (state.read_size as u64).min(state.remaining) as usize;
        let mut buf = BytesMut::with_capacity(capacity);

        match state.reader.read_buf(&mut buf).await {
            Ok(0) => {
                trace_phase(&state.resource, StreamPhase::Aborted);
                error!(
                    resource = %state.resource,
                    undelivered = state.remaining,
                    "resource ended before the resolved window; terminating stream"
                );
                state.remaining = 0;
                state.failed = true;
                Some((
                    Err(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "resource shorter than resolved window",
                    )),
                    state,
                ))
            }
            Ok(n) => {
                state.remaining -= n as u64;
                Some((Ok(buf.freeze()), state))
            }
            Err(e) => {
                trace_phase(&state.resource, StreamPhase::Aborted);
                error!(
                    resource = %state.resource,
                    error = %e,
                    "read failed mid-stream; terminating connection"
                );
                state.remaining = 0;
                state.failed = true;
                Some((Err(e), state))
            }
        }
    })
}
