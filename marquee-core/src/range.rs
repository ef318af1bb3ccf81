//! HTTP Range header parsing and chunk-clamped window resolution.
//!
//! Implements the byte-range semantics for partial content responses:
//! a client range is parsed leniently, then resolved against the current
//! resource size into a window of at most one chunk. The server never
//! streams more than one chunk per response; clients continue playback by
//! issuing successive requests starting at the previous window's `end + 1`.

use axum::http::{HeaderMap, header};
use thiserror::Error;

/// Errors produced while interpreting a client range request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    /// The request carried no `Range` header at all.
    ///
    /// Streaming endpoints require one; the HTTP boundary answers 400.
    #[error("range header required")]
    MissingHeader,

    /// The requested start lies at or beyond the end of the resource.
    ///
    /// Answered with 416 and a `Content-Range: bytes */{total}` header so
    /// the client can learn the actual size and reissue.
    #[error("range start {start} not satisfiable for resource of {total} bytes")]
    Unsatisfiable {
        /// First byte position the client asked for.
        start: u64,
        /// Current total size of the resource.
        total: u64,
    },
}

/// A client's byte-range request, parsed from the `Range` header value.
///
/// Parsing is deliberately lenient: malformed values degrade to a best-effort
/// start position instead of a parse error, matching the tolerant behavior
/// media players rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    /// First byte position requested (inclusive).
    pub start: u64,
    /// Last byte position requested (inclusive), if the client sent one.
    ///
    /// Advisory only: window resolution always clamps to one chunk, so an
    /// explicit end never widens or narrows the response.
    pub end: Option<u64>,
}

impl RangeRequest {
    /// Parses a raw `Range` header value.
    ///
    /// The well-formed shape is `bytes=<start>-[<end>]`. Anything else falls
    /// back to the first contiguous digit run in the value as `start`, or
    /// `start = 0` when the value contains no digits.
    pub fn parse(raw: &str) -> Self {
        if let Some(spec) = raw.strip_prefix("bytes=")
            && let Some((start_str, end_str)) = spec.split_once('-')
            && let Ok(start) = start_str.trim().parse::<u64>()
        {
            let end = end_str.trim().parse::<u64>().ok();
            return Self { start, end };
        }

        Self {
            start: leading_digit_run(raw),
            end: None,
        }
    }

    /// Extracts and parses the `Range` header from a request's headers.
    ///
    /// Any present header is parsed, however malformed; non-UTF-8 bytes are
    /// replaced before the lenient parse runs, so they degrade to the digit
    /// run fallback instead of erroring.
    ///
    /// # Errors
    ///
    /// - `RangeError::MissingHeader` - No `Range` header is present.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, RangeError> {
        let raw = headers
            .get(header::RANGE)
            .ok_or(RangeError::MissingHeader)?;

        Ok(Self::parse(&String::from_utf8_lossy(raw.as_bytes())))
    }
}

/// Returns the first contiguous run of ASCII digits in `raw` as a number.
///
/// Digit-free input yields 0. Runs too long for `u64` saturate to `u64::MAX`,
/// which resolution then rejects as unsatisfiable.
fn leading_digit_run(raw: &str) -> u64 {
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();

    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

/// A validated byte window ready to stream, clamped to one chunk.
///
/// Invariant: `start <= end < total`, so the window is never empty and never
/// reaches past the final byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    /// First byte to transfer (inclusive).
    pub start: u64,
    /// Last byte to transfer (inclusive).
    pub end: u64,
    /// Total resource size the window was resolved against.
    pub total: u64,
}

impl ResolvedRange {
    /// Resolves a parsed request against the resource's current size.
    ///
    /// The window end is `min(start + chunk_size - 1, total - 1)`: at most
    /// one chunk, never past the final byte. An explicit client end is
    /// always clamped the same way, which keeps every response bounded and
    /// pushes clients into the successive-request pattern.
    ///
    /// # Errors
    ///
    /// - `RangeError::Unsatisfiable` - `start` is at or beyond `total`, or
    ///   the resource is empty.
    pub fn resolve(request: RangeRequest, total: u64, chunk_size: u64) -> Result<Self, RangeError> {
        let start = request.start;
        if start >= total {
            return Err(RangeError::Unsatisfiable { start, total });
        }

        let span = chunk_size.max(1);
        let end = start.saturating_add(span - 1).min(total - 1);

        Ok(Self { start, end, total })
    }

    /// Number of bytes in the window, always `end - start + 1`.
    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Formats the window as a `Content-Range` header value.
    pub fn content_range_header(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// Formats the `Content-Range` value for a 416 response.
pub fn unsatisfiable_content_range(total: u64) -> String {
    format!("bytes */{total}")
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use proptest::prelude::*;

    use super::*;

    const CHUNK: u64 = 1_000_000;

    #[test]
    fn parse_well_formed_range() {
        assert_eq!(
            RangeRequest::parse("bytes=100-199"),
            RangeRequest {
                start: 100,
                end: Some(199)
            }
        );
    }

    #[test]
    fn parse_open_ended_range() {
        assert_eq!(
            RangeRequest::parse("bytes=500-"),
            RangeRequest {
                start: 500,
                end: None
            }
        );
    }

    #[test]
    fn parse_falls_back_to_digit_run() {
        // Missing unit prefix still contributes its digits.
        assert_eq!(RangeRequest::parse("100-200").start, 100);
        assert_eq!(RangeRequest::parse("chunk 4096 please").start, 4096);
    }

    #[test]
    fn parse_digit_free_input_defaults_to_zero() {
        assert_eq!(
            RangeRequest::parse("garbage"),
            RangeRequest {
                start: 0,
                end: None
            }
        );
        assert_eq!(RangeRequest::parse("").start, 0);
        assert_eq!(RangeRequest::parse("bytes=-").start, 0);
    }

    #[test]
    fn parse_oversized_digit_run_saturates() {
        let raw = "bytes=99999999999999999999999999-";
        assert_eq!(RangeRequest::parse(raw).start, u64::MAX);
    }

    #[test]
    fn from_headers_requires_range() {
        let headers = HeaderMap::new();
        assert_eq!(
            RangeRequest::from_headers(&headers),
            Err(RangeError::MissingHeader)
        );
    }

    #[test]
    fn from_headers_reads_range_value() {
        let mut headers = HeaderMap::new();
        headers.insert(header::RANGE, HeaderValue::from_static("bytes=10-"));
        assert_eq!(
            RangeRequest::from_headers(&headers),
            Ok(RangeRequest {
                start: 10,
                end: None
            })
        );
    }

    #[test]
    fn from_headers_tolerates_non_utf8_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::RANGE,
            HeaderValue::from_bytes(b"bytes=\xBF7-").unwrap(),
        );
        assert_eq!(
            RangeRequest::from_headers(&headers),
            Ok(RangeRequest {
                start: 7,
                end: None
            })
        );

        // Digit-free garbage bytes degrade to start 0, not an error.
        headers.insert(header::RANGE, HeaderValue::from_bytes(b"\xFF\xFE").unwrap());
        assert_eq!(
            RangeRequest::from_headers(&headers),
            Ok(RangeRequest { start: 0, end: None })
        );
    }

    #[test]
    fn resolve_clamps_open_range_to_one_chunk() {
        let request = RangeRequest::parse("bytes=0-");
        let range = ResolvedRange::resolve(request, 2_000_000, CHUNK).unwrap();

        assert_eq!(range.start, 0);
        assert_eq!(range.end, 999_999);
        assert_eq!(range.content_length(), 1_000_000);
        assert_eq!(range.content_range_header(), "bytes 0-999999/2000000");
    }

    #[test]
    fn resolve_final_byte_yields_single_byte_window() {
        let request = RangeRequest::parse("bytes=1999999-");
        let range = ResolvedRange::resolve(request, 2_000_000, CHUNK).unwrap();

        assert_eq!(range.start, 1_999_999);
        assert_eq!(range.end, 1_999_999);
        assert_eq!(range.content_length(), 1);
        assert_eq!(range.content_range_header(), "bytes 1999999-1999999/2000000");
    }

    #[test]
    fn resolve_ignores_explicit_end() {
        // A narrow explicit range still widens to a full chunk.
        let narrow = RangeRequest::parse("bytes=0-5");
        let range = ResolvedRange::resolve(narrow, 2_000_000, CHUNK).unwrap();
        assert_eq!(range.end, 999_999);

        // A wide explicit range is cut down to one chunk.
        let wide = RangeRequest::parse("bytes=0-1999999");
        let range = ResolvedRange::resolve(wide, 2_000_000, CHUNK).unwrap();
        assert_eq!(range.end, 999_999);
    }

    #[test]
    fn resolve_rejects_start_past_eof() {
        let request = RangeRequest::parse("bytes=2000000-");
        assert_eq!(
            ResolvedRange::resolve(request, 2_000_000, CHUNK),
            Err(RangeError::Unsatisfiable {
                start: 2_000_000,
                total: 2_000_000
            })
        );
    }

    #[test]
    fn resolve_rejects_empty_resource() {
        let request = RangeRequest::parse("bytes=0-");
        assert_eq!(
            ResolvedRange::resolve(request, 0, CHUNK),
            Err(RangeError::Unsatisfiable { start: 0, total: 0 })
        );
    }

    #[test]
    fn unsatisfiable_header_names_total() {
        assert_eq!(unsatisfiable_content_range(2_000_000), "bytes */2000000");
    }

    proptest! {
        /// Every valid (start, total) resolves to a window inside the
        /// resource with a positive length of at most one chunk.
        #[test]
        fn resolved_window_stays_in_bounds(
            total in 1u64..10_000_000,
            offset in 0u64..10_000_000,
        ) {
            let start = offset % total;
            let request = RangeRequest { start, end: None };
            let range = ResolvedRange::resolve(request, total, CHUNK).unwrap();

            prop_assert!(range.start <= range.end);
            prop_assert!(range.end < total);
            prop_assert_eq!(range.content_length(), range.end - range.start + 1);
            prop_assert!(range.content_length() > 0);
            prop_assert!(range.content_length() <= CHUNK);
        }
    }
}
