//! Video streaming handlers with HTTP range support

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use marquee_core::range::unsatisfiable_content_range;
use marquee_core::store::{FEATURE_ID, StoreError};
use marquee_core::{MarqueeError, RangeError};
use tracing::error;

use crate::server::AppState;

/// Streams the configured feature video.
///
/// Always served as the configured fallback content type. Requires a
/// `Range` header; requests without one are rejected with 400.
pub async fn stream_feature(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let content_type = state.config.streaming.fallback_content_type;
    serve_range(&state, FEATURE_ID, content_type, &headers).await
}

/// Streams a library entry by its identifier.
///
/// Content type is guessed from the file extension, falling back to the
/// configured default for unrecognized extensions.
pub async fn stream_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let content_type = match state.library.find(&id).await {
        Some(file) => mime_guess::from_path(&file.path)
            .first_raw()
            .unwrap_or(state.config.streaming.fallback_content_type),
        None => state.config.streaming.fallback_content_type,
    };
    serve_range(&state, &id, content_type, &headers).await
}

async fn serve_range(
    state: &AppState,
    id: &str,
    content_type: &str,
    headers: &HeaderMap,
) -> Response {
    match state.streamer.stream(id, headers, content_type).await {
        Ok(response) => response,
        Err(e) => error_response(id, e),
    }
}

/// Maps streaming failures to HTTP error responses.
fn error_response(id: &str, error: MarqueeError) -> Response {
    match &error {
        MarqueeError::Range(RangeError::MissingHeader) => Response::builder()
            .status(StatusCode::BAD_REQUEST)
            .body(Body::from(error.user_message()))
            .unwrap_or_else(|_| StatusCode::BAD_REQUEST.into_response()),
        MarqueeError::Range(RangeError::Unsatisfiable { total, .. }) => Response::builder()
            .status(StatusCode::RANGE_NOT_SATISFIABLE)
            .header(header::CONTENT_RANGE, unsatisfiable_content_range(*total))
            .body(Body::from(error.user_message()))
            .unwrap_or_else(|_| StatusCode::RANGE_NOT_SATISFIABLE.into_response()),
        MarqueeError::Store(StoreError::NotFound { .. }) => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from(error.user_message()))
            .unwrap_or_else(|_| StatusCode::NOT_FOUND.into_response()),
        _ => {
            error!("Streaming failed for {id}: {error}");
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::from("Internal server error"))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::to_bytes;
    use axum::http::Request;
    use marquee_core::config::MarqueeConfig;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::server::{AppState, build_router};

    async fn test_router(feature: &[u8], library_files: &[(&str, &[u8])]) -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        let feature_path = dir.path().join("feature.mp4");
        std::fs::write(&feature_path, feature).unwrap();
        for (name, data) in library_files {
            std::fs::write(dir.path().join(name), data).unwrap();
        }

        let mut config = MarqueeConfig::for_testing();
        config.library.media_root = dir.path().to_path_buf();
        config.library.feature_path = feature_path;

        let state = AppState::from_config(config);
        state.library.scan().await.unwrap();
        (dir, build_router(state))
    }

    fn range_request(uri: &str, range: &str) -> Request<axum::body::Body> {
        Request::builder()
            .uri(uri)
            .header("Range", range)
            .body(axum::body::Body::empty())
            .unwrap()
    }

    async fn library_id(router: &Router, title_fragment: &str) -> String {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/library")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        value["items"]
            .as_array()
            .unwrap()
            .iter()
            .find(|item| {
                item["title"]
                    .as_str()
                    .unwrap()
                    .to_lowercase()
                    .contains(title_fragment)
            })
            .unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn feature_stream_returns_partial_content() {
        let data: Vec<u8> = (0..64u8).collect();
        let (_dir, router) = test_router(&data, &[]).await;

        let response = router
            .oneshot(range_request("/video", "bytes=0-"))
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::PARTIAL_CONTENT);
        let headers = response.headers().clone();
        assert_eq!(headers.get("content-type").unwrap(), "video/mp4");
        assert_eq!(headers.get("accept-ranges").unwrap(), "bytes");
        // for_testing() uses a 16 byte chunk, so only the first window is served
        assert_eq!(headers.get("content-range").unwrap(), "bytes 0-15/64");
        assert_eq!(headers.get("content-length").unwrap(), "16");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], &data[..16]);
    }

    #[tokio::test]
    async fn missing_range_header_is_rejected() {
        let (_dir, router) = test_router(b"feature", &[]).await;

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/video")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Requires Range header");
    }

    #[tokio::test]
    async fn range_past_end_returns_416_with_total_size() {
        let (_dir, router) = test_router(&[0u8; 64], &[]).await;

        let response = router
            .oneshot(range_request("/video", "bytes=64-"))
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            axum::http::StatusCode::RANGE_NOT_SATISFIABLE
        );
        assert_eq!(
            response.headers().get("content-range").unwrap(),
            "bytes */64"
        );
    }

    #[tokio::test]
    async fn library_stream_uses_extension_content_type() {
        let (_dir, router) = test_router(b"feature", &[("clip.webm", b"webm-bytes")]).await;

        let id = library_id(&router, "clip").await;
        let response = router
            .oneshot(range_request(&format!("/video/{id}"), "bytes=0-"))
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "video/webm"
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"webm-bytes");
    }

    #[tokio::test]
    async fn unknown_library_id_returns_not_found() {
        let (_dir, router) = test_router(b"feature", &[]).await;

        let response = router
            .oneshot(range_request("/video/deadbeefdeadbeef", "bytes=0-"))
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn explicit_end_is_overridden_by_chunk_window() {
        let data: Vec<u8> = (0..64u8).collect();
        let (_dir, router) = test_router(&data, &[]).await;

        // Client asks for 4 bytes; the server still serves its full window.
        let response = router
            .oneshot(range_request("/video", "bytes=4-7"))
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            response.headers().get("content-range").unwrap(),
            "bytes 4-19/64"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], &data[4..=19]);
    }
}
