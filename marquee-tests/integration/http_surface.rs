//! End-to-end tests for the HTTP streaming surface
//!
//! Exercises the full router over a real filesystem store: header handling,
//! error statuses, CORS, and the successive-window walk a video player
//! performs during playback.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use marquee_core::config::MarqueeConfig;
use marquee_core::store::test_fixtures::create_temp_media_dir;
use marquee_web::{AppState, build_router};
use tempfile::TempDir;
use tower::ServiceExt;

async fn media_router(
    feature: &[u8],
    files: &[(&str, &[u8])],
    chunk_size: u64,
) -> (TempDir, Router) {
    let (dir, feature_path) = create_temp_media_dir(feature, files);

    let mut config = MarqueeConfig::for_testing();
    config.streaming.chunk_size = chunk_size;
    config.library.media_root = dir.path().to_path_buf();
    config.library.feature_path = feature_path;

    let state = AppState::from_config(config);
    state.library.scan().await.unwrap();
    (dir, build_router(state))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_range(uri: &str, range: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::RANGE, range)
        .body(Body::empty())
        .unwrap()
}

fn parse_content_range(value: &str) -> (u64, u64, u64) {
    let spec = value.strip_prefix("bytes ").unwrap();
    let (window, total) = spec.split_once('/').unwrap();
    let (start, end) = window.split_once('-').unwrap();
    (
        start.parse().unwrap(),
        end.parse().unwrap(),
        total.parse().unwrap(),
    )
}

#[tokio::test]
async fn response_headers_describe_window() {
    let data: Vec<u8> = (0..3000u32).map(|i| (i % 256) as u8).collect();
    let (_dir, router) = media_router(&data, &[], 1024).await;

    let response = router
        .oneshot(get_range("/video", "bytes=1024-"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    let headers = response.headers();
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "video/mp4");
    assert_eq!(headers.get(header::ACCEPT_RANGES).unwrap(), "bytes");
    assert_eq!(
        headers.get(header::CONTENT_RANGE).unwrap(),
        "bytes 1024-2047/3000"
    );
    assert_eq!(headers.get(header::CONTENT_LENGTH).unwrap(), "1024");

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], &data[1024..2048]);
}

#[tokio::test]
async fn successive_requests_reconstruct_feature() {
    let data: Vec<u8> = (0..3000u32).map(|i| (i % 199) as u8).collect();
    let (_dir, router) = media_router(&data, &[], 1024).await;

    let mut reassembled = Vec::new();
    let mut position = 0u64;
    let mut requests = 0u32;

    loop {
        let response = router
            .clone()
            .oneshot(get_range("/video", &format!("bytes={position}-")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);

        let content_range = response
            .headers()
            .get(header::CONTENT_RANGE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let (_, end, total) = parse_content_range(&content_range);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        reassembled.extend_from_slice(&body);
        requests += 1;

        if end + 1 == total {
            break;
        }
        position = end + 1;
    }

    assert_eq!(reassembled, data);
    assert_eq!(requests, 3);
}

#[tokio::test]
async fn missing_range_is_bad_request() {
    let (_dir, router) = media_router(b"feature", &[], 1024).await;

    let response = router.oneshot(get("/video")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"Requires Range header");
}

#[tokio::test]
async fn start_past_end_is_range_not_satisfiable() {
    let (_dir, router) = media_router(&[0u8; 3000], &[], 1024).await;

    let response = router
        .oneshot(get_range("/video", "bytes=3000-"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(
        response.headers().get(header::CONTENT_RANGE).unwrap(),
        "bytes */3000"
    );
}

#[tokio::test]
async fn unknown_media_id_is_not_found() {
    let (_dir, router) = media_router(b"feature", &[], 1024).await;

    let response = router
        .oneshot(get_range("/video/0123456789abcdef", "bytes=0-"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cors_allows_cross_origin_playback() {
    let (_dir, router) = media_router(b"feature-bytes", &[], 1024).await;

    let request = Request::builder()
        .uri("/video")
        .header(header::RANGE, "bytes=0-")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn library_browse_then_stream() {
    let (_dir, router) = media_router(
        b"feature",
        &[("Night.Drive.webm", b"night-drive-bytes")],
        1024,
    )
    .await;

    // Browse the library for the scanned entry
    let response = router.clone().oneshot(get("/api/library")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let listing: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let entry = listing["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["title"] == "Night Drive")
        .unwrap();
    let id = entry["id"].as_str().unwrap();
    assert_eq!(entry["size"].as_u64().unwrap(), 17);

    // Fetch the entry directly
    let response = router
        .clone()
        .oneshot(get(&format!("/api/library/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Stream it with the content type derived from its extension
    let response = router
        .oneshot(get_range(&format!("/video/{id}"), "bytes=0-"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "video/webm"
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"night-drive-bytes");
}
