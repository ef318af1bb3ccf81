//! Integration tests for chunked range streaming
//!
//! Walks resources through the streamer window by window and verifies that
//! successive requests reconstruct the original bytes exactly, that every
//! window stays within the configured chunk size, and that the store-level
//! range validation rejects windows past the end of a resource.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::to_bytes;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use marquee_core::config::StreamingConfig;
use marquee_core::store::{MediaStore, RangeReader, StoreError, StoreResult};
use marquee_core::streaming::RangeStreamer;

/// Test store serving complete in-memory buffers for range walking
struct InMemoryStore {
    resources: HashMap<String, Vec<u8>>,
}

impl InMemoryStore {
    fn new() -> Self {
        Self {
            resources: HashMap::new(),
        }
    }

    fn insert(&mut self, id: &str, data: Vec<u8>) {
        self.resources.insert(id.to_string(), data);
    }
}

#[async_trait]
impl MediaStore for InMemoryStore {
    async fn size_of(&self, id: &str) -> StoreResult<u64> {
        self.resources
            .get(id)
            .map(|data| data.len() as u64)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    async fn exists(&self, id: &str) -> bool {
        self.resources.contains_key(id)
    }

    async fn open_range(&self, id: &str, start: u64, end: u64) -> StoreResult<RangeReader> {
        let data = self
            .resources
            .get(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        if start > end {
            return Err(StoreError::InvalidRange { start, end });
        }
        if end >= data.len() as u64 {
            return Err(StoreError::RangeExceedsResource {
                start,
                end,
                size: data.len() as u64,
            });
        }

        let window = data[start as usize..=end as usize].to_vec();
        Ok(Box::new(std::io::Cursor::new(window)))
    }
}

fn streamer_with(resources: &[(&str, Vec<u8>)], chunk_size: u64) -> RangeStreamer {
    let mut store = InMemoryStore::new();
    for (id, data) in resources {
        store.insert(id, data.clone());
    }
    let config = StreamingConfig {
        chunk_size,
        io_read_size: 256,
        fallback_content_type: "video/mp4",
    };
    RangeStreamer::new(Arc::new(store), config)
}

fn range_headers(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::RANGE, HeaderValue::from_str(value).unwrap());
    headers
}

fn parse_content_range(headers: &HeaderMap) -> (u64, u64, u64) {
    let value = headers
        .get(header::CONTENT_RANGE)
        .unwrap()
        .to_str()
        .unwrap();
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
async fn sequential_windows_reconstruct_resource() {
    let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    let chunk_size = 1024u64;
    let streamer = streamer_with(&[("movie", data.clone())], chunk_size);

    let mut reassembled = Vec::new();
    let mut position = 0u64;
    let mut requests = 0u32;

    loop {
        let response = streamer
            .stream(
                "movie",
                &range_headers(&format!("bytes={position}-")),
                "video/mp4",
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);

        let (start, end, total) = parse_content_range(response.headers());
        assert_eq!(start, position);
        assert_eq!(total, data.len() as u64);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.len() as u64, end - start + 1);

        if end + 1 < total {
            // Interior windows are always full chunks
            assert_eq!(body.len() as u64, chunk_size);
        }
        reassembled.extend_from_slice(&body);
        requests += 1;

        if end + 1 == total {
            break;
        }
        position = end + 1;
    }

    assert_eq!(reassembled, data);
    assert_eq!(requests, 10);
    // The terminal window carries the remainder
    assert_eq!(data.len() as u64 % chunk_size, 784);
}

#[tokio::test]
async fn single_window_covers_small_resource() {
    let data: Vec<u8> = (0..100u8).collect();
    let streamer = streamer_with(&[("short", data.clone())], 1024);

    let response = streamer
        .stream("short", &range_headers("bytes=0-"), "video/mp4")
        .await
        .unwrap();

    let (start, end, total) = parse_content_range(response.headers());
    assert_eq!((start, end, total), (0, 99, 100));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], &data[..]);
}

#[tokio::test]
async fn repeated_requests_are_stateless() {
    let data: Vec<u8> = (0..5_000u32).map(|i| (i % 7) as u8).collect();
    let streamer = streamer_with(&[("movie", data.clone())], 1024);

    let mut windows = Vec::new();
    for _ in 0..2 {
        let response = streamer
            .stream("movie", &range_headers("bytes=2048-"), "video/mp4")
            .await
            .unwrap();
        let range = parse_content_range(response.headers());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        windows.push((range, body.to_vec()));
    }

    // No per-client state: identical requests yield identical windows
    assert_eq!(windows[0], windows[1]);
    assert_eq!(windows[0].0, (2048, 3071, 5000));
}

#[tokio::test]
async fn open_range_past_resource_end_is_rejected() {
    let mut store = InMemoryStore::new();
    store.insert("movie", vec![0u8; 500]);

    let result = store.open_range("movie", 0, 500).await;
    assert!(matches!(
        result,
        Err(StoreError::RangeExceedsResource { size: 500, .. })
    ));
}

#[tokio::test]
async fn open_range_of_final_byte_succeeds() {
    let mut store = InMemoryStore::new();
    let mut data = vec![0u8; 500];
    data[499] = 0xAB;
    store.insert("movie", data);

    let mut reader = store.open_range("movie", 499, 499).await.unwrap();
    let mut buffer = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buffer)
        .await
        .unwrap();
    assert_eq!(buffer, vec![0xAB]);
}
