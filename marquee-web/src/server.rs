//! HTTP server setup and request routing

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use marquee_core::config::MarqueeConfig;
use marquee_core::library::MediaLibrary;
use marquee_core::store::FsMediaStore;
use marquee_core::streaming::RangeStreamer;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::handlers::{api_library, api_library_entry, stream_feature, stream_media};

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Scanned media library backing the browse endpoints.
    pub library: Arc<MediaLibrary>,
    /// Range streamer shared by all playback endpoints.
    pub streamer: Arc<RangeStreamer>,
    /// Server configuration captured at startup.
    pub config: MarqueeConfig,
}

impl AppState {
    /// Creates handler state from configuration, wiring the library and
    /// filesystem store together.
    pub fn from_config(config: MarqueeConfig) -> Self {
        let library = Arc::new(MediaLibrary::new(&config.library.media_root));
        let store = Arc::new(FsMediaStore::new(
            Arc::clone(&library),
            config.library.feature_path.clone(),
        ));
        let streamer = Arc::new(RangeStreamer::new(store, config.streaming.clone()));

        Self {
            library,
            streamer,
            config,
        }
    }
}

/// Assembles the application router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Streaming endpoints
        .route("/video", get(stream_feature))
        .route("/video/{id}", get(stream_media))
        // Library API endpoints
        .route("/api/library", get(api_library))
        .route("/api/library/{id}", get(api_library_entry))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Starts the HTTP server and runs until shutdown.
///
/// Scans the media library once at startup, then serves streaming and
/// library endpoints on the configured address.
///
/// # Errors
///
/// - `Box<dyn std::error::Error + Send + Sync>` - If binding the listener or
///   serving fails
pub async fn run_server(
    config: MarqueeConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let state = AppState::from_config(config);

    match state.library.scan().await {
        Ok(count) => {
            println!(
                "Found {} media files in {}",
                count,
                state.library.media_root().display()
            );
        }
        Err(e) => {
            warn!(
                "Library scan failed for {}: {e}",
                state.library.media_root().display()
            );
        }
    }

    let app = build_router(state);

    println!("Marquee media server running on http://{addr}");
    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn run_server_surfaces_bind_failure() {
        let blocker = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = blocker.local_addr().unwrap().port();

        let dir = TempDir::new().unwrap();
        let mut config = MarqueeConfig::for_testing();
        config.http.port = port;
        config.library.media_root = dir.path().to_path_buf();

        let result = run_server(config).await;
        assert!(result.is_err());
    }
}
