//! Centralized configuration for Marquee.
//!
//! All tunable parameters and settings are defined here and passed into
//! components at construction; nothing reads ambient globals at request
//! time.

use std::path::PathBuf;

/// Central configuration for all Marquee components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct MarqueeConfig {
    pub streaming: StreamingConfig,
    pub library: LibraryConfig,
    pub http: HttpConfig,
}

/// Range-streaming behavior.
///
/// Controls how large each partial-content response is and how the stream
/// reads from the backing store.
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    /// Maximum bytes per range response; every window is clamped to this
    pub chunk_size: u64,
    /// Read granularity inside the body stream
    pub io_read_size: usize,
    /// Content type served when the resource's own cannot be determined
    pub fallback_content_type: &'static str,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1_000_000, // one chunk per response
            io_read_size: 65536,   // 64 KiB
            fallback_content_type: "video/mp4",
        }
    }
}

/// Media locations.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Directory scanned for library entries
    pub media_root: PathBuf,
    /// Default feature resource served by the plain video endpoint
    pub feature_path: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("./media"),
            feature_path: PathBuf::from("./media/feature.mp4"),
        }
    }
}

/// HTTP server binding.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Address to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl MarqueeConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults. Unparsable values keep the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(chunk) = std::env::var("MARQUEE_CHUNK_SIZE")
            && let Ok(bytes) = chunk.parse::<u64>()
            && bytes > 0
        {
            config.streaming.chunk_size = bytes;
        }

        if let Ok(root) = std::env::var("MARQUEE_MEDIA_ROOT") {
            config.library.media_root = PathBuf::from(root);
        }

        if let Ok(video) = std::env::var("MARQUEE_VIDEO") {
            config.library.feature_path = PathBuf::from(video);
        }

        if let Ok(host) = std::env::var("MARQUEE_HOST") {
            config.http.host = host;
        }

        if let Ok(port) = std::env::var("MARQUEE_PORT")
            && let Ok(value) = port.parse::<u16>()
        {
            config.http.port = value;
        }

        config
    }

    /// Creates a configuration optimized for testing.
    ///
    /// Small chunks so window math is exercised on tiny fixtures.
    pub fn for_testing() -> Self {
        Self {
            streaming: StreamingConfig {
                chunk_size: 16,
                io_read_size: 8,
                fallback_content_type: "video/mp4",
            },
            ..Default::default()
        }
    }
}
