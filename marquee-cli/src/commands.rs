//! CLI command implementations

use std::path::PathBuf;

use clap::Subcommand;
use marquee_core::MarqueeError;
use marquee_core::config::MarqueeConfig;
use marquee_core::library::MediaLibrary;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the streaming server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory scanned for media files
        #[arg(long)]
        media_root: Option<PathBuf>,
        /// Video file served at /video
        #[arg(long)]
        video: Option<PathBuf>,
        /// Maximum bytes served per range response
        #[arg(long)]
        chunk_size: Option<u64>,
    },
    /// Scan the media directory and list playable files
    Library {
        /// Directory scanned for media files
        #[arg(long)]
        media_root: Option<PathBuf>,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve {
            host,
            port,
            media_root,
            video,
            chunk_size,
        } => serve(host, port, media_root, video, chunk_size).await,
        Commands::Library { media_root } => list_library(media_root).await,
    }
}

/// Start the HTTP streaming server
///
/// Configuration is read from `MARQUEE_*` environment variables, with
/// command-line flags taking precedence.
///
/// # Errors
/// - `MarqueeError::Configuration` - Invalid configuration values
/// - Server startup errors when binding or serving fails
pub async fn serve(
    host: Option<String>,
    port: Option<u16>,
    media_root: Option<PathBuf>,
    video: Option<PathBuf>,
    chunk_size: Option<u64>,
) -> anyhow::Result<()> {
    let config = resolve_config(host, port, media_root, video, chunk_size)?;

    println!("Starting Marquee media server...");
    println!("Host: {}", config.http.host);
    println!("Port: {}", config.http.port);
    println!("Media root: {}", config.library.media_root.display());
    println!("Feature video: {}", config.library.feature_path.display());
    println!("Chunk size: {} bytes", config.streaming.chunk_size);
    println!("{:-<50}", "");
    println!("Press Ctrl+C to stop the server");

    marquee_web::run_server(config)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}

/// Scan the media directory and print all playable files
///
/// # Errors
/// - `std::io::Error` - Media directory cannot be read
pub async fn list_library(media_root: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = MarqueeConfig::from_env();
    if let Some(root) = media_root {
        config.library.media_root = root;
    }

    let library = MediaLibrary::new(&config.library.media_root);
    let count = library.scan().await?;

    println!("Media Library");
    println!("{:-<60}", "");

    if count == 0 {
        println!(
            "No media files found in {}",
            config.library.media_root.display()
        );
        println!("Supported extensions: mp4, mkv, avi, mov, m4v, webm, flv");
        return Ok(());
    }

    for file in library.all().await {
        println!(
            "{:<16}  {:>10}  {}",
            file.id,
            format_size(file.size),
            file.title
        );
    }
    println!(
        "\n{} files in {}",
        count,
        config.library.media_root.display()
    );

    Ok(())
}

/// Merge environment configuration with command-line overrides
fn resolve_config(
    host: Option<String>,
    port: Option<u16>,
    media_root: Option<PathBuf>,
    video: Option<PathBuf>,
    chunk_size: Option<u64>,
) -> Result<MarqueeConfig, MarqueeError> {
    let mut config = MarqueeConfig::from_env();

    if let Some(host) = host {
        config.http.host = host;
    }
    if let Some(port) = port {
        config.http.port = port;
    }
    if let Some(root) = media_root {
        config.library.media_root = root;
    }
    if let Some(video) = video {
        config.library.feature_path = video;
    }
    if let Some(chunk) = chunk_size {
        config.streaming.chunk_size = chunk;
    }

    if config.streaming.chunk_size == 0 {
        return Err(MarqueeError::Configuration {
            reason: "chunk size must be at least 1 byte".to_string(),
        });
    }

    Ok(config)
}

/// Format byte count for display
fn format_size(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else {
        format!("{bytes} B")
    }
}
