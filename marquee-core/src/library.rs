//! Media library management for local video content.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Library entry for a scanned video file.
#[derive(Debug, Clone, Serialize)]
pub struct MediaFile {
    /// Stable identifier derived from the file path, fit for URLs.
    pub id: String,
    /// Display title extracted from the filename.
    pub title: String,
    /// Path to the media file.
    #[serde(skip_serializing)]
    pub path: PathBuf,
    /// File size in bytes at scan time.
    pub size: u64,
}

/// Catalog of video files under a media root directory.
///
/// Holds the most recent scan result; [`scan`](Self::scan) replaces it
/// wholesale, so readers never observe a half-built catalog.
#[derive(Debug)]
pub struct MediaLibrary {
    media_root: PathBuf,
    files: RwLock<HashMap<String, MediaFile>>,
}

impl MediaLibrary {
    /// Creates an empty library rooted at `media_root`.
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
            files: RwLock::new(HashMap::new()),
        }
    }

    /// Directory this library scans.
    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// Scans the media root for video files and rebuilds the catalog.
    ///
    /// Returns the number of entries found. Subdirectories are scanned
    /// recursively; unreadable ones are logged and skipped.
    ///
    /// # Errors
    ///
    /// - `std::io::Error` - Failed to read the media root itself
    pub async fn scan(&self) -> Result<usize, std::io::Error> {
        let mut found = HashMap::new();
        scan_directory(self.media_root.clone(), &mut found).await?;

        let count = found.len();
        *self.files.write().await = found;

        debug!(
            root = %self.media_root.display(),
            count, "media library scan complete"
        );
        Ok(count)
    }

    /// Finds an entry by id.
    pub async fn find(&self, id: &str) -> Option<MediaFile> {
        self.files.read().await.get(id).cloned()
    }

    /// All entries, ordered by title for stable listings.
    pub async fn all(&self) -> Vec<MediaFile> {
        let files = self.files.read().await;
        let mut entries: Vec<MediaFile> = files.values().cloned().collect();
        entries.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        entries
    }

    /// Entries whose title contains `query`, case-insensitively.
    pub async fn search(&self, query: &str) -> Vec<MediaFile> {
        let needle = query.to_lowercase();
        self.all()
            .await
            .into_iter()
            .filter(|file| file.title.to_lowercase().contains(&needle))
            .collect()
    }
}

/// Recursively collects video files under `dir` into `found`.
fn scan_directory<'a>(
    dir: PathBuf,
    found: &'a mut HashMap<String, MediaFile>,
) -> Pin<Box<dyn Future<Output = Result<(), std::io::Error>> + Send + 'a>> {
    Box::pin(async move {
        let mut entries = tokio::fs::read_dir(&dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            if path.is_dir() {
                // Skip OS artifact directories
                if let Some(dir_name) = path.file_name().and_then(|n| n.to_str())
                    && (dir_name.starts_with('.') || dir_name == "Thumbs.db")
                {
                    continue;
                }

                if let Err(e) = scan_directory(path.clone(), found).await {
                    warn!(path = %path.display(), error = %e, "failed to scan subdirectory");
                }
            } else if path.is_file()
                && let Some(file_name) = path.file_name().and_then(|n| n.to_str())
                && !file_name.starts_with('.')
                && let Some(extension) = path.extension()
            {
                let ext = extension.to_string_lossy().to_lowercase();
                if matches!(
                    ext.as_str(),
                    "mp4" | "mkv" | "avi" | "mov" | "m4v" | "webm" | "flv"
                ) && let Ok(metadata) = entry.metadata().await
                {
                    let file = media_file_from_path(path, metadata.len());
                    found.insert(file.id.clone(), file);
                }
            }
        }

        Ok(())
    })
}

/// Builds a library entry from a file path and its size.
fn media_file_from_path(path: PathBuf, size: u64) -> MediaFile {
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown File")
        .replace(['.', '_'], " ")
        .trim()
        .to_string();

    let id = path_id(&path);

    MediaFile {
        id,
        title,
        path,
        size,
    }
}

/// Derives a stable hex id from a file path.
fn path_id(path: &Path) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
