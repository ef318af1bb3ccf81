//! Filesystem-backed media store.
//!
//! Resolves resource ids through the media library, with the reserved
//! feature id mapping to a configured standalone path. Every operation
//! stats or opens the file fresh; nothing is cached, so a resource replaced
//! on disk is picked up by the very next request.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use super::{FEATURE_ID, MediaStore, RangeReader, StoreError, StoreResult};
use crate::library::MediaLibrary;

/// Media store over local files.
///
/// Each [`open_range`](MediaStore::open_range) call opens its own file
/// handle, so concurrent streams against the same resource never contend.
pub struct FsMediaStore {
    library: Arc<MediaLibrary>,
    feature_path: PathBuf,
}

impl FsMediaStore {
    /// Creates a store resolving ids against `library`, with [`FEATURE_ID`]
    /// mapped to `feature_path`.
    pub fn new(library: Arc<MediaLibrary>, feature_path: impl Into<PathBuf>) -> Self {
        Self {
            library,
            feature_path: feature_path.into(),
        }
    }

    async fn resolve(&self, id: &str) -> StoreResult<PathBuf> {
        if id == FEATURE_ID {
            return Ok(self.feature_path.clone());
        }

        match self.library.find(id).await {
            Some(file) => Ok(file.path),
            None => Err(StoreError::NotFound { id: id.to_string() }),
        }
    }
}

/// Maps an open/stat failure to the store error space.
///
/// A file that vanished between catalog scan and request is a missing
/// resource, not an internal fault.
fn io_to_store(e: std::io::Error, id: &str) -> StoreError {
    if e.kind() == std::io::ErrorKind::NotFound {
        StoreError::NotFound { id: id.to_string() }
    } else {
        StoreError::Io { source: e }
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn size_of(&self, id: &str) -> StoreResult<u64> {
        let path = self.resolve(id).await?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| io_to_store(e, id))?;

        debug!(resource = id, size = metadata.len(), "queried resource size");
        Ok(metadata.len())
    }

    async fn exists(&self, id: &str) -> bool {
        match self.resolve(id).await {
            Ok(path) => tokio::fs::metadata(&path).await.is_ok(),
            Err(_) => false,
        }
    }

    async fn open_range(&self, id: &str, start: u64, end: u64) -> StoreResult<RangeReader> {
        if start > end {
            return Err(StoreError::InvalidRange { start, end });
        }

        let path = self.resolve(id).await?;
        let mut file = File::open(&path).await.map_err(|e| io_to_store(e, id))?;

        // Validate against the size of the handle just opened, not an
        // earlier stat, so a shrunk file is caught here.
        let size = file.metadata().await.map_err(|e| io_to_store(e, id))?.len();
        if end >= size {
            return Err(StoreError::RangeExceedsResource { start, end, size });
        }

        file.seek(std::io::SeekFrom::Start(start)).await?;
        let length = end - start + 1;

        debug!(
            resource = id,
            start, end, length, "opened bounded range reader"
        );
        Ok(Box::new(file.take(length)))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    async fn store_with_media() -> (FsMediaStore, TempDir, String) {
        let temp_dir = TempDir::new().unwrap();

        // Feature resource lives outside the scanned library.
        let feature_path = temp_dir.path().join("feature.mp4");
        tokio::fs::write(&feature_path, (0..100u8).collect::<Vec<_>>())
            .await
            .unwrap();

        let media_root = temp_dir.path().join("media");
        tokio::fs::create_dir_all(&media_root).await.unwrap();
        tokio::fs::write(media_root.join("clip.mp4"), vec![9u8; 64])
            .await
            .unwrap();

        let library = Arc::new(MediaLibrary::new(&media_root));
        library.scan().await.unwrap();
        let clip_id = library.all().await[0].id.clone();

        let store = FsMediaStore::new(library, feature_path);
        (store, temp_dir, clip_id)
    }

    #[tokio::test]
    async fn size_of_feature_and_library_entries() {
        let (store, _dir, clip_id) = store_with_media().await;

        assert_eq!(store.size_of(FEATURE_ID).await.unwrap(), 100);
        assert_eq!(store.size_of(&clip_id).await.unwrap(), 64);
    }

    #[tokio::test]
    async fn size_is_queried_fresh_per_request() {
        let (store, dir, _) = store_with_media().await;
        assert_eq!(store.size_of(FEATURE_ID).await.unwrap(), 100);

        // Replace the resource; no rescan, next query must see the new size.
        tokio::fs::write(dir.path().join("feature.mp4"), vec![1u8; 250])
            .await
            .unwrap();
        assert_eq!(store.size_of(FEATURE_ID).await.unwrap(), 250);
    }

    #[tokio::test]
    async fn exists_reflects_catalog_and_disk() {
        let (store, dir, clip_id) = store_with_media().await;

        assert!(store.exists(FEATURE_ID).await);
        assert!(store.exists(&clip_id).await);
        assert!(!store.exists("unknown-id").await);

        tokio::fs::remove_file(dir.path().join("feature.mp4"))
            .await
            .unwrap();
        assert!(!store.exists(FEATURE_ID).await);
    }

    #[tokio::test]
    async fn open_range_reads_exact_window() {
        let (store, _dir, _) = store_with_media().await;

        let mut reader = store.open_range(FEATURE_ID, 10, 19).await.unwrap();
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await.unwrap();

        assert_eq!(data, (10..20u8).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn open_range_rejects_malformed_window() {
        let (store, _dir, _) = store_with_media().await;

        let result = store.open_range(FEATURE_ID, 20, 10).await;
        assert!(matches!(result, Err(StoreError::InvalidRange { .. })));
    }

    #[tokio::test]
    async fn open_range_rejects_window_past_eof() {
        let (store, _dir, _) = store_with_media().await;

        let result = store.open_range(FEATURE_ID, 50, 150).await;
        assert!(matches!(
            result,
            Err(StoreError::RangeExceedsResource { size: 100, .. })
        ));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (store, _dir, _) = store_with_media().await;

        let result = store.size_of("missing").await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));

        let result = store.open_range("missing", 0, 10).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn vanished_file_is_not_found() {
        let (store, dir, clip_id) = store_with_media().await;

        tokio::fs::remove_file(dir.path().join("media").join("clip.mp4"))
            .await
            .unwrap();

        let result = store.size_of(&clip_id).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }
}
