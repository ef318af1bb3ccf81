//! Test fixtures for media store testing.
//!
//! Provides standardized media directory setup for consistent testing
//! across store and streaming modules.

// Type alias for complex return type
type TempMediaDir = (tempfile::TempDir, std::path::PathBuf);

/// Creates a temporary media directory holding a feature video and the
/// given additional files.
///
/// Returns the directory guard together with the feature video's path.
/// The directory and everything in it is removed when the guard drops.
///
/// # Panics
///
/// Panics if the temporary directory or any file cannot be created.
/// This is acceptable in test fixtures where failures indicate environment issues.
pub fn create_temp_media_dir(feature_bytes: &[u8], files: &[(&str, &[u8])]) -> TempMediaDir {
    let temp_dir = tempfile::tempdir().unwrap();
    let feature_path = temp_dir.path().join("feature.mp4");

    std::fs::write(&feature_path, feature_bytes).unwrap();
    for (name, data) in files {
        std::fs::write(temp_dir.path().join(name), data).unwrap();
    }

    (temp_dir, feature_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_media_dir() {
        let (temp_dir, feature_path) =
            create_temp_media_dir(b"feature-bytes", &[("clip.mkv", b"clip")]);

        assert!(feature_path.exists());
        assert_eq!(std::fs::read(&feature_path).unwrap(), b"feature-bytes");
        assert!(temp_dir.path().join("clip.mkv").exists());
    }
}
