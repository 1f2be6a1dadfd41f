/// Media store - filesystem layout for originals, HLS output and thumbnails
///
/// Layout under the configured root:
///
/// ```text
/// videos/original/<id>/<filename>          uploaded source files
/// videos/processed/<id>/<profile>/         index.m3u8 + NNN.ts per profile
/// videos/thumbnails/<id>/thumbnail.jpg     worker-generated thumbnail
/// ```
///
/// The transcode worker is the only writer under `processed/` and
/// `thumbnails/`; everything else reads.
use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::error::{AppError, Result};

pub const ORIGINAL_DIR: &str = "videos/original";
pub const PROCESSED_DIR: &str = "videos/processed";
pub const THUMBNAILS_DIR: &str = "videos/thumbnails";

pub const MANIFEST_FILE: &str = "index.m3u8";

/// Filesystem-backed media store rooted at a single directory.
#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a store-relative path to an absolute one.
    pub fn absolute(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Store-relative HLS output directory for one record and profile.
    pub fn processed_rel_path(&self, id: Uuid, profile: &str) -> String {
        format!("{PROCESSED_DIR}/{id}/{profile}")
    }

    /// Persist an uploaded original, returning its store-relative path.
    ///
    /// Only the final path component of `filename` is used, so a hostile
    /// multipart filename cannot escape the per-record directory.
    pub async fn save_original(&self, id: Uuid, filename: &str, data: &[u8]) -> Result<String> {
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::Validation("Invalid file name".to_string()))?;

        let relative = format!("{ORIGINAL_DIR}/{id}/{name}");
        let target = self.absolute(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, data).await?;

        Ok(relative)
    }

    /// Persist a worker-generated thumbnail, returning its relative path.
    pub async fn save_thumbnail(&self, id: Uuid, data: &[u8]) -> Result<String> {
        let relative = format!("{THUMBNAILS_DIR}/{id}/thumbnail.jpg");
        let target = self.absolute(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, data).await?;

        Ok(relative)
    }

    /// Create the HLS output directory for a profile and return its
    /// absolute path.
    pub async fn ensure_processed_dir(&self, id: Uuid, profile: &str) -> Result<PathBuf> {
        let dir = self.absolute(&self.processed_rel_path(id, profile));
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Read the manifest inside an HLS directory. `None` when absent.
    pub async fn read_manifest(&self, hls_path: &str) -> Result<Option<String>> {
        let path = self.absolute(hls_path).join(MANIFEST_FILE);
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read one segment file inside an HLS directory. `None` when the name
    /// does not survive sanitization or the file is absent.
    pub async fn read_segment(&self, hls_path: &str, segment: &str) -> Result<Option<Vec<u8>>> {
        if !is_safe_segment_name(segment) {
            return Ok(None);
        }

        let path = self.absolute(hls_path).join(segment);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove everything the store holds for one record: the original, the
    /// derived HLS tree and the thumbnail directory. Deleting a record and
    /// deleting its files are coupled on purpose.
    pub async fn remove_video_files(&self, id: Uuid) -> Result<()> {
        for base in [ORIGINAL_DIR, PROCESSED_DIR, THUMBNAILS_DIR] {
            let dir = self.root.join(base).join(id.to_string());
            match fs::remove_dir_all(&dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// Segment names must be bare filenames: no separators, no traversal, no
/// absolute paths. Anything else is treated as not found.
pub fn is_safe_segment_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 255 {
        return false;
    }
    if name.contains('/') || name.contains('\\') {
        return false;
    }
    if name.contains("..") || name.starts_with('.') {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, MediaStore) {
        let dir = TempDir::new().unwrap();
        let store = MediaStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_segment_name_sanitization() {
        assert!(is_safe_segment_name("000.ts"));
        assert!(is_safe_segment_name("segment_01-a.ts"));

        assert!(!is_safe_segment_name(""));
        assert!(!is_safe_segment_name("../secret.ts"));
        assert!(!is_safe_segment_name("..%2fsecret.ts"));
        assert!(!is_safe_segment_name("/etc/passwd"));
        assert!(!is_safe_segment_name("a/b.ts"));
        assert!(!is_safe_segment_name("a\\b.ts"));
        assert!(!is_safe_segment_name(".hidden"));
        assert!(!is_safe_segment_name("seg ment.ts"));
    }

    #[tokio::test]
    async fn test_save_original_strips_directories() {
        let (_tmp, store) = store();
        let id = Uuid::new_v4();

        let rel = store
            .save_original(id, "../../evil/clip.mp4", b"data")
            .await
            .unwrap();

        assert_eq!(rel, format!("videos/original/{id}/clip.mp4"));
        assert_eq!(tokio::fs::read(store.absolute(&rel)).await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_manifest_read_absent_and_present() {
        let (_tmp, store) = store();
        let id = Uuid::new_v4();
        let rel = store.processed_rel_path(id, "720p");

        assert_eq!(store.read_manifest(&rel).await.unwrap(), None);

        let dir = store.ensure_processed_dir(id, "720p").await.unwrap();
        tokio::fs::write(dir.join(MANIFEST_FILE), "#EXTM3U\n")
            .await
            .unwrap();

        assert_eq!(
            store.read_manifest(&rel).await.unwrap().as_deref(),
            Some("#EXTM3U\n")
        );
    }

    #[tokio::test]
    async fn test_segment_read_rejects_traversal() {
        let (_tmp, store) = store();
        let id = Uuid::new_v4();
        let rel = store.processed_rel_path(id, "480p");

        let dir = store.ensure_processed_dir(id, "480p").await.unwrap();
        tokio::fs::write(dir.join("000.ts"), b"chunk").await.unwrap();

        assert_eq!(
            store.read_segment(&rel, "000.ts").await.unwrap().as_deref(),
            Some(b"chunk".as_ref())
        );
        assert_eq!(store.read_segment(&rel, "../000.ts").await.unwrap(), None);
        assert_eq!(store.read_segment(&rel, "001.ts").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_video_files_is_idempotent() {
        let (_tmp, store) = store();
        let id = Uuid::new_v4();

        store.save_original(id, "in.mp4", b"x").await.unwrap();
        store.ensure_processed_dir(id, "480p").await.unwrap();
        store.save_thumbnail(id, b"jpeg").await.unwrap();

        store.remove_video_files(id).await.unwrap();
        assert!(!store
            .absolute(&format!("videos/original/{id}"))
            .exists());

        // Second removal of already-missing trees is fine.
        store.remove_video_files(id).await.unwrap();
    }
}
