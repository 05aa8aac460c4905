//! Attachment files backing image/audio elements.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("attachment url is outside the upload prefix: {0}")]
    NotManaged(String),

    #[error("attachment path escapes the upload root: {0}")]
    OutsideRoot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// A file received from a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Lower-cased extension including the dot, e.g. `.png`.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
    }
}

/// Directory of one (exam, part) pair below the upload root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDir {
    exam: String,
    part: String,
}

impl UploadDir {
    pub fn new(exam: &str, part: &str) -> Self {
        Self {
            exam: sanitize_segment(exam),
            part: sanitize_segment(part),
        }
    }

    pub fn relative_path(&self) -> PathBuf {
        Path::new(&self.exam).join(&self.part)
    }

    fn url_path(&self) -> String {
        format!("{}/{}", self.exam, self.part)
    }
}

/// Replaces anything but ASCII alphanumerics with `_`.
pub fn sanitize_segment(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAttachment {
    pub url: String,
}

#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Creates the directory for a batch of uploads. A failure here means no
    /// upload of the batch can be written.
    async fn prepare_dir(&self, dir: &UploadDir) -> Result<()>;

    async fn save(&self, dir: &UploadDir, file: &UploadedFile) -> Result<StoredAttachment>;

    /// Deletes the file behind a url previously returned by `save`.
    async fn remove(&self, url: &str) -> Result<()>;
}

/// Stores uploads on the local filesystem under `root`, served at `prefix`.
pub struct LocalAttachmentStore {
    root: PathBuf,
    prefix: String,
}

impl LocalAttachmentStore {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            root: root.into(),
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    fn unique_file_name(file: &UploadedFile) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let ext = file.extension().unwrap_or_default();
        format!("{}-{}{}", Utc::now().timestamp_millis(), &token[..12], ext)
    }

    fn path_for_url(&self, url: &str) -> Result<PathBuf> {
        let relative = url
            .strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StorageError::NotManaged(url.to_string()))?;

        let relative = Path::new(relative);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)));
        if escapes {
            return Err(StorageError::OutsideRoot(url.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl AttachmentStore for LocalAttachmentStore {
    async fn prepare_dir(&self, dir: &UploadDir) -> Result<()> {
        let path = self.root.join(dir.relative_path());
        fs::create_dir_all(&path).await?;
        debug!(path = %path.display(), "upload directory ready");
        Ok(())
    }

    async fn save(&self, dir: &UploadDir, file: &UploadedFile) -> Result<StoredAttachment> {
        let file_name = Self::unique_file_name(file);
        let path = self.root.join(dir.relative_path()).join(&file_name);
        fs::write(&path, &file.bytes).await?;
        debug!(path = %path.display(), size = file.bytes.len(), "attachment saved");

        Ok(StoredAttachment {
            url: format!("{}/{}/{}", self.prefix, dir.url_path(), file_name),
        })
    }

    async fn remove(&self, url: &str) -> Result<()> {
        let path = self.path_for_url(url)?;
        if fs::try_exists(&path).await? {
            fs::remove_file(&path).await?;
            debug!(path = %path.display(), "attachment removed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_root() -> PathBuf {
        std::env::temp_dir().join(format!("exambank-storage-{}", Uuid::new_v4().simple()))
    }

    fn png(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    #[test]
    fn segments_are_sanitized() {
        assert_eq!(sanitize_segment("Mock Test 1"), "Mock_Test_1");
        assert_eq!(sanitize_segment("../etc"), "___etc");
        assert_eq!(sanitize_segment("  "), "_");
        assert_eq!(
            UploadDir::new("Mock", "Part 3").relative_path(),
            Path::new("Mock").join("Part_3")
        );
        assert_eq!(UploadDir::new("7", "3").relative_path(), Path::new("7").join("3"));
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(png("Photo.PNG").extension().as_deref(), Some(".png"));
        assert_eq!(png("noext").extension(), None);
    }

    #[tokio::test]
    async fn save_then_remove_round_trip() {
        let root = scratch_root();
        let store = LocalAttachmentStore::new(&root, "/uploads/");
        let dir = UploadDir::new("1", "2");

        store.prepare_dir(&dir).await.expect("prepare dir");
        let first = store.save(&dir, &png("a.png")).await.expect("save first");
        let second = store.save(&dir, &png("a.png")).await.expect("save second");

        assert!(first.url.starts_with("/uploads/1/2/"));
        assert!(first.url.ends_with(".png"));
        assert_ne!(first.url, second.url);

        let path = store.path_for_url(&first.url).expect("managed url");
        assert!(path.exists());
        store.remove(&first.url).await.expect("remove");
        assert!(!path.exists());

        // Removing twice is not an error.
        store.remove(&first.url).await.expect("remove again");

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn urls_outside_the_store_are_rejected() {
        let store = LocalAttachmentStore::new("uploads", "/uploads");

        assert!(matches!(
            store.path_for_url("https://cdn.example.com/a.png"),
            Err(StorageError::NotManaged(_))
        ));
        assert!(matches!(
            store.path_for_url("/uploads/../secret.txt"),
            Err(StorageError::OutsideRoot(_))
        ));
        assert_eq!(
            store.path_for_url("/uploads/1/2/f.png").expect("managed"),
            Path::new("uploads").join("1/2/f.png")
        );
    }
}
