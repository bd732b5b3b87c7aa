//! File-backed Image Store
//!
//! Uploaded images live under `{work_dir}/{upload_dir}` with uuid names;
//! the funko row only carries the stored file name. Names are validated
//! before touching the filesystem so a crafted id can never escape the
//! upload directory.

use std::path::{Path, PathBuf};

use shared::models::DEFAULT_IMAGE;

use crate::utils::AppError;

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

fn extension_for(content_type: Option<&str>) -> &'static str {
    match content_type {
        Some("image/png") => "png",
        Some("image/jpeg") => "jpg",
        Some("image/webp") => "webp",
        Some("image/gif") => "gif",
        _ => "bin",
    }
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
}

impl ImageStore {
    /// Create the store, ensuring the upload directory exists.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| AppError::Internal(format!("Failed to create upload dir: {e}")))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist uploaded bytes under a fresh uuid name; returns the name.
    pub async fn save(
        &self,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<String, AppError> {
        let name = format!(
            "{}.{}",
            uuid::Uuid::new_v4(),
            extension_for(content_type)
        );
        let path = self.dir.join(&name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store image: {e}")))?;
        tracing::debug!(file = %name, size = bytes.len(), "Image stored");
        Ok(name)
    }

    /// Read an image back, with its guessed mime type.
    pub async fn load(&self, name: &str) -> Result<(Vec<u8>, String), AppError> {
        if !is_safe_name(name) {
            return Err(AppError::Validation(format!("Invalid image name: {name}")));
        }
        let path = self.dir.join(name);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|_| AppError::NotFound(format!("Image {name} not found")))?;
        let mime = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();
        Ok((bytes, mime))
    }

    /// Delete a stored image. The shared default image is never deleted
    /// and a missing file is not an error.
    pub async fn remove(&self, name: &str) -> Result<(), AppError> {
        if name == DEFAULT_IMAGE || !is_safe_name(name) {
            return Ok(());
        }
        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!("Failed to delete image: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_load_remove_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path()).unwrap();

        let name = store.save(b"pixels", Some("image/png")).await.unwrap();
        assert!(name.ends_with(".png"));

        let (bytes, mime) = store.load(&name).await.unwrap();
        assert_eq!(bytes, b"pixels");
        assert_eq!(mime, "image/png");

        store.remove(&name).await.unwrap();
        assert!(store.load(&name).await.is_err());
        // removing again is fine
        store.remove(&name).await.unwrap();
    }

    #[tokio::test]
    async fn path_traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path()).unwrap();
        assert!(store.load("../etc/passwd").await.is_err());
    }

    #[tokio::test]
    async fn default_image_is_never_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path()).unwrap();
        std::fs::write(dir.path().join(DEFAULT_IMAGE), b"default").unwrap();
        store.remove(DEFAULT_IMAGE).await.unwrap();
        assert!(store.load(DEFAULT_IMAGE).await.is_ok());
    }
}
