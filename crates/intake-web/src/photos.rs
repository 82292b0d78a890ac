//! On-disk storage for uploaded record photos.

use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::WebError;

/// Subdirectory of the media root holding record photos.
const PHOTO_DIR: &str = "records/photos";

/// Writes photos under `<root>/records/photos/` and hands back paths relative
/// to the root, which is what gets persisted.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    root: PathBuf,
}

impl PhotoStore {
    pub async fn new(root: PathBuf) -> Result<Self, WebError> {
        let dir = root.join(PHOTO_DIR);
        fs::create_dir_all(&dir).await.map_err(|e| {
            WebError::Storage(format!(
                "Failed to create photo directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        info!(path = %root.display(), "Photo store initialized");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write one photo and return its relative path.
    pub async fn store(&self, extension: &str, data: &[u8]) -> Result<String, WebError> {
        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(WebError::BadRequest(format!(
                "Invalid photo extension: {}",
                extension
            )));
        }

        let image = format!("{}/{}.{}", PHOTO_DIR, Uuid::new_v4(), extension);
        let path = self.resolve(&image)?;
        fs::write(&path, data)
            .await
            .map_err(|e| WebError::Storage(format!("Failed to write {}: {}", image, e)))?;

        debug!(image = %image, size = data.len(), "Stored photo");
        Ok(image)
    }

    /// Remove a stored photo. Failures are logged, not returned.
    pub async fn remove(&self, image: &str) {
        let path = match self.resolve(image) {
            Ok(path) => path,
            Err(e) => {
                warn!(image, error = %e, "Refusing to remove photo");
                return;
            }
        };
        match fs::remove_file(&path).await {
            Ok(()) => debug!(image, "Removed photo"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(image, error = %e, "Failed to remove photo"),
        }
    }

    pub async fn remove_all(&self, images: &[String]) {
        for image in images {
            self.remove(image).await;
        }
    }

    /// Absolute path of a stored image. Rejects anything that would escape the root.
    pub fn resolve(&self, image: &str) -> Result<PathBuf, WebError> {
        let mut resolved = self.root.clone();
        for component in Path::new(image).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(WebError::BadRequest("Path traversal detected".to_string()));
                }
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path().to_path_buf()).await.unwrap();

        let image = store.store("jpg", b"\xff\xd8\xff").await.unwrap();
        assert!(image.starts_with("records/photos/"));
        assert!(image.ends_with(".jpg"));

        let path = store.resolve(&image).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"\xff\xd8\xff");

        store.remove(&image).await;
        assert!(!path.exists());
        // Removing twice is harmless.
        store.remove(&image).await;
    }

    #[tokio::test]
    async fn test_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path().to_path_buf()).await.unwrap();
        let a = store.store("png", b"a").await.unwrap();
        let b = store.store("png", b"b").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path().to_path_buf()).await.unwrap();
        assert!(store.resolve("../etc/passwd").is_err());
        assert!(store.resolve("/etc/passwd").is_err());
        assert!(store.resolve("records/photos/../../x").is_err());
        assert!(store.resolve("./records/photos/a.jpg").is_ok());
    }

    #[tokio::test]
    async fn test_rejects_bad_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path().to_path_buf()).await.unwrap();
        assert!(store.store("../jpg", b"x").await.is_err());
        assert!(store.store("", b"x").await.is_err());
    }
}
