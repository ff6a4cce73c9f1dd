//! services/api/src/adapters/files.rs
//!
//! Local-disk implementation of the `FileStorageService` port. Uploads are
//! kept under `<root>/<user_id>/<stored_name>`.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use uuid::Uuid;
use wordflow_core::ports::{FileStorageService, PortError, PortResult};

#[derive(Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Creates a new `LocalFileStore` rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Makes sure the upload root exists.
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }
}

#[async_trait]
impl FileStorageService for LocalFileStore {
    async fn save_upload(&self, user_id: Uuid, stored_name: &str, data: &[u8]) -> PortResult<String> {
        let dir = self.root.join(user_id.to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to create {}: {}", dir.display(), e)))?;

        let path = dir.join(stored_name);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to write {}: {}", path.display(), e)))?;

        Ok(path.to_string_lossy().into_owned())
    }

    async fn remove(&self, location: &str) -> PortResult<()> {
        match tokio::fs::remove_file(location).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unexpected(format!("Failed to remove {}: {}", location, e))),
        }
    }
}
