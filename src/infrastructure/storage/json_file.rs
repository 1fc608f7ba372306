//! JSON file blob store adapter

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::{BlobStore, StorageError};

/// Blob store backed by a single JSON file in the local data directory
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store at the default XDG data location
    pub fn new() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voice-notes");

        Self {
            path: data_dir.join("notes.json"),
        }
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the storage file path
    pub fn path(&self) -> PathBuf {
        self.path.clone()
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for JsonFileStore {
    async fn read(&self) -> Result<Option<String>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| StorageError::Read(e.to_string()))?;

        Ok(Some(content))
    }

    async fn write(&self, blob: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Write(e.to_string()))?;
        }

        fs::write(&self.path, blob)
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;

        Ok(())
    }
}
