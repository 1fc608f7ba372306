//! Durable blob storage port interface

use async_trait::async_trait;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Failed to read note storage: {0}")]
    Read(String),

    #[error("Failed to write note storage: {0}")]
    Write(String),
}

/// Port for the durable note blob: a single opaque string value.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the stored blob.
    ///
    /// # Returns
    /// `None` when nothing has been stored yet.
    async fn read(&self) -> Result<Option<String>, StorageError>;

    /// Overwrite the stored blob.
    async fn write(&self, blob: &str) -> Result<(), StorageError>;
}
