use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::StoragePath;

/// Durable blob storage for uploaded videos and finished subtitle files.
#[async_trait::async_trait]
pub trait StagingStore: Send + Sync {
    /// Streams the body to `path` verbatim and returns the number of bytes written.
    async fn store(
        &self,
        path: &StoragePath,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<u64, StagingStoreError>;

    /// Writes a complete payload in one step. Readers never see a partial file.
    async fn put(&self, path: &StoragePath, data: Bytes) -> Result<(), StagingStoreError>;

    async fn fetch(&self, path: &StoragePath) -> Result<Bytes, StagingStoreError>;

    /// Streams a stored object without loading it into memory.
    async fn open(&self, path: &StoragePath) -> Result<StagedObject, StagingStoreError>;

    async fn delete(&self, path: &StoragePath) -> Result<(), StagingStoreError>;

    async fn exists(&self, path: &StoragePath) -> Result<bool, StagingStoreError>;
}

pub struct StagedObject {
    pub size: u64,
    pub stream: BoxStream<'static, Result<Bytes, io::Error>>,
}

#[derive(Debug, thiserror::Error)]
pub enum StagingStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
