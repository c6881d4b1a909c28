use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use futures::stream::BoxStream;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{MultipartUpload, ObjectStore, PutPayload};

use crate::application::ports::{StagedObject, StagingStore, StagingStoreError};
use crate::domain::StoragePath;

/// Staging store rooted at a local directory. Writes land in a temporary file
/// and are renamed into place on completion.
pub struct LocalStagingStore {
    inner: Arc<LocalFileSystem>,
}

impl LocalStagingStore {
    pub fn new(base_path: PathBuf) -> Result<Self, StagingStoreError> {
        std::fs::create_dir_all(&base_path).map_err(StagingStoreError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(&base_path)
            .map_err(|e| StagingStoreError::UploadFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
        })
    }
}

fn store_path(path: &StoragePath) -> StorePath {
    StorePath::from(path.as_str())
}

fn not_found_or(
    e: object_store::Error,
    other: fn(String) -> StagingStoreError,
) -> StagingStoreError {
    match e {
        object_store::Error::NotFound { path, .. } => StagingStoreError::NotFound(path),
        e => other(e.to_string()),
    }
}

#[async_trait::async_trait]
impl StagingStore for LocalStagingStore {
    async fn store(
        &self,
        path: &StoragePath,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<u64, StagingStoreError> {
        let location = store_path(path);
        let mut upload = self
            .inner
            .put_multipart(&location)
            .await
            .map_err(|e| StagingStoreError::UploadFailed(e.to_string()))?;

        let mut total_bytes: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    let _ = upload.abort().await;
                    return Err(StagingStoreError::Io(e));
                }
            };
            if bytes.is_empty() {
                continue;
            }
            total_bytes += bytes.len() as u64;
            if let Err(e) = upload.put_part(PutPayload::from(bytes)).await {
                let _ = upload.abort().await;
                return Err(StagingStoreError::UploadFailed(e.to_string()));
            }
        }

        upload
            .complete()
            .await
            .map_err(|e| StagingStoreError::UploadFailed(e.to_string()))?;

        tracing::debug!(path = %path, bytes = total_bytes, "Stream persisted");
        Ok(total_bytes)
    }

    async fn put(&self, path: &StoragePath, data: Bytes) -> Result<(), StagingStoreError> {
        let bytes = data.len();
        self.inner
            .put(&store_path(path), PutPayload::from(data))
            .await
            .map_err(|e| StagingStoreError::UploadFailed(e.to_string()))?;
        tracing::debug!(path = %path, bytes, "Object written");
        Ok(())
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Bytes, StagingStoreError> {
        let result = self
            .inner
            .get(&store_path(path))
            .await
            .map_err(|e| not_found_or(e, StagingStoreError::DownloadFailed))?;

        result
            .bytes()
            .await
            .map_err(|e| StagingStoreError::DownloadFailed(e.to_string()))
    }

    async fn open(&self, path: &StoragePath) -> Result<StagedObject, StagingStoreError> {
        let result = self
            .inner
            .get(&store_path(path))
            .await
            .map_err(|e| not_found_or(e, StagingStoreError::DownloadFailed))?;

        let size = result.meta.size as u64;
        let stream = result
            .into_stream()
            .map_err(|e| io::Error::other(e.to_string()))
            .boxed();

        Ok(StagedObject { size, stream })
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), StagingStoreError> {
        self.inner
            .delete(&store_path(path))
            .await
            .map_err(|e| not_found_or(e, StagingStoreError::DeleteFailed))
    }

    async fn exists(&self, path: &StoragePath) -> Result<bool, StagingStoreError> {
        match self.inner.head(&store_path(path)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(StagingStoreError::DownloadFailed(e.to_string())),
        }
    }
}
