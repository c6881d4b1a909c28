use std::io;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::BoxStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::application::ports::{
    RepositoryError, StagingStore, StagingStoreError, TaskRepository,
};
use crate::domain::{MediaType, StoragePath, Task, TaskId, TaskStatus};

use super::TranscriptionMessage;

/// What a polling client is told about a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskProgress {
    /// Also returned for identifiers that were never issued.
    Processing,
    Completed,
    Failed { error: String },
}

/// Upload, status and download operations behind the HTTP surface.
pub struct TaskService {
    upload_store: Arc<dyn StagingStore>,
    subtitle_store: Arc<dyn StagingStore>,
    task_repository: Arc<dyn TaskRepository>,
    sender: mpsc::Sender<TranscriptionMessage>,
}

impl TaskService {
    pub fn new(
        upload_store: Arc<dyn StagingStore>,
        subtitle_store: Arc<dyn StagingStore>,
        task_repository: Arc<dyn TaskRepository>,
        sender: mpsc::Sender<TranscriptionMessage>,
    ) -> Self {
        Self {
            upload_store,
            subtitle_store,
            task_repository,
            sender,
        }
    }

    /// Persists the upload under a fresh task id and queues it for
    /// transcription. A queue slot is reserved before anything is written, so
    /// a full queue rejects the upload right away instead of stalling it.
    pub async fn submit(
        &self,
        original_filename: &str,
        declared_media_type: Option<&str>,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<TaskId, TaskServiceError> {
        let permit = self.sender.try_reserve().map_err(|e| match e {
            TrySendError::Full(()) => {
                tracing::warn!("Transcription queue is full, rejecting upload");
                TaskServiceError::QueueFull
            }
            TrySendError::Closed(()) => {
                tracing::error!("Transcription worker is not accepting jobs");
                TaskServiceError::WorkerUnavailable
            }
        })?;

        let media_type = MediaType::from_upload(declared_media_type, original_filename);
        let task = Task::new(TaskId::new(), original_filename.to_string(), media_type);

        let bytes = self
            .upload_store
            .store(&task.video_path, stream)
            .await
            .map_err(TaskServiceError::Staging)?;

        if let Err(e) = self.task_repository.create(&task).await {
            if let Err(delete_err) = self.upload_store.delete(&task.video_path).await {
                tracing::warn!(
                    task_id = %task.id,
                    error = %delete_err,
                    "Failed to remove video after task record write failed"
                );
            }
            return Err(TaskServiceError::Repository(e));
        }

        permit.send(TranscriptionMessage::from(&task));

        tracing::info!(
            task_id = %task.id,
            filename = %task.original_filename,
            media_type = %task.media_type,
            bytes,
            "Transcription task submitted"
        );

        Ok(task.id)
    }

    /// Completion is read from the artifact itself, so a finished task never
    /// reverts. Unknown and malformed ids report `Processing`.
    pub async fn status(&self, raw_task_id: &str) -> TaskProgress {
        let Ok(task_id) = raw_task_id.parse::<TaskId>() else {
            tracing::debug!(task_id = %raw_task_id, "Status requested for malformed task id");
            return TaskProgress::Processing;
        };

        match self
            .subtitle_store
            .exists(&StoragePath::subtitle(&task_id))
            .await
        {
            Ok(true) => return TaskProgress::Completed,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(task_id = %task_id, error = %e, "Failed to check subtitle artifact");
                return TaskProgress::Processing;
            }
        }

        match self.task_repository.get_by_id(task_id).await {
            Ok(Some(task)) if task.status == TaskStatus::Failed => TaskProgress::Failed {
                error: task
                    .error_message
                    .unwrap_or_else(|| "transcription failed".to_string()),
            },
            Ok(_) => TaskProgress::Processing,
            Err(e) => {
                tracing::warn!(task_id = %task_id, error = %e, "Failed to read task record");
                TaskProgress::Processing
            }
        }
    }

    /// `Ok(None)` when there is no finished artifact for the id.
    pub async fn download(&self, raw_task_id: &str) -> Result<Option<Bytes>, TaskServiceError> {
        let Ok(task_id) = raw_task_id.parse::<TaskId>() else {
            return Ok(None);
        };

        match self
            .subtitle_store
            .fetch(&StoragePath::subtitle(&task_id))
            .await
        {
            Ok(bytes) => Ok(Some(bytes)),
            Err(StagingStoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(TaskServiceError::Staging(e)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    #[error("staging store: {0}")]
    Staging(StagingStoreError),
    #[error("repository: {0}")]
    Repository(RepositoryError),
    #[error("transcription queue is full")]
    QueueFull,
    #[error("transcription worker unavailable")]
    WorkerUnavailable,
}
