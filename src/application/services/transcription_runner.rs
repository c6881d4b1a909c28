use std::sync::Arc;

use bytes::Bytes;

use crate::application::ports::{
    MediaSource, RepositoryError, StagingStore, StagingStoreError, TaskRepository,
    TranscriptionEngine, TranscriptionError,
};
use crate::domain::{
    MediaType, StoragePath, SubtitleDocument, Task, TaskId, TaskStatus,
    extract_subtitle_document,
};

/// Work item handed from the upload path to the background worker.
#[derive(Debug, Clone)]
pub struct TranscriptionMessage {
    pub task_id: TaskId,
    pub video_path: StoragePath,
    pub media_type: MediaType,
    pub display_name: String,
}

impl From<&Task> for TranscriptionMessage {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.id,
            video_path: task.video_path.clone(),
            media_type: task.media_type.clone(),
            display_name: task.original_filename.clone(),
        }
    }
}

/// Runs one task end to end: stored video -> collaborator -> sanitized SRT on disk.
pub struct TranscriptionRunner {
    engine: Arc<dyn TranscriptionEngine>,
    upload_store: Arc<dyn StagingStore>,
    subtitle_store: Arc<dyn StagingStore>,
    task_repository: Arc<dyn TaskRepository>,
    prompt: String,
}

impl TranscriptionRunner {
    pub fn new(
        engine: Arc<dyn TranscriptionEngine>,
        upload_store: Arc<dyn StagingStore>,
        subtitle_store: Arc<dyn StagingStore>,
        task_repository: Arc<dyn TaskRepository>,
        prompt: String,
    ) -> Self {
        Self {
            engine,
            upload_store,
            subtitle_store,
            task_repository,
            prompt,
        }
    }

    /// Executes the pipeline once. Failures are logged and recorded on the
    /// task, never propagated. The uploaded video is kept when the job fails.
    pub async fn run(&self, msg: TranscriptionMessage) -> TaskStatus {
        let task_id = msg.task_id;
        match self.process(&msg).await {
            Ok(artifact) => {
                tracing::info!(task_id = %task_id, artifact = %artifact, "Subtitles generated");
                TaskStatus::Done
            }
            Err(e) => {
                tracing::error!(task_id = %task_id, error = %e, "Transcription job failed");
                self.mark_failed(task_id, &e.to_string()).await;
                TaskStatus::Failed
            }
        }
    }

    pub async fn mark_failed(&self, task_id: TaskId, reason: &str) {
        if let Err(e) = self
            .task_repository
            .update_status(task_id, TaskStatus::Failed, Some(reason))
            .await
        {
            tracing::warn!(task_id = %task_id, error = %e, "Failed to record task failure");
        }
    }

    async fn process(
        &self,
        msg: &TranscriptionMessage,
    ) -> Result<StoragePath, TranscriptionRunnerError> {
        self.update_status(msg.task_id, TaskStatus::Running).await?;

        let video = self
            .upload_store
            .open(&msg.video_path)
            .await
            .map_err(TranscriptionRunnerError::Staging)?;

        tracing::debug!(
            bytes = video.size,
            media_type = %msg.media_type,
            "Streaming video to transcription engine"
        );

        let media = MediaSource {
            size: video.size,
            stream: video.stream,
            media_type: msg.media_type.as_str(),
            display_name: &msg.display_name,
        };
        let response = self
            .engine
            .transcribe(media, &self.prompt)
            .await
            .map_err(TranscriptionRunnerError::Transcription)?;

        let subtitles = extract_subtitle_document(response.trim());
        inspect_subtitles(&subtitles);

        let artifact = StoragePath::subtitle(&msg.task_id);
        self.subtitle_store
            .put(&artifact, Bytes::from(subtitles))
            .await
            .map_err(TranscriptionRunnerError::Staging)?;

        if let Err(e) = self.upload_store.delete(&msg.video_path).await {
            tracing::warn!(
                error = %e,
                path = %msg.video_path,
                "Failed to delete uploaded video after transcription"
            );
        }

        self.update_status(msg.task_id, TaskStatus::Done).await?;

        Ok(artifact)
    }

    async fn update_status(
        &self,
        task_id: TaskId,
        status: TaskStatus,
    ) -> Result<(), TranscriptionRunnerError> {
        tracing::debug!(status = %status, "Task status transition");
        self.task_repository
            .update_status(task_id, status, None)
            .await
            .map_err(TranscriptionRunnerError::Repository)
    }
}

/// Malformed model output is persisted anyway; this only reports on it.
fn inspect_subtitles(subtitles: &str) {
    match SubtitleDocument::parse(subtitles) {
        Ok(document) => match document.validate() {
            Ok(()) => tracing::debug!(blocks = document.len(), "Subtitle document well formed"),
            Err(violation) => tracing::warn!(
                blocks = document.len(),
                violation = %violation,
                "Subtitle document breaks SRT invariants"
            ),
        },
        Err(e) => tracing::warn!(
            error = %e,
            chars = subtitles.chars().count(),
            "Model reply is not parseable SRT"
        ),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionRunnerError {
    #[error("transcription: {0}")]
    Transcription(TranscriptionError),
    #[error("staging store: {0}")]
    Staging(StagingStoreError),
    #[error("repository: {0}")]
    Repository(RepositoryError),
}
