use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{RepositoryError, TaskRepository};
use crate::domain::{MediaType, StoragePath, Task, TaskId, TaskStatus};

const RECORD_EXTENSION: &str = "json";

/// One JSON record per task under a directory, replaced atomically on every
/// write (temp file + rename).
pub struct FsTaskRepository {
    root: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct TaskRecord {
    id: Uuid,
    original_filename: String,
    media_type: String,
    video_path: String,
    status: String,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.as_uuid(),
            original_filename: task.original_filename.clone(),
            media_type: task.media_type.as_str().to_string(),
            video_path: task.video_path.as_str().to_string(),
            status: task.status.as_str().to_string(),
            error_message: task.error_message.clone(),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

impl TaskRecord {
    fn into_task(self, path: &Path) -> Result<Task, RepositoryError> {
        let status = self
            .status
            .parse::<TaskStatus>()
            .map_err(|reason| RepositoryError::CorruptRecord {
                path: path.display().to_string(),
                reason,
            })?;

        Ok(Task {
            id: TaskId::from_uuid(self.id),
            original_filename: self.original_filename,
            media_type: MediaType::from_raw(self.media_type),
            video_path: StoragePath::from_raw(self.video_path),
            status,
            error_message: self.error_message,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl FsTaskRepository {
    pub fn new(root: PathBuf) -> Result<Self, RepositoryError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn record_path(&self, id: TaskId) -> PathBuf {
        self.root.join(format!("{}.{}", id, RECORD_EXTENSION))
    }

    async fn read_record(&self, path: &Path) -> Result<Option<Task>, RepositoryError> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RepositoryError::Storage(e)),
        };

        let record: TaskRecord =
            serde_json::from_slice(&raw).map_err(|e| RepositoryError::CorruptRecord {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        record.into_task(path).map(Some)
    }

    async fn write_record(&self, task: &Task) -> Result<(), RepositoryError> {
        let path = self.record_path(task.id);
        let tmp_path = path.with_extension(format!("{}.tmp", RECORD_EXTENSION));

        let body = serde_json::to_vec_pretty(&TaskRecord::from(task)).map_err(|e| {
            RepositoryError::CorruptRecord {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        tokio::fs::write(&tmp_path, body).await?;
        tokio::fs::rename(&tmp_path, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for FsTaskRepository {
    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn create(&self, task: &Task) -> Result<(), RepositoryError> {
        self.write_record(task).await
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        self.read_record(&self.record_path(id)).await
    }

    #[instrument(skip(self, error_message), fields(task_id = %id, status = %status))]
    async fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut task = self
            .read_record(&self.record_path(id))
            .await?
            .ok_or(RepositoryError::NotFound(id))?;

        if !task.status.can_transition_to(status) {
            return Err(RepositoryError::InvalidTransition {
                id,
                from: task.status,
                to: status,
            });
        }

        task.status = status;
        task.error_message = error_message.map(str::to_string);
        task.updated_at = Utc::now();

        self.write_record(&task).await
    }

    #[instrument(skip(self))]
    async fn list_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, RepositoryError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut tasks = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            match self.read_record(&path).await {
                Ok(Some(task)) if task.status == status => tasks.push(task),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable task record");
                }
            }
        }

        tasks.sort_by_key(|task| task.created_at);
        Ok(tasks)
    }
}
