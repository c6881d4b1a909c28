use chrono::{DateTime, Utc};

use super::{MediaType, StoragePath, TaskId, TaskStatus};

#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub original_filename: String,
    pub media_type: MediaType,
    pub video_path: StoragePath,
    pub status: TaskStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: TaskId, original_filename: String, media_type: MediaType) -> Self {
        let now = Utc::now();
        let video_path = StoragePath::video(&id, &original_filename);
        Self {
            id,
            original_filename,
            media_type,
            video_path,
            status: TaskStatus::Submitted,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn subtitle_path(&self) -> StoragePath {
        StoragePath::subtitle(&self.id)
    }
}
