use async_trait::async_trait;

use crate::domain::{Task, TaskId, TaskStatus};

use super::RepositoryError;

/// Persisted lifecycle record for every submitted task.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: &Task) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError>;

    /// Moves a task to `status`, rejecting transitions out of terminal states.
    async fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError>;

    async fn list_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, RepositoryError>;
}
