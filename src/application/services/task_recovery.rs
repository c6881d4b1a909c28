use crate::application::ports::{RepositoryError, TaskRepository};
use crate::domain::TaskStatus;

pub const INTERRUPTED_MESSAGE: &str = "interrupted by service restart";

/// Marks tasks a previous process left unfinished as failed so they stop
/// reporting `processing`. Nothing is retried.
pub async fn recover_interrupted_tasks(
    task_repository: &dyn TaskRepository,
) -> Result<usize, RepositoryError> {
    let mut recovered = 0;

    for status in [TaskStatus::Submitted, TaskStatus::Running] {
        for task in task_repository.list_by_status(status).await? {
            task_repository
                .update_status(task.id, TaskStatus::Failed, Some(INTERRUPTED_MESSAGE))
                .await?;
            tracing::warn!(
                task_id = %task.id,
                previous_status = %status,
                "Marked interrupted task as failed"
            );
            recovered += 1;
        }
    }

    Ok(recovered)
}
