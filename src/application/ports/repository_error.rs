use crate::domain::{TaskId, TaskStatus};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("storage failed: {0}")]
    Storage(#[from] std::io::Error),
    #[error("corrupt record {path}: {reason}")]
    CorruptRecord { path: String, reason: String },
    #[error("task not found: {0}")]
    NotFound(TaskId),
    #[error("task {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },
}
