mod repository_error;
mod staging_store;
mod task_repository;
mod transcription_engine;

pub use repository_error::RepositoryError;
pub use staging_store::{StagedObject, StagingStore, StagingStoreError};
pub use task_repository::TaskRepository;
pub use transcription_engine::{MediaSource, TranscriptionEngine, TranscriptionError};
