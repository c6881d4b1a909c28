mod subtitle_prompt;
mod task_recovery;
mod task_service;
mod transcription_runner;
mod transcription_worker;

pub use subtitle_prompt::build_subtitle_prompt;
pub use task_recovery::{INTERRUPTED_MESSAGE, recover_interrupted_tasks};
pub use task_service::{TaskProgress, TaskService, TaskServiceError};
pub use transcription_runner::{
    TranscriptionMessage, TranscriptionRunner, TranscriptionRunnerError,
};
pub use transcription_worker::{CANCELLED_MESSAGE, TranscriptionWorker};
