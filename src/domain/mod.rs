mod media_type;
mod storage_path;
mod subtitle_document;
mod subtitle_extraction;
mod task;
mod task_id;
mod task_status;
mod timestamp;

pub use media_type::MediaType;
pub use storage_path::{SUBTITLE_EXTENSION, StoragePath};
pub use subtitle_document::{
    SubtitleBlock, SubtitleDocument, SubtitleParseError, SubtitleViolation,
};
pub use subtitle_extraction::extract_subtitle_document;
pub use task::Task;
pub use task_id::TaskId;
pub use task_status::TaskStatus;
pub use timestamp::{Timestamp, TimestampParseError};
