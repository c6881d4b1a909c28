use std::fmt;
use std::path::Path;

use super::TaskId;

pub const SUBTITLE_EXTENSION: &str = "srt";

/// Location of a blob relative to the root of a staging store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    /// `{task_id}.{ext}` where `ext` comes from the uploaded filename. Extensions
    /// that are not plain ASCII alphanumerics are dropped.
    pub fn video(task_id: &TaskId, original_filename: &str) -> Self {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

        match extension {
            Some(ext) => Self(format!("{}.{}", task_id, ext)),
            None => Self(task_id.to_string()),
        }
    }

    pub fn subtitle(task_id: &TaskId) -> Self {
        Self(format!("{}.{}", task_id, SUBTITLE_EXTENSION))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
