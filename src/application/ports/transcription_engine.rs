use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

/// A video handed to the collaborator as a byte stream, together with the
/// metadata it needs to interpret the bytes.
pub struct MediaSource<'a> {
    /// Exact length of `stream` in bytes.
    pub size: u64,
    pub stream: BoxStream<'static, Result<Bytes, io::Error>>,
    pub media_type: &'a str,
    pub display_name: &'a str,
}

/// External model that watches a video and answers a prompt with text.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(
        &self,
        media: MediaSource<'_>,
        prompt: &str,
    ) -> Result<String, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("media upload failed: {0}")]
    UploadFailed(String),
    #[error("media processing failed: {0}")]
    FileProcessingFailed(String),
    #[error("model returned no text")]
    EmptyResponse,
    #[error("client configuration invalid: {0}")]
    Configuration(String),
}
