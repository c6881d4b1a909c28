use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, HeaderMap};
use serde::{Deserialize, Serialize};

use crate::application::ports::{MediaSource, TranscriptionEngine, TranscriptionError};
use crate::infrastructure::observability::preview_for_log;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

#[derive(Debug, Clone)]
pub struct GeminiEngineConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub file_poll_interval: Duration,
    pub file_poll_max_attempts: u32,
    pub request_timeout: Duration,
}

/// Gemini over the Generative Language REST API: the video goes through the
/// Files API, then a single `generateContent` call references it.
pub struct GeminiTranscriptionEngine {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    file_poll_interval: Duration,
    file_poll_max_attempts: u32,
}

impl GeminiTranscriptionEngine {
    pub fn new(config: GeminiEngineConfig) -> Result<Self, TranscriptionError> {
        if config.api_key.trim().is_empty() {
            return Err(TranscriptionError::Configuration(
                "Gemini API key is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TranscriptionError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key,
            base_url: config
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            file_poll_interval: config.file_poll_interval,
            file_poll_max_attempts: config.file_poll_max_attempts,
        })
    }

    async fn upload_file(&self, media: MediaSource<'_>) -> Result<RemoteFile, TranscriptionError> {
        let start_url = format!("{}/upload/v1beta/files", self.base_url);
        let response = self
            .client
            .post(&start_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", media.size)
            .header("X-Goog-Upload-Header-Content-Type", media.media_type)
            .json(&StartUploadRequest {
                file: FileMetadata {
                    display_name: media.display_name,
                },
            })
            .send()
            .await
            .map_err(|e| TranscriptionError::UploadFailed(format!("start: {}", e)))?;

        let response = ensure_success(response, TranscriptionError::UploadFailed).await?;
        let upload_url = upload_url(response.headers()).ok_or_else(|| {
            TranscriptionError::UploadFailed("missing upload url in start response".to_string())
        })?;

        tracing::debug!(bytes = media.size, "Streaming video to Gemini Files API");

        let response = self
            .client
            .post(&upload_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header(CONTENT_LENGTH, media.size)
            .body(reqwest::Body::wrap_stream(media.stream))
            .send()
            .await
            .map_err(|e| TranscriptionError::UploadFailed(format!("upload: {}", e)))?;

        let response = ensure_success(response, TranscriptionError::UploadFailed).await?;
        let uploaded: UploadFileResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::UploadFailed(format!("parse response: {}", e)))?;

        tracing::info!(file = %uploaded.file.name, state = ?uploaded.file.state, "Video uploaded to Gemini");
        Ok(uploaded.file)
    }

    async fn get_file(&self, name: &str) -> Result<RemoteFile, TranscriptionError> {
        let url = format!("{}/v1beta/{}", self.base_url, name);
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("request: {}", e)))?;

        ensure_success(response, TranscriptionError::ApiRequestFailed)
            .await?
            .json()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("parse response: {}", e)))
    }

    /// Videos are processed asynchronously after upload and cannot be
    /// referenced until they leave the `PROCESSING` state.
    async fn wait_until_active(&self, mut file: RemoteFile) -> Result<RemoteFile, TranscriptionError> {
        let mut attempts = 0;
        while file.state == RemoteFileState::Processing {
            if attempts >= self.file_poll_max_attempts {
                return Err(TranscriptionError::FileProcessingFailed(format!(
                    "{} still processing after {} polls",
                    file.name, attempts
                )));
            }
            tokio::time::sleep(self.file_poll_interval).await;
            file = self.get_file(&file.name).await?;
            attempts += 1;
            tracing::debug!(file = %file.name, state = ?file.state, attempts, "Polled Gemini file state");
        }

        if file.state == RemoteFileState::Failed {
            return Err(TranscriptionError::FileProcessingFailed(format!(
                "{} failed server-side processing",
                file.name
            )));
        }
        Ok(file)
    }

    async fn generate(
        &self,
        file: &RemoteFile,
        media_type: &str,
        prompt: &str,
    ) -> Result<String, TranscriptionError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::FileData(FileData {
                        mime_type: file.mime_type.as_deref().unwrap_or(media_type),
                        file_uri: &file.uri,
                    }),
                    Part::Text(prompt),
                ],
            }],
        };

        tracing::debug!(model = %self.model, "Requesting subtitles from Gemini");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("request: {}", e)))?;

        let result: GenerateContentResponse = ensure_success(response, TranscriptionError::ApiRequestFailed)
            .await?
            .json()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("parse response: {}", e)))?;

        let text = result.text();
        if text.trim().is_empty() {
            return Err(TranscriptionError::EmptyResponse);
        }

        tracing::info!(
            model = %self.model,
            chars = text.chars().count(),
            "Gemini transcription completed"
        );
        tracing::debug!(preview = %preview_for_log(&text), "Gemini reply");

        Ok(text.trim().to_string())
    }

    async fn delete_file(&self, name: &str) {
        let url = format!("{}/v1beta/{}", self.base_url, name);
        let result = self
            .client
            .delete(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(file = %name, "Deleted remote Gemini file");
            }
            Ok(response) => {
                tracing::warn!(file = %name, status = %response.status(), "Failed to delete remote Gemini file");
            }
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "Failed to delete remote Gemini file");
            }
        }
    }
}

#[async_trait]
impl TranscriptionEngine for GeminiTranscriptionEngine {
    async fn transcribe(
        &self,
        media: MediaSource<'_>,
        prompt: &str,
    ) -> Result<String, TranscriptionError> {
        let media_type = media.media_type;
        let uploaded = self.upload_file(media).await?;
        let name = uploaded.name.clone();

        let result = match self.wait_until_active(uploaded).await {
            Ok(file) => self.generate(&file, media_type, prompt).await,
            Err(e) => Err(e),
        };

        self.delete_file(&name).await;
        result
    }
}

async fn ensure_success(
    response: reqwest::Response,
    error: fn(String) -> TranscriptionError,
) -> Result<reqwest::Response, TranscriptionError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    Err(error(format!("status {}: {}", status, preview_for_log(&body))))
}

fn upload_url(headers: &HeaderMap) -> Option<String> {
    headers
        .get(UPLOAD_URL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[derive(Serialize)]
struct StartUploadRequest<'a> {
    file: FileMetadata<'a>,
}

#[derive(Serialize)]
struct FileMetadata<'a> {
    display_name: &'a str,
}

#[derive(Deserialize)]
struct UploadFileResponse {
    file: RemoteFile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteFile {
    name: String,
    uri: String,
    mime_type: Option<String>,
    #[serde(default)]
    state: RemoteFileState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum RemoteFileState {
    #[default]
    StateUnspecified,
    Processing,
    Active,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    FileData(FileData<'a>),
    Text(&'a str),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData<'a> {
    mime_type: &'a str,
    file_uri: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
