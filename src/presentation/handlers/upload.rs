use std::io;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;

use crate::application::services::TaskServiceError;
use crate::presentation::state::AppState;

use super::error_response::error_response;

const FILE_FIELD: &str = "file";
const FALLBACK_FILENAME: &str = "upload";

#[derive(Serialize)]
pub struct UploadResponse {
    pub task_id: String,
    pub status: &'static str,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => {
                tracing::warn!("Upload request with no file");
                return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read multipart: {}", e),
                );
            }
        };

        if field.name() != Some(FILE_FIELD) && field.file_name().is_none() {
            continue;
        }

        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_FILENAME)
            .to_string();
        let content_type = field.content_type().map(str::to_string);

        tracing::debug!(filename = %filename, content_type = ?content_type, "Receiving video upload");

        let stream = field.map_err(|e| io::Error::other(e.to_string())).boxed();

        return match state
            .task_service
            .submit(&filename, content_type.as_deref(), stream)
            .await
        {
            Ok(task_id) => (
                StatusCode::OK,
                Json(UploadResponse {
                    task_id: task_id.to_string(),
                    status: "processing",
                }),
            )
                .into_response(),
            Err(TaskServiceError::QueueFull) => error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "Transcription queue is full, try again later",
            ),
            Err(TaskServiceError::WorkerUnavailable) => error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "Transcription worker unavailable",
            ),
            Err(e) => {
                tracing::error!(error = %e, "Failed to accept upload");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to store upload: {}", e),
                )
            }
        };
    }
}
