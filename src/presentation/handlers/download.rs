use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;

use crate::presentation::state::AppState;

use super::error_response::error_response;

pub const DOWNLOAD_FILENAME: &str = "translated_subtitles.srt";
const SUBRIP_CONTENT_TYPE: &str = "application/x-subrip";

#[tracing::instrument(skip(state))]
pub async fn download_handler(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> impl IntoResponse {
    match state.task_service.download(&task_id).await {
        Ok(Some(bytes)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, SUBRIP_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", DOWNLOAD_FILENAME),
                ),
            ],
            bytes,
        )
            .into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "File not found"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read subtitle artifact");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read subtitle file",
            )
        }
    }
}
