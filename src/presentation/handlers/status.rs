use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::services::TaskProgress;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Unknown task ids answer `processing`, exactly like tasks still running.
#[tracing::instrument(skip(state))]
pub async fn status_handler(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> impl IntoResponse {
    let response = match state.task_service.status(&task_id).await {
        TaskProgress::Processing => StatusResponse {
            status: "processing",
            download_url: None,
            error: None,
        },
        TaskProgress::Completed => StatusResponse {
            status: "completed",
            download_url: Some(format!("/download/{}", task_id)),
            error: None,
        },
        TaskProgress::Failed { error } => StatusResponse {
            status: "failed",
            download_url: None,
            error: Some(error),
        },
    };

    Json(response)
}
