use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::{info, warn};

use super::super::error::ApiError;
use super::super::state::ServerState;

const PPTX_MIME: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// GET /api/download/{session_id}
pub async fn download_handler(
    State(state): State<Arc<ServerState>>,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    let shared = state
        .store()
        .load(&session_id)
        .await
        .ok_or_else(|| ApiError::not_found("Session not found"))?;

    let path = shared
        .lock()
        .await
        .artifact()
        .cloned()
        .ok_or_else(|| ApiError::not_found("No presentation available"))?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        warn!(session = %session_id, path = %path.display(), error = %e, "Linked deck is missing");
        ApiError::not_found("Presentation file not found")
    })?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "presentation.pptx".to_string());

    info!(session = %session_id, file = %filename, bytes = bytes.len(), "Serving deck");

    Ok((
        [
            (header::CONTENT_TYPE, PPTX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}
