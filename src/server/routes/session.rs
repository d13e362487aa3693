use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use tracing::info;

use super::super::dto::{HealthResponse, ResetRequest, ResetResponse};
use super::super::state::ServerState;

/// POST /api/reset
///
/// Resetting an unknown or already reset session still succeeds.
pub async fn reset_handler(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<ResetRequest>,
) -> Json<ResetResponse> {
    if let Some(id) = payload.session_id.as_deref() {
        let removed = state.store().remove(id).await;
        info!(session = id, removed, "Reset session");
    }
    Json(ResetResponse { success: true })
}

/// GET /api/health
pub async fn health_handler(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.store().len().await,
        version: env!("CARGO_PKG_VERSION"),
    })
}
