use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::stream::{self, StreamExt};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{error, info};

use super::super::dto::{ChatRequest, ChatResponse};
use super::super::error::ApiError;
use super::super::state::ServerState;
use super::super::uploads::save_uploads;
use crate::agent::progress::{ChannelListener, NoopListener, ProgressEvent, ProgressListener};
use crate::session::TurnSummary;

fn chat_response(session_id: String, summary: &TurnSummary, mut warnings: Vec<String>) -> ChatResponse {
    warnings.extend(summary.reply.warnings.iter().cloned());
    let pptx_filename = summary
        .pptx_path
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string());

    ChatResponse {
        session_id,
        response: summary.reply.text.clone(),
        has_pptx: pptx_filename.is_some(),
        pptx_filename,
        warnings,
    }
}

/// POST /api/chat
pub async fn chat_handler(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let ChatRequest {
        session_id,
        message,
        images,
    } = payload;

    info!(
        session = session_id.as_deref(),
        images = images.len(),
        "Received /api/chat request"
    );

    if message.trim().is_empty() {
        error!("Rejecting /api/chat request due to empty message");
        return Err(ApiError::bad_request("Message cannot be empty"));
    }

    let (_, shared) = state.session_for(session_id.as_deref()).await?;
    let mut session = shared.lock().await;

    let uploads_dir = session.workspace().uploads_dir();
    let (attachments, warnings) =
        save_uploads(&uploads_dir, session.id(), &images, state.max_upload_bytes()).await;

    let summary = session
        .submit(&message, &attachments, &NoopListener)
        .await
        .map_err(|e| {
            error!(session = session.id(), error = %e, "Chat turn failed");
            ApiError::from(e)
        })?;

    info!(
        session = session.id(),
        has_pptx = summary.pptx_path.is_some(),
        "Chat request completed"
    );

    Ok(Json(chat_response(session.id().to_string(), &summary, warnings)))
}

/// POST /api/chat/stream
///
/// The first event names the session. `done` follows once the turn and
/// any export have finished.
pub async fn chat_stream_handler(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let ChatRequest {
        session_id,
        message,
        images,
    } = payload;

    info!(
        session = session_id.as_deref(),
        images = images.len(),
        "Received /api/chat/stream request"
    );

    if message.trim().is_empty() {
        return Err(ApiError::bad_request("Message cannot be empty"));
    }

    let (session_id, shared) = state.session_for(session_id.as_deref()).await?;
    let (listener, rx) = ChannelListener::new();
    let max_upload_bytes = state.max_upload_bytes();

    tokio::spawn(async move {
        let mut session = shared.lock().await;
        let uploads_dir = session.workspace().uploads_dir();
        let (attachments, warnings) =
            save_uploads(&uploads_dir, session.id(), &images, max_upload_bytes).await;
        for warning in warnings {
            tracing::warn!(session = session.id(), %warning, "Upload skipped");
            listener.on_event(ProgressEvent::Warning { message: warning });
        }

        if let Err(e) = session.submit(&message, &attachments, &listener).await {
            error!(session = session.id(), error = %e, "Streamed chat turn failed");
        }
        listener.on_event(ProgressEvent::Done);
    });

    let opening = serde_json::json!({ "type": "session", "session_id": session_id }).to_string();
    let events = UnboundedReceiverStream::new(rx).map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok::<_, Infallible>(Event::default().data(data))
    });
    let body = stream::once(async move { Ok::<_, Infallible>(Event::default().data(opening)) })
        .chain(events);

    Ok(Sse::new(body)
        .keep_alive(KeepAlive::new().interval(state.keep_alive()))
        .into_response())
}
