use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::error::ServerError;
use super::routes;
use super::state::ServerState;

/// Build the API router
pub fn router(state: Arc<ServerState>) -> Router {
    let body_limit = state.body_limit();

    Router::new()
        .route("/api/chat", post(routes::chat::chat_handler))
        .route("/api/chat/stream", post(routes::chat::chat_stream_handler))
        .route(
            "/api/download/{session_id}",
            get(routes::download::download_handler),
        )
        .route("/api/reset", post(routes::session::reset_handler))
        .route("/api/health", get(routes::session::health_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub(super) async fn serve(state: Arc<ServerState>, addr: SocketAddr) -> Result<(), ServerError> {
    info!(%addr, "Binding REST server");

    let app = router(state);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "REST server ready to accept connections");

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(ServerError::Serve)
}
