//! HTTP boundary
//!
//! JSON chat, SSE progress, deck download and session reset over axum.

mod dto;
mod error;
mod router;
mod routes;
mod state;
mod uploads;

pub use dto::{ChatRequest, ChatResponse, ImageUpload};
pub use error::{ApiError, ServerError};
pub use router::router;
pub use state::ServerState;
pub use uploads::{allowed_file, secure_filename};

use std::net::SocketAddr;
use std::sync::Arc;

use crate::session::{InMemorySessionStore, SessionFactory};

/// Serve the API with an in-memory session store
pub async fn serve(factory: SessionFactory) -> Result<(), ServerError> {
    let raw = factory.config().server_addr();
    let addr: SocketAddr = raw.parse().map_err(|_| ServerError::Address(raw.clone()))?;
    let state = Arc::new(ServerState::new(factory, Arc::new(InMemorySessionStore::new())));
    router::serve(state, addr).await
}
