use std::sync::Arc;
use std::time::Duration;

use crate::core::Config;
use crate::session::{SessionFactory, SessionStore, SharedSession};

use super::error::ApiError;

/// Uploads one request body is sized for
const MAX_IMAGES_PER_REQUEST: usize = 4;
/// Room for the message text, JSON framing and data-URL prefixes
const BODY_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Shared state for all handlers
pub struct ServerState {
    factory: SessionFactory,
    store: Arc<dyn SessionStore>,
    max_upload_bytes: usize,
    keep_alive: Duration,
}

impl ServerState {
    pub fn new(factory: SessionFactory, store: Arc<dyn SessionStore>) -> Self {
        let server = &factory.config().server;
        let max_upload_bytes = server.max_upload_bytes;
        let keep_alive = Duration::from_secs(server.keep_alive_secs.max(1));
        Self {
            factory,
            store,
            max_upload_bytes,
            keep_alive,
        }
    }

    pub fn config(&self) -> &Config {
        self.factory.config()
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Existing session for `id`, or a new one when the id is absent or unknown
    ///
    /// The id comes back alongside the session so callers never need the
    /// session lock just to learn it.
    pub async fn session_for(&self, id: Option<&str>) -> Result<(String, SharedSession), ApiError> {
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            if let Some(session) = self.store.load(id).await {
                return Ok((id.to_string(), session));
            }
            tracing::debug!(session = id, "Unknown session id, starting a new session");
        }

        let session = self.factory.create().await?;
        let id = session.id().to_string();
        Ok((id, self.store.insert(session).await))
    }

    /// Largest request body accepted, sized for base64-encoded uploads
    pub fn body_limit(&self) -> usize {
        let encoded = self.max_upload_bytes.saturating_mul(4) / 3;
        encoded
            .saturating_mul(MAX_IMAGES_PER_REQUEST)
            .saturating_add(BODY_OVERHEAD_BYTES)
    }
}
