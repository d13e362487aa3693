//! Sessions and session storage
//!
//! A session owns one [`ConversationAgent`], its own workspace and the
//! last deck it produced. Sessions are handed out as
//! `Arc<Mutex<Session>>`, so a session never runs two turns at once.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::agent::progress::ProgressListener;
use crate::agent::{AssistantReply, ConversationAgent};
use crate::core::{Config, Result, Role};
use crate::llm::LLMProvider;
use crate::render::{BrowserRenderer, DeckRenderer, SlideCapture};
use crate::workspace::Workspace;

/// Builds the renderer for a session workspace and session id
pub type RendererFactory = Arc<dyn Fn(&Workspace, &str) -> Arc<dyn DeckRenderer> + Send + Sync>;

/// A session shared between requests
pub type SharedSession = Arc<Mutex<Session>>;

/// One line of the user-visible transcript
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<PathBuf>,
}

/// Outcome of one submitted turn
#[derive(Debug, Clone)]
pub struct TurnSummary {
    pub reply: AssistantReply,
    /// Deck linked to this session, if any
    pub pptx_path: Option<PathBuf>,
}

/// One user's conversation
pub struct Session {
    id: String,
    agent: ConversationAgent,
    transcript: Vec<TranscriptEntry>,
    artifact: Option<PathBuf>,
    started_at: DateTime<Utc>,
    workspace: Workspace,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Deck linked to this session
    pub fn artifact(&self) -> Option<&PathBuf> {
        self.artifact.as_ref()
    }

    pub fn agent(&self) -> &ConversationAgent {
        &self.agent
    }

    /// Run one turn and link any deck it produced
    pub async fn submit(
        &mut self,
        message: &str,
        attachments: &[PathBuf],
        listener: &dyn ProgressListener,
    ) -> Result<TurnSummary> {
        tracing::debug!(session = %self.id, attachments = attachments.len(), "Submitting turn");

        let reply = self.agent.handle_turn(message, attachments, listener).await?;

        self.transcript.push(TranscriptEntry {
            role: Role::User,
            content: message.to_string(),
            images: attachments.to_vec(),
        });
        self.transcript.push(TranscriptEntry {
            role: Role::Assistant,
            content: reply.text.clone(),
            images: Vec::new(),
        });

        if let Some(path) = self.link_artifact(&reply).await {
            tracing::info!(session = %self.id, path = %path.display(), "Linked deck to session");
            self.artifact = Some(path);
        }

        Ok(TurnSummary {
            reply,
            pptx_path: self.artifact.clone(),
        })
    }

    /// Deck belonging to this session, never one from another workspace or an earlier run
    async fn link_artifact(&self, reply: &AssistantReply) -> Option<PathBuf> {
        if let Some(artifact) = &reply.artifact {
            if artifact.created_at >= self.started_at
                && artifact.pptx_path.starts_with(self.workspace.root())
            {
                return Some(artifact.pptx_path.clone());
            }
            tracing::warn!(
                session = %self.id,
                path = %artifact.pptx_path.display(),
                "Ignoring deck outside the session workspace"
            );
        }

        self.workspace.latest_export_since(self.started_at).await
    }
}

/// Storage for live sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: &str) -> Option<SharedSession>;
    async fn insert(&self, session: Session) -> SharedSession;
    /// Returns whether a session was removed
    async fn remove(&self, id: &str) -> bool;
    async fn len(&self) -> usize;
}

/// Process-local session store
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SharedSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: &str) -> Option<SharedSession> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn insert(&self, session: Session) -> SharedSession {
        let id = session.id.clone();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, shared.clone());
        shared
    }

    async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Creates sessions with their own workspace and browser session
pub struct SessionFactory {
    config: Config,
    llm: Arc<dyn LLMProvider>,
    workspace: Workspace,
    renderer: RendererFactory,
}

impl SessionFactory {
    pub fn new(config: Config, llm: Arc<dyn LLMProvider>) -> Self {
        let workspace = Workspace::from_config(&config.workspace);
        let browser = config.browser.clone();

        let renderer: RendererFactory = Arc::new(move |workspace: &Workspace, id: &str| {
            let capture = SlideCapture::new(&browser)
                .with_session(format!("{}-{}", browser.session_name, short_id(id)));
            Arc::new(BrowserRenderer::new(workspace.clone(), capture)) as Arc<dyn DeckRenderer>
        });

        Self {
            config,
            llm,
            workspace,
            renderer,
        }
    }

    /// Replace how renderers are built
    pub fn with_renderer(mut self, renderer: RendererFactory) -> Self {
        self.renderer = renderer;
        self
    }

    /// Root workspace; sessions live under `<root>/sessions/<id>`
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create a fresh session
    pub async fn create(&self) -> Result<Session> {
        let id = uuid::Uuid::new_v4().to_string();
        let workspace = self.workspace.for_session(&id);
        workspace.ensure().await?;
        let started_at = workspace.mark_started().await?;

        let renderer = (self.renderer)(&workspace, &id);
        let agent = ConversationAgent::new(self.config.clone(), self.llm.clone(), renderer, &workspace);

        tracing::info!(session = %id, root = %workspace.root().display(), "Created session");

        Ok(Session {
            id,
            agent,
            transcript: Vec::new(),
            artifact: None,
            started_at,
            workspace,
        })
    }
}

fn short_id(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("3f2a9c1e-aaaa-bbbb"), "3f2a9c1e");
        assert_eq!(short_id("plain"), "plain");
    }
}
