//! Test doubles shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use deckwright::agent::progress::{ProgressEvent, ProgressListener};
use deckwright::core::{ContentBlock, DeckError, Result};
use deckwright::llm::{ChatRequest, LLMProvider, LLMResponse, StopReason};
use deckwright::render::{DeckRenderer, ExportArtifact};
use deckwright::tools::CompletionPayload;
use deckwright::workspace::Workspace;
use deckwright::Config;

/// Provider that replays queued responses and records every request
pub struct ScriptedProvider {
    script: Mutex<VecDeque<std::result::Result<LLMResponse, String>>>,
    fallback: Option<LLMResponse>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<LLMResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().map(Ok).collect()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer with `response` once the script runs out
    pub fn repeating(response: LLMResponse) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a provider failure
    pub fn then_fail(self, message: &str) -> Self {
        self.script.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    /// Queue another response
    pub fn then(self, response: LLMResponse) -> Self {
        self.script.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn chat(&self, request: ChatRequest) -> Result<LLMResponse> {
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(DeckError::provider(message)),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| DeckError::provider("script exhausted")),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Renderer that writes a placeholder deck instead of driving a browser
pub struct FakeRenderer {
    workspace: Workspace,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeRenderer {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(workspace: Workspace) -> Self {
        Self {
            fail: true,
            ..Self::new(workspace)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeckRenderer for FakeRenderer {
    async fn render(
        &self,
        payload: &CompletionPayload,
        listener: &dyn ProgressListener,
    ) -> Result<ExportArtifact> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DeckError::AgentBrowserNotFound);
        }

        let pptx_path = self.workspace.export_path(&payload.title);
        if let Some(parent) = pptx_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&pptx_path, b"PK placeholder").await?;

        listener.on_event(ProgressEvent::ExportFinished {
            path: pptx_path.clone(),
        });

        Ok(ExportArtifact {
            pptx_path,
            screenshots: Vec::new(),
            created_at: Utc::now(),
        })
    }
}

/// Listener that keeps every event
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingListener {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressListener for RecordingListener {
    fn on_event(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Config rooted at `root` with web search off
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.workspace.root = root.to_path_buf();
    config.web_search.enabled = false;
    config.agent.max_chat_iterations = 10;
    config.agent.max_generation_iterations = 30;
    config.agent.min_user_turns_before_delegation = 2;
    config
}

pub fn text_response(text: &str) -> LLMResponse {
    LLMResponse {
        content: vec![ContentBlock::text(text)],
        stop_reason: StopReason::EndTurn,
        usage: None,
        model: "scripted".to_string(),
    }
}

pub fn tool_response(calls: Vec<(&str, &str, Value)>) -> LLMResponse {
    LLMResponse {
        content: calls
            .into_iter()
            .map(|(id, name, input)| ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input,
            })
            .collect(),
        stop_reason: StopReason::ToolUse,
        usage: None,
        model: "scripted".to_string(),
    }
}

pub fn create_file(id: &str, path: &str, content: &str) -> LLMResponse {
    tool_response(vec![(
        id,
        "create_file",
        json!({"file_path": path, "content": content}),
    )])
}

pub fn return_result(id: &str, title: &str, files: &[&str]) -> LLMResponse {
    tool_response(vec![(
        id,
        "return_result",
        json!({
            "success": true,
            "title": title,
            "message": "Deck ready",
            "slide_count": files.len(),
            "slide_files": files,
        }),
    )])
}

pub fn delegation(id: &str, topic: &str) -> LLMResponse {
    tool_response(vec![(
        id,
        "generate_presentation",
        json!({
            "topic": topic,
            "description": "Quarterly review for leadership",
            "details": "Wins, risks, next steps",
            "data": "Revenue up 12%",
            "brand_logo_details": "No logo",
            "brand_guideline_details": "Minimal",
            "brand_color_details": "#0B3D91 and white",
        }),
    )])
}

