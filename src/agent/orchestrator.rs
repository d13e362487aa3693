//! Conversational agent
//!
//! Talks with the user, gathers requirements and, once enough has been
//! collected, hands them to the [`GenerationAgent`] and the renderer.
//! One call to [`ConversationAgent::handle_turn`] is one user turn.

use std::path::PathBuf;
use std::sync::Arc;

use crate::agent::attachments::build_user_message;
use crate::agent::conversation::Conversation;
use crate::agent::generation::{GenerationAgent, Requirements};
use crate::agent::loop_state::{AgentLoopState, Observation};
use crate::agent::progress::{ProgressEvent, ProgressListener};
use crate::agent::prompts::CONVERSATION_SYSTEM_PROMPT;
use crate::core::{AgentRole, Config, ContentBlock, Message, Result, Role, ToolCall, ToolChoice};
use crate::llm::{ChatRequest, LLMProvider, StopReason};
use crate::render::{DeckRenderer, ExportArtifact};
use crate::tools::{names, CompletionPayload, ToolExecutor, ToolRegistry, ERROR_PREFIX};
use crate::workspace::Workspace;

/// Reply appended when a turn runs out of iterations
const ITERATION_CAP_REPLY: &str = "Sorry, I encountered an issue finishing that request. Please try again.";

/// Reply used when the model ends a turn with no text
const EMPTY_REPLY: &str = "I apologize, but I couldn't generate a response.";

/// Characters of a tool result shown in progress events
const PREVIEW_CHARS: usize = 120;

/// Result of one user turn
#[derive(Debug, Clone)]
pub struct AssistantReply {
    /// Text shown to the user
    pub text: String,
    /// Deck exported during this turn, if any
    pub artifact: Option<ExportArtifact>,
    /// Attachments that could not be sent
    pub warnings: Vec<String>,
    /// Model round-trips used
    pub iterations: usize,
}

/// Main agent that talks to the user
pub struct ConversationAgent {
    /// Configuration
    config: Config,
    /// LLM client
    llm: Arc<dyn LLMProvider>,
    /// Tool registry
    tools: Arc<ToolRegistry>,
    /// Nested deck generator
    generator: GenerationAgent,
    /// Screenshot and export step
    renderer: Arc<dyn DeckRenderer>,
    /// Conversation history
    conversation: Conversation,
    /// Most recent export
    last_artifact: Option<ExportArtifact>,
}

impl ConversationAgent {
    /// Create an agent writing into `workspace`
    pub fn new(
        config: Config,
        llm: Arc<dyn LLMProvider>,
        renderer: Arc<dyn DeckRenderer>,
        workspace: &Workspace,
    ) -> Self {
        let tools = Arc::new(ToolRegistry::new(&config.web_search));
        let generator = GenerationAgent::builder(
            llm.clone(),
            ToolExecutor::new(workspace.root()),
            &config,
        )
        .tools(&tools)
        .build();

        Self {
            config,
            llm,
            tools,
            generator,
            renderer,
            conversation: Conversation::new(),
            last_artifact: None,
        }
    }

    /// Handle one user turn
    ///
    /// Provider errors roll the history back to where it was before the
    /// turn, so the same message can simply be sent again.
    pub async fn handle_turn(
        &mut self,
        message: &str,
        attachments: &[PathBuf],
        listener: &dyn ProgressListener,
    ) -> Result<AssistantReply> {
        listener.on_event(ProgressEvent::TurnStarted);

        let (user_message, warnings) = build_user_message(message, attachments).await?;
        for warning in &warnings {
            listener.on_event(ProgressEvent::Warning {
                message: warning.clone(),
            });
        }

        let snapshot = self.conversation.snapshot();
        self.conversation.push(user_message);

        match self.run_loop(listener).await {
            Ok((text, artifact, iterations)) => {
                listener.on_event(ProgressEvent::Reply { text: text.clone() });
                Ok(AssistantReply {
                    text,
                    artifact,
                    warnings,
                    iterations,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "Turn failed, rolling back history");
                self.conversation.rollback(snapshot);
                listener.on_event(ProgressEvent::Error {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Chat loop for one turn
    async fn run_loop(
        &mut self,
        listener: &dyn ProgressListener,
    ) -> Result<(String, Option<ExportArtifact>, usize)> {
        let mut state = AgentLoopState::new(self.config.agent.max_chat_iterations);
        let mut artifact = None;

        while state.should_continue() {
            let iteration = state.next_iteration();
            tracing::debug!(iteration, max = state.max_iterations, "Chat iteration");
            listener.on_event(ProgressEvent::Iteration {
                agent: AgentRole::Conversation,
                iteration,
                max: state.max_iterations,
            });

            let request = ChatRequest {
                model: self.config.models.chat.clone(),
                system: CONVERSATION_SYSTEM_PROMPT.to_string(),
                messages: self.conversation.messages().to_vec(),
                tools: self.tools.conversation_tools(),
                tool_choice: ToolChoice::Auto,
                max_tokens: self.config.agent.chat_max_tokens,
                temperature: self.config.agent.temperature,
            };

            let response = self.llm.chat(request).await?;
            let calls = response.tool_calls();
            let stop_reason = response.stop_reason;
            let text = response.text();

            self.conversation
                .push(Message::with_blocks(Role::Assistant, response.content));

            if calls.is_empty() {
                if stop_reason == StopReason::PauseTurn {
                    // Server-side search still running; send the turn back
                    continue;
                }

                let text = if text.trim().is_empty() {
                    EMPTY_REPLY.to_string()
                } else {
                    text
                };
                tracing::info!(iterations = iteration, "Turn complete");
                return Ok((text, artifact, iteration));
            }

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                listener.on_event(ProgressEvent::ToolCalled {
                    agent: AgentRole::Conversation,
                    tool: call.name.clone(),
                });

                let observation = self.dispatch(call, &mut artifact, listener).await;

                listener.on_event(ProgressEvent::ToolFinished {
                    agent: AgentRole::Conversation,
                    tool: call.name.clone(),
                    is_error: !observation.success,
                    preview: observation.preview(PREVIEW_CHARS),
                });
                results.push(ContentBlock::tool_result(
                    &call.id,
                    observation.output.clone(),
                    !observation.success,
                ));
                state.observe(observation);
            }

            self.conversation
                .push(Message::with_blocks(Role::User, results));
        }

        tracing::warn!(max = state.max_iterations, "Turn hit the iteration cap");
        self.conversation.push(Message::assistant(ITERATION_CAP_REPLY));
        Ok((ITERATION_CAP_REPLY.to_string(), artifact, state.iteration))
    }

    /// Execute one client-side tool call
    async fn dispatch(
        &mut self,
        call: &ToolCall,
        artifact: &mut Option<ExportArtifact>,
        listener: &dyn ProgressListener,
    ) -> Observation {
        match call.name.as_str() {
            names::GENERATE_PRESENTATION => self.delegate(call, artifact, listener).await,
            // Runs on the provider; only reached if it is echoed as a client call
            names::WEB_SEARCH => Observation::success(&call.name, "Web search completed (server-side)"),
            other => Observation::error(
                &call.name,
                format!("{}Unknown tool '{}'", ERROR_PREFIX, other),
            ),
        }
    }

    /// Run generation and export for a delegation call
    async fn delegate(
        &mut self,
        call: &ToolCall,
        artifact: &mut Option<ExportArtifact>,
        listener: &dyn ProgressListener,
    ) -> Observation {
        let required = self.config.agent.min_user_turns_before_delegation;
        let user_turns = self.conversation.user_turns();
        if user_turns < required {
            tracing::warn!(user_turns, required, "Delegation attempted too early, rejecting");
            return Observation::error(
                &call.name,
                format!(
                    "{}generate_presentation is not available yet ({} of {} user turns). \
                     Ask the user your clarifying questions and wait for their answers first.",
                    ERROR_PREFIX, user_turns, required
                ),
            );
        }

        let requirements = match Requirements::from_arguments(&call.arguments) {
            Ok(requirements) => requirements,
            Err(e) => {
                return Observation::error(
                    &call.name,
                    format!("{}Invalid presentation requirements: {}", ERROR_PREFIX, e),
                );
            }
        };

        tracing::info!(topic = %requirements.topic, "Delegating to the generation agent");

        let payload = match self.generator.run(&requirements, listener).await {
            Ok(payload) => payload,
            Err(failure) => {
                tracing::warn!(
                    kind = %failure.kind,
                    iterations = failure.iterations,
                    "Generation failed"
                );
                return Observation::error(
                    &call.name,
                    format!("{}Failed to generate presentation: {}", ERROR_PREFIX, failure),
                );
            }
        };

        if !payload.success {
            return Observation::error(
                &call.name,
                format!(
                    "{}Failed to generate presentation: {}",
                    ERROR_PREFIX, payload.message
                ),
            );
        }

        match self.renderer.render(&payload, listener).await {
            Ok(export) => {
                let text = success_message(&payload, Some(&export), None);
                *artifact = Some(export.clone());
                self.last_artifact = Some(export);
                Observation::success(&call.name, text)
            }
            Err(e) => {
                // Slides exist on disk even when packaging fails
                tracing::warn!(error = %e, "Export failed");
                Observation::success(&call.name, success_message(&payload, None, Some(&e.to_string())))
            }
        }
    }

    /// Clear history and forget the last export
    pub fn reset(&mut self) {
        self.conversation.clear();
        self.last_artifact = None;
    }

    /// Conversation history
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Number of user turns so far
    pub fn user_turns(&self) -> usize {
        self.conversation.user_turns()
    }

    /// Most recent export
    pub fn last_artifact(&self) -> Option<&ExportArtifact> {
        self.last_artifact.as_ref()
    }

    /// Get current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Set the chat model
    pub fn set_chat_model(&mut self, model: impl Into<String>) {
        self.config.models.chat = model.into();
    }

    /// Set the generation model
    pub fn set_generation_model(&mut self, model: impl Into<String>) {
        let model = model.into();
        self.generator.set_model(model.clone());
        self.config.models.generation = model;
    }

    /// Enable debug mode
    pub fn set_debug(&mut self, debug: bool) {
        self.config.agent.debug = debug;
    }

    /// Names of the tools offered to the chat model
    pub fn tool_names(&self) -> Vec<String> {
        self.tools
            .conversation_tools()
            .iter()
            .map(|t| t.name().to_string())
            .collect()
    }

    /// Provider name
    pub fn provider_name(&self) -> &str {
        self.llm.name()
    }
}

/// Tool result reported back to the chat model after a successful run
fn success_message(
    payload: &CompletionPayload,
    export: Option<&ExportArtifact>,
    export_error: Option<&str>,
) -> String {
    let files = payload.slide_files().collect::<Vec<_>>().join(", ");
    let mut message = format!(
        "Successfully generated presentation!\n\nSlide count: {}\nFiles created: {}\n\n{}\n",
        payload.slide_count(),
        files,
        payload.message
    );

    if let Some(export) = export {
        message.push_str(&format!(
            "\nPPTX file: {}\nIt opens in PowerPoint or Keynote.\n",
            export.pptx_path.display()
        ));
    }
    if let Some(error) = export_error {
        message.push_str(&format!("\nPPTX export failed: {}\n", error));
    }

    message.push_str("\nThe HTML slides can also be opened directly in a browser.");
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::SlideEntry;

    fn payload() -> CompletionPayload {
        CompletionPayload {
            success: true,
            title: "Deck".to_string(),
            message: "Two slides".to_string(),
            slides: vec![
                SlideEntry {
                    index: 1,
                    file: "slides/slide_1.html".to_string(),
                },
                SlideEntry {
                    index: 2,
                    file: "slides/slide_2.html".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_success_message_lists_files() {
        let export = ExportArtifact {
            pptx_path: PathBuf::from("exports/Deck.pptx"),
            screenshots: vec![],
            created_at: chrono::Utc::now(),
        };
        let text = success_message(&payload(), Some(&export), None);
        assert!(text.contains("Slide count: 2"));
        assert!(text.contains("slides/slide_1.html, slides/slide_2.html"));
        assert!(text.contains("exports/Deck.pptx"));
    }

    #[test]
    fn test_success_message_reports_export_failure() {
        let text = success_message(&payload(), None, Some("No screenshots captured"));
        assert!(text.contains("PPTX export failed: No screenshots captured"));
        assert!(!text.starts_with(ERROR_PREFIX));
    }
}
