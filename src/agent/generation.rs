//! Generation agent
//!
//! A bounded loop in which the model must answer with tool calls. It
//! writes slide files through the [`ToolExecutor`] and finishes the
//! moment `return_result` is called.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::conversation::Conversation;
use crate::agent::loop_state::{AgentLoopState, Observation};
use crate::agent::progress::{ProgressEvent, ProgressListener};
use crate::agent::prompts::{GENERATION_SYSTEM_PROMPT, TOOL_REQUIRED_NUDGE};
use crate::core::{
    AgentRole, Config, ContentBlock, DeckError, Message, Result, Role, ToolChoice, ToolDefinition,
};
use crate::llm::{ChatRequest, LLMProvider};
use crate::tools::{CompletionError, CompletionPayload, ExecutorError, ToolExecutor, ToolOutput, ToolRegistry};

/// Characters of a tool result shown in progress events
const PREVIEW_CHARS: usize = 120;

/// What the conversational agent collected for the deck
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(alias = "ppt_topic")]
    pub topic: String,
    #[serde(default, alias = "ppt_description")]
    pub description: String,
    #[serde(default, alias = "ppt_details")]
    pub details: String,
    #[serde(default, alias = "ppt_data")]
    pub data: String,
    #[serde(default)]
    pub brand_logo_details: String,
    #[serde(default)]
    pub brand_guideline_details: String,
    #[serde(default)]
    pub brand_color_details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_count: Option<usize>,
}

impl Requirements {
    /// Parse the delegation tool's arguments
    pub fn from_arguments(args: &serde_json::Value) -> Result<Self> {
        let requirements: Self = serde_json::from_value(args.clone())?;
        if requirements.topic.trim().is_empty() {
            return Err(DeckError::Other("'topic' must not be empty".to_string()));
        }
        Ok(requirements)
    }

    /// First user turn of a generation run
    pub fn to_prompt(&self) -> String {
        fn or_na(value: &str) -> &str {
            if value.trim().is_empty() {
                "N/A"
            } else {
                value
            }
        }

        let mut prompt = format!(
            "Please generate a presentation with the following details:\n\n\
             **Topic**: {}\n\n\
             **Description**: {}\n\n\
             **Details**: {}\n\n\
             **Data/Statistics**: {}\n\
             **Brand Colors**: {}\n\
             **Logo Details**: {}\n\
             **Brand Guidelines**: {}\n",
            self.topic,
            or_na(&self.description),
            or_na(&self.details),
            or_na(&self.data),
            or_na(&self.brand_color_details),
            or_na(&self.brand_logo_details),
            or_na(&self.brand_guideline_details),
        );

        if let Some(count) = self.slide_count {
            prompt.push_str(&format!("**Slide Count**: exactly {} slides\n", count));
        }

        prompt
    }
}

/// Why a generation run produced no deck
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FailureKind {
    #[error("no result after {0} iterations")]
    IterationCap(usize),

    #[error("{0}")]
    MalformedCompletion(CompletionError),

    #[error("provider error: {0}")]
    Provider(String),
}

/// A run that ended without a completion payload
#[derive(Debug, Error)]
#[error("Generation failed: {kind}")]
pub struct GenerationFailure {
    pub kind: FailureKind,
    /// Iterations used
    pub iterations: usize,
    /// History up to the failure; files already written stay on disk
    pub history: Vec<Message>,
}

/// Tool-forced agent that writes the slide files
#[derive(Clone)]
pub struct GenerationAgent {
    llm: Arc<dyn LLMProvider>,
    executor: ToolExecutor,
    tools: Vec<ToolDefinition>,
    model: String,
    max_iterations: usize,
    max_tokens: u32,
    temperature: f32,
}

/// Builder for creating a GenerationAgent
pub struct GenerationAgentBuilder {
    llm: Arc<dyn LLMProvider>,
    executor: ToolExecutor,
    tools: Option<Vec<ToolDefinition>>,
    model: String,
    max_iterations: usize,
    max_tokens: u32,
    temperature: f32,
}

impl GenerationAgentBuilder {
    /// Start from configuration defaults
    pub fn new(llm: Arc<dyn LLMProvider>, executor: ToolExecutor, config: &Config) -> Self {
        Self {
            llm,
            executor,
            tools: None,
            model: config.models.generation.clone(),
            max_iterations: config.agent.max_generation_iterations,
            max_tokens: config.agent.generation_max_tokens,
            temperature: config.agent.temperature,
        }
    }

    /// Use the generation tools from this registry
    pub fn tools(mut self, registry: &ToolRegistry) -> Self {
        self.tools = Some(registry.generation_tools());
        self
    }

    /// Set the model to use
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the iteration cap
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Build the agent
    pub fn build(self) -> GenerationAgent {
        GenerationAgent {
            llm: self.llm,
            executor: self.executor,
            tools: self
                .tools
                .unwrap_or_else(|| ToolRegistry::default().generation_tools()),
            model: self.model,
            max_iterations: self.max_iterations,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

impl GenerationAgent {
    /// Create a builder
    pub fn builder(
        llm: Arc<dyn LLMProvider>,
        executor: ToolExecutor,
        config: &Config,
    ) -> GenerationAgentBuilder {
        GenerationAgentBuilder::new(llm, executor, config)
    }

    /// Model in use
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Switch model
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Iteration cap
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Run until `return_result` is called or the cap is reached
    pub async fn run(
        &self,
        requirements: &Requirements,
        listener: &dyn ProgressListener,
    ) -> std::result::Result<CompletionPayload, GenerationFailure> {
        let mut history = Conversation::new();
        history.push(Message::user(requirements.to_prompt()));

        let mut state = AgentLoopState::new(self.max_iterations);

        tracing::info!(
            topic = %requirements.topic,
            max_iterations = self.max_iterations,
            "Generation started"
        );
        listener.on_event(ProgressEvent::GenerationStarted {
            topic: requirements.topic.clone(),
        });

        while state.should_continue() {
            let iteration = state.next_iteration();
            tracing::debug!(iteration, max = state.max_iterations, "Generation iteration");
            listener.on_event(ProgressEvent::Iteration {
                agent: AgentRole::Generation,
                iteration,
                max: state.max_iterations,
            });

            let request = ChatRequest {
                model: self.model.clone(),
                system: GENERATION_SYSTEM_PROMPT.to_string(),
                messages: history.messages().to_vec(),
                tools: self.tools.clone(),
                tool_choice: ToolChoice::Any,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            };

            let response = match self.llm.chat(request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(error = %e, iteration, "Generation request failed");
                    return Err(self.fail(
                        FailureKind::Provider(e.to_string()),
                        &state,
                        history,
                        listener,
                    ));
                }
            };

            let calls = response.tool_calls();
            history.push(Message::with_blocks(Role::Assistant, response.content));

            if calls.is_empty() {
                tracing::warn!(iteration, "Model answered without a tool call, re-prompting");
                history.push(Message::user(TOOL_REQUIRED_NUDGE));
                continue;
            }

            let mut results = Vec::with_capacity(calls.len());
            let mut completion = None;

            for call in &calls {
                listener.on_event(ProgressEvent::ToolCalled {
                    agent: AgentRole::Generation,
                    tool: call.name.clone(),
                });

                let (observation, is_error) = match self.executor.execute(call).await {
                    Ok(output @ ToolOutput::Text(_)) => {
                        (Observation::success(&call.name, output.history_text()), false)
                    }
                    Ok(output @ ToolOutput::Completion(_)) => {
                        let text = output.history_text();
                        if let ToolOutput::Completion(payload) = output {
                            completion = Some(payload);
                        }
                        (Observation::success(&call.name, text), false)
                    }
                    Err(ExecutorError::MalformedCompletion(e)) => {
                        let text = ToolExecutor::error_text(&ExecutorError::MalformedCompletion(e.clone()));
                        results.push(ContentBlock::tool_result(&call.id, text, true));
                        history.push(Message::with_blocks(Role::User, results));
                        tracing::warn!(error = %e, "return_result arguments were malformed");
                        return Err(self.fail(
                            FailureKind::MalformedCompletion(e),
                            &state,
                            history,
                            listener,
                        ));
                    }
                    Err(e) => {
                        tracing::debug!(tool = %call.name, error = %e, "Tool failed");
                        (Observation::error(&call.name, ToolExecutor::error_text(&e)), true)
                    }
                };

                listener.on_event(ProgressEvent::ToolFinished {
                    agent: AgentRole::Generation,
                    tool: call.name.clone(),
                    is_error,
                    preview: observation.preview(PREVIEW_CHARS),
                });
                results.push(ContentBlock::tool_result(
                    &call.id,
                    observation.output.clone(),
                    is_error,
                ));
                state.observe(observation);

                if completion.is_some() {
                    break;
                }
            }

            history.push(Message::with_blocks(Role::User, results));

            if let Some(mut payload) = completion {
                if payload.title.is_empty() {
                    payload.title = requirements.topic.clone();
                }

                tracing::info!(
                    iterations = state.iteration,
                    tool_calls = state.tool_calls(),
                    failures = state.failures(),
                    slides = payload.slide_count(),
                    "Generation finished"
                );
                listener.on_event(ProgressEvent::GenerationFinished {
                    success: payload.success,
                    slide_count: payload.slide_count(),
                });
                return Ok(payload);
            }
        }

        tracing::warn!(max = self.max_iterations, "Generation hit the iteration cap");
        Err(self.fail(
            FailureKind::IterationCap(self.max_iterations),
            &state,
            history,
            listener,
        ))
    }

    fn fail(
        &self,
        kind: FailureKind,
        state: &AgentLoopState,
        history: Conversation,
        listener: &dyn ProgressListener,
    ) -> GenerationFailure {
        listener.on_event(ProgressEvent::GenerationFinished {
            success: false,
            slide_count: 0,
        });
        GenerationFailure {
            kind,
            iterations: state.iteration,
            history: history.messages().to_vec(),
        }
    }
}
