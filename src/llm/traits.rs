//! LLM Provider trait for abstracting different backends
//!
//! Both agents talk to the model only through [`LLMProvider`], so the
//! Anthropic client can be swapped for any backend with tool calling.

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::{ContentBlock, Message, Result, ToolCall, ToolChoice, ToolDefinition};

/// A single request to the model
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier
    pub model: String,
    /// System instructions
    pub system: String,
    /// Full turn history
    pub messages: Vec<Message>,
    /// Tools offered for this request
    pub tools: Vec<ToolDefinition>,
    /// Tool-use constraint mode
    pub tool_choice: ToolChoice,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    /// A provider-side tool is still running; send the turn back to resume
    PauseTurn,
    #[serde(other)]
    Other,
}

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct LLMResponse {
    /// Content blocks in the order the model produced them
    pub content: Vec<ContentBlock>,
    /// Stop reason reported by the provider
    pub stop_reason: StopReason,
    /// Token usage information
    pub usage: Option<TokenUsage>,
    /// Model that generated the response
    pub model: String,
}

/// Token usage information
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LLMResponse {
    /// Client-side tool calls, in order
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => {
                    Some(ToolCall::new(id.clone(), name.clone(), input.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// Concatenated text blocks
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send one request and wait for the complete response
    async fn chat(&self, request: ChatRequest) -> Result<LLMResponse>;

    /// Get the provider name
    fn name(&self) -> &str;
}
