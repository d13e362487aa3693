//! Anthropic Messages API client
//!
//! Async HTTP client with tool calling, tool-choice constraints and
//! image content.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{Config, ContentBlock, DeckError, Message, Result, ToolChoice, ToolDefinition};
use crate::llm::traits::{ChatRequest, LLMProvider, LLMResponse, StopReason, TokenUsage};

/// Anthropic API client
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    url: String,
    api_key: String,
    api_version: String,
}

/// Messages API request body
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tools: &'a [ToolDefinition],
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

/// Messages API response body
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    model: String,
    stop_reason: Option<StopReason>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

/// Messages API error body
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

impl AnthropicClient {
    /// Create a client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .anthropic
            .api_key
            .clone()
            .ok_or(DeckError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.anthropic.timeout_secs))
            .build()
            .map_err(|e| DeckError::provider(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.anthropic_url(),
            api_key,
            api_version: config.anthropic.api_version.clone(),
        })
    }

    /// Build the wire body for a request
    fn to_wire(request: &ChatRequest) -> MessagesRequest<'_> {
        // Anthropic rejects tool_choice when no tools are declared
        let tool_choice = if request.tools.is_empty() {
            None
        } else {
            Some(request.tool_choice)
        };

        MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: &request.system,
            messages: &request.messages,
            tools: &request.tools,
            tool_choice,
        }
    }

    /// Turn a non-2xx response into a provider error
    fn describe_failure(status: reqwest::StatusCode, body: &str) -> DeckError {
        let detail = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| format!("{}: {}", e.error.kind, e.error.message))
            .unwrap_or_else(|_| body.to_string());

        if status.as_u16() == 401 {
            DeckError::provider(format!("Authentication failed, check ANTHROPIC_API_KEY ({})", detail))
        } else {
            DeckError::provider(format!("Anthropic API error ({}): {}", status, detail))
        }
    }
}

#[async_trait]
impl LLMProvider for AnthropicClient {
    async fn chat(&self, request: ChatRequest) -> Result<LLMResponse> {
        let body = Self::to_wire(&request);

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            tool_choice = ?request.tool_choice,
            "Sending Messages request"
        );

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    DeckError::provider(format!("Cannot connect to {}", self.url))
                } else if e.is_timeout() {
                    DeckError::provider("Request to the model provider timed out")
                } else {
                    DeckError::from(e)
                }
            })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Self::describe_failure(status, &text));
        }

        let parsed: MessagesResponse = serde_json::from_str(&text)
            .map_err(|e| DeckError::provider(format!("Failed to parse response: {}", e)))?;

        if let Some(ref usage) = parsed.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                stop_reason = ?parsed.stop_reason,
                "Messages response received"
            );
        }

        Ok(LLMResponse {
            content: parsed.content,
            stop_reason: parsed.stop_reason.unwrap_or(StopReason::EndTurn),
            usage: parsed.usage,
            model: parsed.model,
        })
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(tools: Vec<ToolDefinition>) -> ChatRequest {
        ChatRequest {
            model: "claude-test".to_string(),
            system: "be brief".to_string(),
            messages: vec![Message::user("Hello")],
            tools,
            tool_choice: ToolChoice::Any,
            max_tokens: 64,
            temperature: 0.0,
        }
    }

    #[test]
    fn test_client_requires_api_key() {
        let mut config = Config::default();
        config.anthropic.api_key = None;
        assert!(matches!(
            AnthropicClient::from_config(&config),
            Err(DeckError::MissingApiKey)
        ));
    }

    #[test]
    fn test_wire_omits_tool_choice_without_tools() {
        let req = request(Vec::new());
        let json = serde_json::to_value(AnthropicClient::to_wire(&req)).unwrap();
        assert!(json.get("tool_choice").is_none());
        assert!(json.get("tools").is_none());
        assert_eq!(json["messages"][0]["content"][0]["text"], "Hello");
    }

    #[test]
    fn test_wire_forces_tool_use() {
        let req = request(vec![ToolDefinition::function(
            "list_files",
            "List files",
            serde_json::json!({"type": "object", "properties": {}}),
        )]);
        let json = serde_json::to_value(AnthropicClient::to_wire(&req)).unwrap();
        assert_eq!(json["tool_choice"]["type"], "any");
        assert_eq!(json["tools"][0]["name"], "list_files");
    }

    #[test]
    fn test_parse_tool_use_response() {
        let body = r#"{
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-test",
            "content": [
                {"type": "text", "text": "On it."},
                {"type": "tool_use", "id": "toolu_9", "name": "list_files", "input": {}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.stop_reason, Some(StopReason::ToolUse));
        assert_eq!(parsed.content.len(), 2);
    }

    #[test]
    fn test_describe_failure_reads_error_body() {
        let err = AnthropicClient::describe_failure(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            r#"{"type":"error","error":{"type":"rate_limit_error","message":"slow down"}}"#,
        );
        let msg = err.to_string();
        assert!(msg.contains("rate_limit_error"));
        assert!(msg.contains("slow down"));
    }
}
