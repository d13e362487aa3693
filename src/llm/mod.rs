//! LLM module - Language Model integrations
//!
//! Provides the provider abstraction both agents depend on, with the
//! Anthropic Messages API as the production backend.

pub mod anthropic;
pub mod traits;

use std::sync::Arc;

use crate::core::{Config, Result};

pub use anthropic::AnthropicClient;
pub use traits::{ChatRequest, LLMProvider, LLMResponse, StopReason, TokenUsage};

/// Build the configured provider
pub fn create_provider(config: &Config) -> Result<Arc<dyn LLMProvider>> {
    Ok(Arc::new(AnthropicClient::from_config(config)?))
}
