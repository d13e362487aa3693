//! Custom error types for Deckwright
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Deckwright operations
#[derive(Error, Debug)]
pub enum DeckError {
    /// Model provider connection or API errors
    #[error("Provider error: {0}")]
    Provider(String),

    /// Browser automation errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// Deck export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Attachment errors that leave nothing to send
    #[error("Attachment error: {0}")]
    Attachment(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PPTX archive errors
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// agent-browser not installed
    #[error("agent-browser not found. Install with: npm install -g agent-browser && agent-browser install")]
    AgentBrowserNotFound,

    /// Missing API key
    #[error("ANTHROPIC_API_KEY not set. Add it to your environment or .env file")]
    MissingApiKey,

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Deckwright operations
pub type Result<T> = std::result::Result<T, DeckError>;

impl DeckError {
    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create an export error
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an attachment error
    pub fn attachment(msg: impl Into<String>) -> Self {
        Self::Attachment(msg.into())
    }

    /// Whether the error came from the model provider round-trip
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::Http(_) | Self::MissingApiKey)
    }
}
