//! Configuration management for Deckwright
//!
//! Supports environment variables, config files, and runtime overrides.
//! Models are interchangeable via settings.
//!
//! Config file location: ~/.config/deckwright/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{DeckError, Result};

const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Main configuration for Deckwright
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model provider configuration
    pub anthropic: AnthropicConfig,
    /// Model configuration
    pub models: ModelConfig,
    /// Agent loop configuration
    pub agent: AgentConfig,
    /// Artifact workspace configuration
    pub workspace: WorkspaceConfig,
    /// Slide rendering configuration
    pub browser: BrowserConfig,
    /// Provider-side web search
    pub web_search: WebSearchConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
}

/// Anthropic API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    /// API key (falls back to ANTHROPIC_API_KEY)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL of the Messages API
    pub base_url: String,
    /// Value of the anthropic-version header
    pub api_version: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Model configuration - interchangeable models
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model that talks with the user and gathers requirements
    pub chat: String,
    /// Model that writes the slide files
    pub generation: String,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Iteration cap for one user turn of the conversational agent
    /// Default: 10
    pub max_chat_iterations: usize,
    /// Iteration cap for one generation run
    /// Default: 30
    pub max_generation_iterations: usize,
    /// Max output tokens per conversational request
    pub chat_max_tokens: u32,
    /// Max output tokens per generation request
    pub generation_max_tokens: u32,
    /// Sampling temperature for both agents
    pub temperature: f32,
    /// User turns required before delegation is accepted
    /// Default: 2
    pub min_user_turns_before_delegation: usize,
    /// Whether to show debug output
    pub debug: bool,
}

/// Where generated artifacts live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Root of the sandboxed working directory
    pub root: PathBuf,
    /// Slide source directory (relative to root)
    pub slides_dir: String,
    /// Screenshot directory (relative to root)
    pub screenshots_dir: String,
    /// Packaged deck directory (relative to root)
    pub exports_dir: String,
    /// Uploaded attachment directory (relative to root)
    pub uploads_dir: String,
}

/// Browser used to capture slides
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Session name for agent-browser
    pub session_name: String,
    /// Whether to run in headed mode (visible browser)
    pub headed: bool,
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
    /// Pause after load so fonts and styles settle, in ms
    pub settle_ms: u64,
}

/// Provider-side web search tool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    /// Whether the conversational agent may search the web
    pub enabled: bool,
    /// Max searches per request
    pub max_uses: u32,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Maximum decoded size of one uploaded image
    pub max_upload_bytes: usize,
    /// Interval between SSE keep-alive comments
    pub keep_alive_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: env::var("ANTHROPIC_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: env::var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com".to_string()),
            api_version: "2023-06-01".to_string(),
            timeout_secs: 300,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            chat: env::var("DECKWRIGHT_CHAT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            generation: env::var("DECKWRIGHT_GENERATION_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_chat_iterations: 10,
            max_generation_iterations: 30,
            chat_max_tokens: 16000,
            generation_max_tokens: 4000,
            temperature: 0.0,
            min_user_turns_before_delegation: 2,
            debug: env::var("DECKWRIGHT_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: env::var("DECKWRIGHT_WORKSPACE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            slides_dir: "slides".to_string(),
            screenshots_dir: "screenshots".to_string(),
            exports_dir: "exports".to_string(),
            uploads_dir: "uploads".to_string(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            session_name: env::var("DECKWRIGHT_BROWSER_SESSION")
                .unwrap_or_else(|_| "deckwright".to_string()),
            headed: env::var("DECKWRIGHT_BROWSER_HEADED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            viewport_width: 1920,
            viewport_height: 1080,
            settle_ms: 500,
        }
    }
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_uses: 10,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: env::var("DECKWRIGHT_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            max_upload_bytes: 16 * 1024 * 1024,
            keep_alive_secs: 15,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("deckwright")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        match Self::load_from_file() {
            Ok(mut config) => {
                if config.anthropic.api_key.is_none() {
                    config.anthropic.api_key = AnthropicConfig::default().api_key;
                }
                config
            }
            Err(e) => {
                tracing::debug!(error = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(DeckError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| DeckError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| DeckError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file();
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.exists()) {
            fs::create_dir_all(dir)
                .map_err(|e| DeckError::config(format!("Failed to create config dir: {}", e)))?;
        }

        // The key stays in the environment, never on disk
        let mut on_disk = self.clone();
        on_disk.anthropic.api_key = None;

        let content = toml::to_string_pretty(&on_disk)
            .map_err(|e| DeckError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| DeckError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let mut config = Config::default();
        config.anthropic.api_key = None;
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }

    /// Full URL of the Messages endpoint
    pub fn anthropic_url(&self) -> String {
        format!("{}/v1/messages", self.anthropic.base_url.trim_end_matches('/'))
    }

    /// Bind address for the HTTP server
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
