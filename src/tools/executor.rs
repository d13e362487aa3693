//! Tool executor - runs generation tools against the workspace
//!
//! Each tool maps to one filesystem operation. Failures come back as
//! [`ExecutorError`] values whose text always starts with
//! [`ERROR_PREFIX`], so the agent loop can feed them to the model.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::ToolCall;
use crate::tools::completion::{CompletionError, CompletionPayload};
use crate::tools::registry::names;
use crate::tools::sandbox::{Sandbox, SandboxError};

/// Prefix carried by every executor failure
pub const ERROR_PREFIX: &str = "Error: ";

/// Directory listed when `list_files` gets no argument
const DEFAULT_LIST_DIR: &str = "slides";

/// Tool failures returned as data
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Error: Unknown tool '{0}'")]
    UnknownTool(String),

    #[error("Error: Missing or invalid argument '{argument}' for {tool}")]
    MissingArgument { tool: String, argument: String },

    #[error("Error: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("Error: File not found: {0}")]
    NotFound(String),

    #[error("Error: File does not exist: {0}. Use create_file instead.")]
    UpdateMissing(String),

    #[error("Error: Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error: {0}")]
    MalformedCompletion(#[from] CompletionError),
}

impl ExecutorError {
    fn io(action: &'static str, path: &str, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_string(),
            source,
        }
    }
}

/// Successful tool output
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Ordinary text result
    Text(String),
    /// The run is finished
    Completion(CompletionPayload),
}

impl ToolOutput {
    /// Text stored in history for this output
    pub fn history_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Completion(payload) => payload
                .to_sentinel()
                .unwrap_or_else(|e| format!("{}{}", ERROR_PREFIX, e)),
        }
    }
}

/// Executes generation tools inside a sandboxed working directory
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    sandbox: Sandbox,
}

impl ToolExecutor {
    /// Create an executor rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            sandbox: Sandbox::new(root),
        }
    }

    /// Working directory
    pub fn root(&self) -> &Path {
        self.sandbox.root()
    }

    /// Render any failure as the text fed back to the model
    pub fn error_text(error: &ExecutorError) -> String {
        error.to_string()
    }

    /// Whether a tool result text is an error
    pub fn is_error_text(text: &str) -> bool {
        text.starts_with(ERROR_PREFIX)
    }

    /// Execute a tool call
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, ExecutorError> {
        tracing::debug!(tool = %call.name, id = %call.id, "Executing tool");

        match call.name.as_str() {
            names::CREATE_FOLDER => self.create_folder(call).await,
            names::CREATE_FILE => self.create_file(call).await,
            names::READ_FILE => self.read_file(call).await,
            names::UPDATE_FILE => self.update_file(call).await,
            names::LIST_FILES => self.list_files(call).await,
            names::RETURN_RESULT => {
                Ok(ToolOutput::Completion(CompletionPayload::from_arguments(&call.arguments)?))
            }
            other => Err(ExecutorError::UnknownTool(other.to_string())),
        }
    }

    async fn create_folder(&self, call: &ToolCall) -> Result<ToolOutput, ExecutorError> {
        let relative = required_str(call, "folder_path")?;
        let path = self.sandbox.resolve(&relative)?;

        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| ExecutorError::io("create folder", &relative, e))?;

        Ok(ToolOutput::Text(format!(
            "Successfully created folder: {}",
            relative
        )))
    }

    async fn create_file(&self, call: &ToolCall) -> Result<ToolOutput, ExecutorError> {
        let relative = required_str(call, "file_path")?;
        let content = required_str(call, "content")?;
        let path = self.sandbox.resolve(&relative)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ExecutorError::io("create folder for", &relative, e))?;
        }

        tokio::fs::write(&path, &content)
            .await
            .map_err(|e| ExecutorError::io("create file", &relative, e))?;

        Ok(ToolOutput::Text(format!(
            "Successfully created file: {} ({} characters)",
            relative,
            content.chars().count()
        )))
    }

    async fn read_file(&self, call: &ToolCall) -> Result<ToolOutput, ExecutorError> {
        let relative = required_str(call, "file_path")?;
        let path = self.sandbox.resolve(&relative)?;

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExecutorError::NotFound(relative.clone())
            } else {
                ExecutorError::io("read", &relative, e)
            }
        })?;

        Ok(ToolOutput::Text(format!(
            "File contents of {}:\n\n{}",
            relative, content
        )))
    }

    async fn update_file(&self, call: &ToolCall) -> Result<ToolOutput, ExecutorError> {
        let relative = required_str(call, "file_path")?;
        let content = required_str(call, "content")?;
        let path = self.sandbox.resolve(&relative)?;

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Err(ExecutorError::UpdateMissing(relative)),
        }

        tokio::fs::write(&path, &content)
            .await
            .map_err(|e| ExecutorError::io("update", &relative, e))?;

        Ok(ToolOutput::Text(format!(
            "Successfully updated file: {} ({} characters)",
            relative,
            content.chars().count()
        )))
    }

    async fn list_files(&self, call: &ToolCall) -> Result<ToolOutput, ExecutorError> {
        let directory = call
            .get_string("directory")
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LIST_DIR.to_string());
        let path = self.sandbox.resolve_dir(&directory)?;

        let mut entries = match tokio::fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ToolOutput::Text(format!(
                    "Directory does not exist: {}",
                    directory
                )));
            }
            Err(e) => return Err(ExecutorError::io("list", &directory, e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ExecutorError::io("list", &directory, e))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }

            let full = entry.path();
            let shown = full
                .strip_prefix(self.sandbox.root())
                .unwrap_or(&full)
                .to_string_lossy()
                .replace('\\', "/");
            files.push(shown);
        }

        if files.is_empty() {
            return Ok(ToolOutput::Text(format!("No files found in {}", directory)));
        }

        files.sort();
        let listing = files
            .iter()
            .map(|f| format!("  - {}", f))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(ToolOutput::Text(format!("Files in {}:\n{}", directory, listing)))
    }
}

/// Fetch a required string argument
fn required_str(call: &ToolCall, key: &str) -> Result<String, ExecutorError> {
    call.get_string(key)
        .ok_or_else(|| ExecutorError::MissingArgument {
            tool: call.name.clone(),
            argument: key.to_string(),
        })
}
