//! Slide capture - wraps agent-browser CLI
//!
//! Opens each slide as a `file://` page at the configured viewport and
//! saves a PNG of exactly that viewport.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use url::Url;

use crate::core::config::BrowserConfig;
use crate::core::{DeckError, Result};

/// Screenshots slides through the agent-browser CLI
#[derive(Debug, Clone)]
pub struct SlideCapture {
    /// Session name for isolation
    session_name: String,
    /// Whether to run in headed mode
    headed: bool,
    width: u32,
    height: u32,
    settle: Duration,
}

impl SlideCapture {
    /// Create a capture with settings from configuration
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            session_name: config.session_name.clone(),
            headed: config.headed,
            width: config.viewport_width,
            height: config.viewport_height,
            settle: Duration::from_millis(config.settle_ms),
        }
    }

    /// Use a different browser session
    pub fn with_session(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = session_name.into();
        self
    }

    /// Session name
    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    /// Check if agent-browser is installed
    pub async fn is_available() -> bool {
        Command::new("agent-browser")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Run an agent-browser command
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("agent-browser");
        cmd.args(["--session", &self.session_name]);

        if self.headed {
            cmd.arg("--headed");
        }

        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::trace!(session = %self.session_name, ?args, "agent-browser");

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DeckError::AgentBrowserNotFound
            } else {
                DeckError::browser(format!("Failed to run agent-browser: {}", e))
            }
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(DeckError::browser(format!(
                "agent-browser {} failed: {}",
                args.first().copied().unwrap_or_default(),
                stderr.trim()
            )))
        }
    }

    /// Capture one slide into `output`
    pub async fn capture(&self, slide: &Path, output: &Path) -> Result<()> {
        let absolute = tokio::fs::canonicalize(slide).await?;
        let url = file_url(&absolute)?;

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let width = self.width.to_string();
        let height = self.height.to_string();
        self.run_command(&["set", "viewport", &width, &height]).await?;
        self.run_command(&["open", url.as_str()]).await?;

        // CDN stylesheets may never go fully idle
        if let Err(e) = self.run_command(&["wait", "--load", "networkidle"]).await {
            tracing::debug!(error = %e, "Network did not settle, capturing anyway");
        }
        tokio::time::sleep(self.settle).await;

        let target = output.to_string_lossy();
        self.run_command(&["screenshot", target.as_ref()]).await?;

        Ok(())
    }

    /// Close the browser
    pub async fn close(&self) -> Result<()> {
        self.run_command(&["close"]).await.map(|_| ())
    }
}

/// `file://` URL for an absolute path
pub fn file_url(path: &Path) -> Result<Url> {
    Url::from_file_path(path)
        .map_err(|_| DeckError::browser(format!("Not an absolute path: {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_creation() {
        let config = BrowserConfig::default();
        let capture = SlideCapture::new(&config).with_session("session-a");
        assert_eq!(capture.session_name(), "session-a");
        assert_eq!(capture.width, 1920);
        assert_eq!(capture.height, 1080);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_url() {
        let url = file_url(Path::new("/tmp/deck/slides/slide 1.html")).unwrap();
        assert_eq!(url.as_str(), "file:///tmp/deck/slides/slide%201.html");
        assert!(file_url(Path::new("slides/slide_1.html")).is_err());
    }
}
