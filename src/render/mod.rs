//! Rendering and export
//!
//! Turns a finished generation run into files the user can open:
//! one screenshot per slide, packaged as a PPTX.

pub mod capture;
pub mod pptx;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::agent::progress::{ProgressEvent, ProgressListener};
use crate::core::{DeckError, Result};
use crate::tools::{CompletionPayload, Sandbox};
use crate::workspace::Workspace;

pub use capture::SlideCapture;
pub use pptx::{sanitize_title, write_deck};

/// Files produced by one export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportArtifact {
    pub pptx_path: PathBuf,
    pub screenshots: Vec<PathBuf>,
    pub created_at: DateTime<Utc>,
}

impl ExportArtifact {
    /// File name of the deck
    pub fn file_name(&self) -> String {
        self.pptx_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Turns a completion payload into an exported deck
#[async_trait]
pub trait DeckRenderer: Send + Sync {
    async fn render(
        &self,
        payload: &CompletionPayload,
        listener: &dyn ProgressListener,
    ) -> Result<ExportArtifact>;
}

/// Screenshots slides with agent-browser and packages them with `zip`
pub struct BrowserRenderer {
    workspace: Workspace,
    capture: SlideCapture,
}

impl BrowserRenderer {
    pub fn new(workspace: Workspace, capture: SlideCapture) -> Self {
        Self { workspace, capture }
    }
}

#[async_trait]
impl DeckRenderer for BrowserRenderer {
    async fn render(
        &self,
        payload: &CompletionPayload,
        listener: &dyn ProgressListener,
    ) -> Result<ExportArtifact> {
        let sandbox = Sandbox::new(self.workspace.root());
        let total = payload.slide_count();
        let mut screenshots = Vec::with_capacity(total);

        tracing::info!(slides = total, session = %self.capture.session_name(), "Capturing slides");

        for entry in &payload.slides {
            let slide = match sandbox.resolve(&entry.file) {
                Ok(path) if path.is_file() => path,
                Ok(_) => {
                    tracing::warn!(file = %entry.file, "Slide not found, skipping");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(file = %entry.file, error = %e, "Slide path rejected, skipping");
                    continue;
                }
            };

            let target = self.workspace.screenshot_path(entry.index);
            match self.capture.capture(&slide, &target).await {
                Ok(()) => {
                    tracing::debug!(index = entry.index, path = %target.display(), "Captured slide");
                    listener.on_event(ProgressEvent::ScreenshotCaptured {
                        index: entry.index,
                        path: target.clone(),
                    });
                    screenshots.push(target);
                }
                Err(DeckError::AgentBrowserNotFound) => return Err(DeckError::AgentBrowserNotFound),
                Err(e) => {
                    tracing::warn!(file = %entry.file, error = %e, "Capture failed, skipping");
                }
            }
        }

        if let Err(e) = self.capture.close().await {
            tracing::debug!(error = %e, "Browser close failed");
        }

        if screenshots.is_empty() {
            return Err(DeckError::export("No screenshots captured"));
        }

        let pptx_path = self.workspace.export_path(&payload.title);
        let title = payload.title.clone();
        let shots = screenshots.clone();
        let output = pptx_path.clone();

        tokio::task::spawn_blocking(move || write_deck(&shots, &output, &title))
            .await
            .map_err(|e| DeckError::export(format!("Export task failed: {}", e)))??;

        for index in 1..=screenshots.len() {
            listener.on_event(ProgressEvent::SlideAdded { index });
        }

        tracing::info!(path = %pptx_path.display(), slides = screenshots.len(), "Exported deck");
        listener.on_event(ProgressEvent::ExportFinished {
            path: pptx_path.clone(),
        });

        Ok(ExportArtifact {
            pptx_path,
            screenshots,
            created_at: Utc::now(),
        })
    }
}
