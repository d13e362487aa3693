//! Artifact workspace layout
//!
//! ```text
//! <root>/
//!   slides/       slide_1.html, slide_2.html, base-styles.css
//!   screenshots/  slide_1.png, slide_2.png
//!   exports/      <Title>.pptx
//!   uploads/      attachments received over HTTP
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::core::config::WorkspaceConfig;
use crate::core::Result;
use crate::render::sanitize_title;

const START_MARKER: &str = ".started";

/// Directory tree one agent writes into
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    slides: String,
    screenshots: String,
    exports: String,
    uploads: String,
}

impl Workspace {
    /// Workspace with the default subdirectory names
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_config(&WorkspaceConfig {
            root: root.into(),
            ..WorkspaceConfig::default()
        })
    }

    /// Workspace described by configuration
    pub fn from_config(config: &WorkspaceConfig) -> Self {
        Self {
            root: config.root.clone(),
            slides: config.slides_dir.clone(),
            screenshots: config.screenshots_dir.clone(),
            exports: config.exports_dir.clone(),
            uploads: config.uploads_dir.clone(),
        }
    }

    /// Child workspace for one session, same layout
    pub fn for_session(&self, session_id: &str) -> Self {
        Self {
            root: self.root.join("sessions").join(session_id),
            ..self.clone()
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn slides_dir(&self) -> PathBuf {
        self.root.join(&self.slides)
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.root.join(&self.screenshots)
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.root.join(&self.exports)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join(&self.uploads)
    }

    /// Slide source for 1-based slide `n`
    pub fn slide_path(&self, n: usize) -> PathBuf {
        self.slides_dir().join(format!("slide_{}.html", n))
    }

    /// Screenshot for 1-based slide `n`
    pub fn screenshot_path(&self, n: usize) -> PathBuf {
        self.screenshots_dir().join(format!("slide_{}.png", n))
    }

    /// Packaged deck for a presentation title
    pub fn export_path(&self, title: &str) -> PathBuf {
        self.exports_dir()
            .join(format!("{}.pptx", sanitize_title(title)))
    }

    /// Create every directory of the layout
    pub async fn ensure(&self) -> Result<()> {
        for dir in [
            self.slides_dir(),
            self.screenshots_dir(),
            self.exports_dir(),
            self.uploads_dir(),
        ] {
            tokio::fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }

    /// Stamp the workspace and return the stamp's modification time
    ///
    /// Exports are compared by mtime, so the start of a session is taken
    /// from the same filesystem clock rather than from `Utc::now()`.
    pub async fn mark_started(&self) -> Result<DateTime<Utc>> {
        let marker = self.root.join(START_MARKER);
        tokio::fs::write(&marker, b"").await?;
        let modified = tokio::fs::metadata(&marker).await?.modified()?;
        Ok(modified.into())
    }

    /// Newest `.pptx` in the exports directory modified at or after `since`
    pub async fn latest_export_since(&self, since: DateTime<Utc>) -> Option<PathBuf> {
        let mut entries = tokio::fs::read_dir(self.exports_dir()).await.ok()?;
        let mut newest: Option<(DateTime<Utc>, PathBuf)> = None;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("pptx") {
                continue;
            }
            let Ok(modified) = entry.metadata().await.and_then(|m| m.modified()) else {
                continue;
            };
            let modified: DateTime<Utc> = modified.into();
            if modified < since {
                continue;
            }
            if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
                newest = Some((modified, path));
            }
        }

        newest.map(|(_, path)| path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let ws = Workspace::new("/tmp/deck");
        assert_eq!(ws.slide_path(3), PathBuf::from("/tmp/deck/slides/slide_3.html"));
        assert_eq!(
            ws.screenshot_path(3),
            PathBuf::from("/tmp/deck/screenshots/slide_3.png")
        );
        assert_eq!(
            ws.export_path("Q4 Product Roadmap"),
            PathBuf::from("/tmp/deck/exports/Q4_Product_Roadmap.pptx")
        );
    }

    #[test]
    fn test_session_workspace_nests() {
        let ws = Workspace::new("/srv/decks").for_session("abc");
        assert_eq!(ws.root(), Path::new("/srv/decks/sessions/abc"));
        assert_eq!(ws.exports_dir(), PathBuf::from("/srv/decks/sessions/abc/exports"));
    }

    #[tokio::test]
    async fn test_export_right_after_start_is_found() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        ws.ensure().await.unwrap();

        let started = ws.mark_started().await.unwrap();
        std::fs::write(ws.exports_dir().join("Quick.pptx"), b"PK").unwrap();

        assert_eq!(
            ws.latest_export_since(started).await,
            Some(ws.exports_dir().join("Quick.pptx"))
        );
    }

    #[tokio::test]
    async fn test_latest_export_since_filters_old_files() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        ws.ensure().await.unwrap();

        std::fs::write(ws.exports_dir().join("old.pptx"), b"x").unwrap();
        std::fs::write(ws.exports_dir().join("notes.txt"), b"x").unwrap();

        let future = Utc::now() + chrono::Duration::hours(1);
        assert!(ws.latest_export_since(future).await.is_none());

        let past = Utc::now() - chrono::Duration::hours(1);
        assert_eq!(
            ws.latest_export_since(past).await,
            Some(ws.exports_dir().join("old.pptx"))
        );
    }
}
