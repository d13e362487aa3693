//! Completion payload produced by the `return_result` tool
//!
//! The payload travels two ways: as a typed value returned by the
//! executor, and as sentinel-prefixed text stored in the generation
//! history so transcripts stay self-describing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Literal prefix marking a tool result as a completion payload
pub const COMPLETION_SENTINEL: &str = "DECK_GENERATION_COMPLETE:";

/// Errors reading a completion payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("completion sentinel not found")]
    MissingSentinel,

    #[error("malformed completion payload: {0}")]
    Malformed(String),
}

/// One slide in creation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideEntry {
    /// 1-based position in the deck
    pub index: usize,
    /// Workspace-relative path of the slide source
    pub file: String,
}

/// Result of a finished generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionPayload {
    pub success: bool,
    pub title: String,
    pub message: String,
    pub slides: Vec<SlideEntry>,
}

impl CompletionPayload {
    /// Build a payload from `return_result` arguments
    pub fn from_arguments(args: &serde_json::Value) -> Result<Self, CompletionError> {
        let success = args
            .get("success")
            .and_then(|v| v.as_bool())
            .ok_or_else(|| CompletionError::Malformed("'success' must be a boolean".into()))?;

        let files = args
            .get("slide_files")
            .and_then(|v| v.as_array())
            .ok_or_else(|| CompletionError::Malformed("'slide_files' must be an array".into()))?;

        let mut slides = Vec::with_capacity(files.len());
        for (i, file) in files.iter().enumerate() {
            let file = file.as_str().ok_or_else(|| {
                CompletionError::Malformed(format!("slide_files[{}] is not a string", i))
            })?;
            slides.push(SlideEntry {
                index: i + 1,
                file: file.to_string(),
            });
        }

        if let Some(declared) = args.get("slide_count").and_then(|v| v.as_u64()) {
            if declared as usize != slides.len() {
                tracing::warn!(
                    declared,
                    listed = slides.len(),
                    "slide_count disagrees with slide_files, using the list"
                );
            }
        }

        let text = |key: &str| {
            args.get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .trim()
                .to_string()
        };

        Ok(Self {
            success,
            title: text("title"),
            message: text("message"),
            slides,
        })
    }

    /// Number of slides listed
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slide files in deck order
    pub fn slide_files(&self) -> impl Iterator<Item = &str> {
        self.slides.iter().map(|s| s.file.as_str())
    }

    /// Serialize behind the sentinel
    pub fn to_sentinel(&self) -> Result<String, CompletionError> {
        let body = serde_json::to_string(self)
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;
        Ok(format!("{} {}", COMPLETION_SENTINEL, body))
    }

    /// Parse sentinel-prefixed text back into a payload
    pub fn parse_sentinel(text: &str) -> Result<Self, CompletionError> {
        let body = text
            .trim_start()
            .strip_prefix(COMPLETION_SENTINEL)
            .ok_or(CompletionError::MissingSentinel)?;

        serde_json::from_str(body.trim()).map_err(|e| CompletionError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> CompletionPayload {
        CompletionPayload::from_arguments(&json!({
            "success": true,
            "title": "Q4 Roadmap",
            "message": "Three slides",
            "slide_count": 3,
            "slide_files": ["slides/slide_1.html", "slides/slide_2.html", "slides/slide_3.html"]
        }))
        .unwrap()
    }

    #[test]
    fn test_from_arguments_orders_slides() {
        let payload = sample();
        assert_eq!(payload.slide_count(), 3);
        assert_eq!(payload.slides[0].index, 1);
        assert_eq!(payload.slides[2].file, "slides/slide_3.html");
        assert_eq!(payload.title, "Q4 Roadmap");
    }

    #[test]
    fn test_sentinel_round_trip() {
        let payload = sample();
        let text = payload.to_sentinel().unwrap();
        assert!(text.starts_with(COMPLETION_SENTINEL));
        assert_eq!(CompletionPayload::parse_sentinel(&text).unwrap(), payload);
    }

    #[test]
    fn test_missing_sentinel() {
        assert_eq!(
            CompletionPayload::parse_sentinel("Successfully created file: slides/slide_1.html"),
            Err(CompletionError::MissingSentinel)
        );
    }

    #[test]
    fn test_truncated_body_is_malformed() {
        let text = sample().to_sentinel().unwrap();
        let truncated = &text[..text.len() - 10];
        assert!(matches!(
            CompletionPayload::parse_sentinel(truncated),
            Err(CompletionError::Malformed(_))
        ));
    }

    #[test]
    fn test_bad_arguments() {
        assert!(CompletionPayload::from_arguments(&json!({"slide_files": []})).is_err());
        assert!(CompletionPayload::from_arguments(&json!({
            "success": true,
            "slide_files": ["a.html", 7]
        }))
        .is_err());
    }
}
