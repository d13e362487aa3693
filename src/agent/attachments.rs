//! Image attachments for the conversational agent
//!
//! Media types are inferred from the file extension. Anything outside the
//! supported set is refused rather than sent with a guessed type.

use std::path::{Path, PathBuf};

use base64::Engine;
use thiserror::Error;

use crate::core::{ContentBlock, DeckError, ImageSource, Message, Result, Role};

/// Extensions accepted for attachments
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Why one attachment was skipped
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Unsupported image format: {}", .0.display())]
    UnsupportedType(PathBuf),

    #[error("Could not read image {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Media type for a supported extension
pub fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// An image loaded and encoded for the model
#[derive(Debug, Clone)]
pub struct Attachment {
    pub path: PathBuf,
    pub media_type: &'static str,
    pub data: String,
}

impl Attachment {
    /// Read and encode an image
    pub async fn load(path: impl AsRef<Path>) -> std::result::Result<Self, AttachmentError> {
        let path = path.as_ref();
        let media_type =
            media_type_for(path).ok_or_else(|| AttachmentError::UnsupportedType(path.to_path_buf()))?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| AttachmentError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            media_type,
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        })
    }

    /// Image content block for this attachment
    pub fn to_block(&self) -> ContentBlock {
        ContentBlock::Image {
            source: ImageSource::base64(self.media_type, self.data.clone()),
        }
    }
}

/// Build a user turn from text and image paths
///
/// Images come first, then the text. Attachments that fail are skipped
/// and reported as warnings; the turn only fails when nothing is left.
pub async fn build_user_message(
    text: &str,
    paths: &[PathBuf],
) -> Result<(Message, Vec<String>)> {
    let mut blocks = Vec::with_capacity(paths.len() + 1);
    let mut warnings = Vec::new();

    for path in paths {
        match Attachment::load(path).await {
            Ok(attachment) => {
                tracing::debug!(path = %path.display(), media_type = attachment.media_type, "Attached image");
                blocks.push(attachment.to_block());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping attachment");
                warnings.push(e.to_string());
            }
        }
    }

    if !text.trim().is_empty() {
        blocks.push(ContentBlock::text(text));
    }

    if blocks.is_empty() {
        let reason = if warnings.is_empty() {
            "Message is empty".to_string()
        } else {
            format!("Nothing left to send: {}", warnings.join("; "))
        };
        return Err(DeckError::attachment(reason));
    }

    Ok((Message::with_blocks(Role::User, blocks), warnings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_types() {
        assert_eq!(media_type_for(Path::new("logo.PNG")), Some("image/png"));
        assert_eq!(media_type_for(Path::new("a/b.jpeg")), Some("image/jpeg"));
        assert_eq!(media_type_for(Path::new("shot.webp")), Some("image/webp"));
        assert_eq!(media_type_for(Path::new("logo.svg")), None);
        assert_eq!(media_type_for(Path::new("README")), None);
    }

    #[tokio::test]
    async fn test_load_encodes_base64() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let attachment = Attachment::load(&path).await.unwrap();
        assert_eq!(attachment.media_type, "image/png");
        assert_eq!(attachment.data, "iVBORw==");
    }

    #[tokio::test]
    async fn test_bad_attachment_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let svg = dir.path().join("logo.svg");
        std::fs::write(&svg, "<svg/>").unwrap();

        let (message, warnings) = build_user_message(
            "Use our brand",
            &[svg, dir.path().join("missing.png")],
        )
        .await
        .unwrap();

        assert_eq!(warnings.len(), 2);
        assert_eq!(message.content.len(), 1);
        assert_eq!(message.text(), "Use our brand");
    }

    #[tokio::test]
    async fn test_nothing_left_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_user_message("  ", &[dir.path().join("logo.bmp")])
            .await
            .unwrap_err();
        assert!(matches!(err, DeckError::Attachment(_)));
    }
}
