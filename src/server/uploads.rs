//! Uploaded image handling

use std::path::{Path, PathBuf};

use base64::Engine;

use super::dto::ImageUpload;
use crate::agent::attachments::SUPPORTED_EXTENSIONS;

/// Whether the file name carries an accepted image extension
pub fn allowed_file(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// File name safe to join onto a directory
pub fn secure_filename(filename: &str) -> String {
    let base = filename.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    let trimmed = cleaned.trim_start_matches(|c: char| c == '.' || c == '_');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

fn decode(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    // data:image/png;base64,<payload>
    let payload = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    base64::engine::general_purpose::STANDARD.decode(payload.trim())
}

/// Write accepted uploads into `dir` and return their paths with a warning per rejected file
pub async fn save_uploads(
    dir: &Path,
    session_id: &str,
    uploads: &[ImageUpload],
    max_bytes: usize,
) -> (Vec<PathBuf>, Vec<String>) {
    let mut saved = Vec::new();
    let mut warnings = Vec::new();

    if uploads.is_empty() {
        return (saved, warnings);
    }

    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        warnings.push(format!("Could not store uploads: {}", e));
        return (saved, warnings);
    }

    for upload in uploads {
        if !allowed_file(&upload.filename) {
            warnings.push(format!("Skipped {}: unsupported file type", upload.filename));
            continue;
        }

        let bytes = match decode(&upload.data) {
            Ok(bytes) => bytes,
            Err(e) => {
                warnings.push(format!("Skipped {}: invalid base64 ({})", upload.filename, e));
                continue;
            }
        };

        if bytes.len() > max_bytes {
            warnings.push(format!(
                "Skipped {}: {} bytes exceeds the {} byte limit",
                upload.filename,
                bytes.len(),
                max_bytes
            ));
            continue;
        }

        let path = dir.join(format!("{}_{}", session_id, secure_filename(&upload.filename)));
        match tokio::fs::write(&path, &bytes).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), bytes = bytes.len(), "Saved upload");
                saved.push(path);
            }
            Err(e) => warnings.push(format!("Skipped {}: {}", upload.filename, e)),
        }
    }

    (saved, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn upload(filename: &str, bytes: &[u8]) -> ImageUpload {
        ImageUpload {
            filename: filename.to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("logo.PNG"));
        assert!(allowed_file("photo.jpeg"));
        assert!(!allowed_file("notes.pdf"));
        assert!(!allowed_file("no_extension"));
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename("my brand logo.png"), "my_brand_logo.png");
        assert_eq!(secure_filename("..hidden.png"), "hidden.png");
        assert_eq!(secure_filename("C:\\Users\\me\\chart.gif"), "chart.gif");
        assert_eq!(secure_filename("///"), "upload");
    }

    #[test]
    fn test_decode_data_url() {
        let encoded = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(b"png")
        );
        assert_eq!(decode(&encoded).unwrap(), b"png");
    }

    #[tokio::test]
    async fn test_save_uploads_filters() {
        let dir = TempDir::new().unwrap();
        let uploads = vec![
            upload("logo.png", b"fake png"),
            upload("report.pdf", b"fake pdf"),
            upload("huge.jpg", &[0u8; 64]),
            ImageUpload {
                filename: "broken.gif".to_string(),
                data: "***".to_string(),
            },
        ];

        let (saved, warnings) = save_uploads(dir.path(), "abc", &uploads, 32).await;

        assert_eq!(saved, vec![dir.path().join("abc_logo.png")]);
        assert_eq!(warnings.len(), 3);
        assert_eq!(std::fs::read(&saved[0]).unwrap(), b"fake png");
    }
}
