//! Path sandbox for model-supplied file names
//!
//! Every path the generation agent hands to a file tool is resolved
//! against the workspace root. Anything that would land outside it is
//! rejected before touching the filesystem.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Why a path was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SandboxError {
    #[error("Path is empty")]
    Empty,

    #[error("Absolute paths are not allowed: {0}")]
    Absolute(String),

    #[error("Path escapes the working directory: {0}")]
    Traversal(String),
}

/// Working directory that file tools are confined to
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Create a sandbox rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path inside the sandbox
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, SandboxError> {
        self.resolve_inner(relative, false)
    }

    /// Resolve a directory path; `.` and `./` name the root itself
    pub fn resolve_dir(&self, relative: &str) -> Result<PathBuf, SandboxError> {
        self.resolve_inner(relative, true)
    }

    fn resolve_inner(&self, relative: &str, allow_root: bool) -> Result<PathBuf, SandboxError> {
        let trimmed = relative.trim();
        if trimmed.is_empty() {
            return Err(SandboxError::Empty);
        }

        let requested = Path::new(trimmed);
        let mut clean = PathBuf::new();

        for component in requested.components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(SandboxError::Traversal(trimmed.to_string()));
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(SandboxError::Absolute(trimmed.to_string()));
                }
            }
        }

        if clean.as_os_str().is_empty() {
            if allow_root {
                return Ok(self.root.clone());
            }
            return Err(SandboxError::Empty);
        }

        let candidate = self.root.join(&clean);
        self.check_links(&candidate, trimmed)?;

        Ok(candidate)
    }

    /// Reject paths whose existing part resolves outside the root through a symlink
    fn check_links(&self, candidate: &Path, requested: &str) -> Result<(), SandboxError> {
        let Ok(root) = self.root.canonicalize() else {
            // Nothing exists yet, so nothing can link out
            return Ok(());
        };

        let existing = candidate
            .ancestors()
            .find(|p| p.symlink_metadata().is_ok());

        if let Some(existing) = existing {
            match existing.canonicalize() {
                Ok(resolved) if resolved.starts_with(&root) => {}
                Ok(_) => return Err(SandboxError::Traversal(requested.to_string())),
                // Dangling link
                Err(_) => return Err(SandboxError::Traversal(requested.to_string())),
            }
        }

        Ok(())
    }
}
