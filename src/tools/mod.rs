//! Tools module - Tool implementations for the agents
//!
//! Contains the per-role tool registry, the sandboxed file executor and
//! the completion payload.

pub mod completion;
pub mod executor;
pub mod registry;
pub mod sandbox;

pub use completion::{CompletionError, CompletionPayload, SlideEntry, COMPLETION_SENTINEL};
pub use executor::{ExecutorError, ToolExecutor, ToolOutput, ERROR_PREFIX};
pub use registry::{names, ToolRegistry, ToolRole};
pub use sandbox::{Sandbox, SandboxError};
