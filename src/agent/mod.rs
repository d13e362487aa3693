//! Agent module - orchestration and conversation management
//!
//! Contains the conversational agent, the nested generation agent and the
//! pieces they share: history, loop state, attachments and progress.

pub mod attachments;
pub mod conversation;
pub mod generation;
pub mod loop_state;
pub mod orchestrator;
pub mod progress;
pub mod prompts;

pub use attachments::{build_user_message, Attachment, AttachmentError};
pub use conversation::Conversation;
pub use generation::{FailureKind, GenerationAgent, GenerationAgentBuilder, GenerationFailure, Requirements};
pub use loop_state::{AgentLoopState, Observation};
pub use orchestrator::{AssistantReply, ConversationAgent};
pub use progress::{ChannelListener, NoopListener, ProgressEvent, ProgressListener};
