//! Conversation history management
//!
//! Turns are only ever appended. The one exception is a failed turn,
//! which is rolled back to the snapshot taken before it started.

use crate::core::{Message, Role};

/// Ordered turn history of one agent
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All turns, oldest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of turns typed by the user (tool-result turns excluded)
    pub fn user_turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User && !m.is_tool_results())
            .count()
    }

    /// Marker for [`Conversation::rollback`]
    pub fn snapshot(&self) -> usize {
        self.messages.len()
    }

    /// Drop every turn added after `snapshot`
    pub fn rollback(&mut self, snapshot: usize) {
        self.messages.truncate(snapshot);
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Get message count
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
