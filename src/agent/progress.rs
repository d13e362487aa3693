//! Progress notifications
//!
//! Agents report what they are doing through a [`ProgressListener`].
//! Delivery is fire-and-forget: a listener must not block and its
//! failures never reach the agent loop.

use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::core::AgentRole;

/// Something worth telling the user while a turn runs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    TurnStarted,
    Iteration {
        agent: AgentRole,
        iteration: usize,
        max: usize,
    },
    ToolCalled {
        agent: AgentRole,
        tool: String,
    },
    ToolFinished {
        agent: AgentRole,
        tool: String,
        is_error: bool,
        preview: String,
    },
    GenerationStarted {
        topic: String,
    },
    GenerationFinished {
        success: bool,
        slide_count: usize,
    },
    ScreenshotCaptured {
        index: usize,
        path: PathBuf,
    },
    SlideAdded {
        index: usize,
    },
    ExportFinished {
        path: PathBuf,
    },
    /// Something was skipped but the turn went on
    Warning {
        message: String,
    },
    Reply {
        text: String,
    },
    Error {
        message: String,
    },
    /// Last event of a turn, sent after any export has finished
    Done,
}

impl ProgressEvent {
    /// Whether this event ends the stream
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Receives progress events
pub trait ProgressListener: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl ProgressListener for NoopListener {
    fn on_event(&self, _event: ProgressEvent) {}
}

/// Forwards events into an unbounded channel, for another task to drain
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelListener {
    /// Create a listener and the receiving end of its queue
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressListener for ChannelListener {
    fn on_event(&self, event: ProgressEvent) {
        // Receiver gone means nobody is watching any more
        let _ = self.tx.send(event);
    }
}
