//! Progress lines for the terminal

use crate::agent::progress::{ProgressEvent, ProgressListener};

/// Prints progress events to stdout
pub struct ConsoleListener {
    verbose: bool,
}

impl ConsoleListener {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Line to print for an event, if any
    pub fn render(&self, event: &ProgressEvent) -> Option<String> {
        match event {
            ProgressEvent::Iteration {
                agent,
                iteration,
                max,
            } if self.verbose => Some(format!("  [{}] iteration {}/{}", agent, iteration, max)),
            ProgressEvent::ToolCalled { agent, tool } => {
                Some(format!("  [{}] -> {}", agent, tool))
            }
            ProgressEvent::ToolFinished {
                tool,
                is_error: true,
                preview,
                ..
            } => Some(format!("  ! {} failed: {}", tool, preview)),
            ProgressEvent::ToolFinished { tool, preview, .. } if self.verbose => {
                Some(format!("  <- {}: {}", tool, preview))
            }
            ProgressEvent::GenerationStarted { topic } => {
                Some(format!("Generating slides for \"{}\"...", topic))
            }
            ProgressEvent::GenerationFinished {
                success,
                slide_count,
            } => Some(if *success {
                format!("Generated {} slides", slide_count)
            } else {
                "Slide generation failed".to_string()
            }),
            ProgressEvent::ScreenshotCaptured { index, .. } => {
                Some(format!("  Captured slide {}", index))
            }
            ProgressEvent::ExportFinished { path } => {
                Some(format!("Saved deck to {}", path.display()))
            }
            _ => None,
        }
    }
}

impl ProgressListener for ConsoleListener {
    fn on_event(&self, event: ProgressEvent) {
        if let Some(line) = self.render(&event) {
            println!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AgentRole;

    #[test]
    fn test_iterations_only_when_verbose() {
        let event = ProgressEvent::Iteration {
            agent: AgentRole::Generation,
            iteration: 3,
            max: 30,
        };
        assert!(ConsoleListener::new(false).render(&event).is_none());
        assert_eq!(
            ConsoleListener::new(true).render(&event).as_deref(),
            Some("  [generation] iteration 3/30")
        );
    }

    #[test]
    fn test_failed_tool_always_shown() {
        let event = ProgressEvent::ToolFinished {
            agent: AgentRole::Generation,
            tool: "read_file".to_string(),
            is_error: true,
            preview: "Error: File not found".to_string(),
        };
        let line = ConsoleListener::new(false).render(&event).unwrap();
        assert!(line.contains("read_file failed"));
    }

    #[test]
    fn test_reply_not_printed() {
        let event = ProgressEvent::Reply {
            text: "hello".to_string(),
        };
        assert!(ConsoleListener::new(true).render(&event).is_none());
    }
}
