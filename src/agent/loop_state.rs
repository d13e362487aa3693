//! Agent loop state management
//!
//! Tracks the iteration budget of one agent loop and the observations
//! produced by its tool executions.

use serde::{Deserialize, Serialize};

/// State of one bounded agent loop
#[derive(Debug, Clone)]
pub struct AgentLoopState {
    /// Iterations used so far
    pub iteration: usize,
    /// Maximum allowed iterations
    pub max_iterations: usize,
    /// Observations collected from tool executions
    pub observations: Vec<Observation>,
}

impl AgentLoopState {
    /// Create a new loop state with the given cap
    pub fn new(max_iterations: usize) -> Self {
        Self {
            iteration: 0,
            max_iterations,
            observations: Vec::new(),
        }
    }

    /// Whether another iteration is allowed
    pub fn should_continue(&self) -> bool {
        self.iteration < self.max_iterations
    }

    /// Start the next iteration and return its 1-based number
    pub fn next_iteration(&mut self) -> usize {
        self.iteration += 1;
        self.iteration
    }

    /// Record one tool execution
    pub fn observe(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    /// Number of tool calls executed
    pub fn tool_calls(&self) -> usize {
        self.observations.len()
    }

    /// Number of failed tool calls
    pub fn failures(&self) -> usize {
        self.observations.iter().filter(|o| !o.success).count()
    }
}

/// An observation from a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Name of the tool that produced this observation
    pub tool_name: String,
    /// Whether the tool execution was successful
    pub success: bool,
    /// Text fed back to the model
    pub output: String,
}

impl Observation {
    /// Create a successful observation
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: output.into(),
        }
    }

    /// Create an error observation
    pub fn error(tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: error.into(),
        }
    }

    /// First line of the output, shortened for progress display
    pub fn preview(&self, max_chars: usize) -> String {
        let first = self.output.lines().next().unwrap_or_default();
        if first.chars().count() <= max_chars {
            first.to_string()
        } else {
            let cut: String = first.chars().take(max_chars).collect();
            format!("{}...", cut)
        }
    }
}
