//! CLI module - command-line interface
//!
//! Contains the REPL, command parsing and console progress output.

pub mod commands;
pub mod console;
pub mod repl;

pub use console::ConsoleListener;
pub use repl::Repl;
