//! Deckwright - conversational slide deck builder
//!
//! A chat agent gathers what a presentation should contain, then hands the
//! requirements to a generation agent that writes one HTML file per slide
//! inside a sandboxed workspace. Finished slides are screenshotted with
//! agent-browser and packaged as a PPTX.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Provider abstraction with an Anthropic Messages implementation
//! - **Tools**: Tool registry, sandboxed file tools and the completion payload
//! - **Agent**: Conversational and generation loops, attachments, progress
//! - **Render**: Slide capture and PPTX export
//! - **Session / Server**: Per-user sessions behind an axum HTTP API
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use deckwright::agent::{ConversationAgent, NoopListener};
//! use deckwright::llm::create_provider;
//! use deckwright::render::{BrowserRenderer, SlideCapture};
//! use deckwright::workspace::Workspace;
//! use deckwright::Config;
//!
//! #[tokio::main]
//! async fn main() -> deckwright::Result<()> {
//!     let config = Config::load();
//!     let workspace = Workspace::from_config(&config.workspace);
//!     workspace.ensure().await?;
//!
//!     let renderer = Arc::new(BrowserRenderer::new(
//!         workspace.clone(),
//!         SlideCapture::new(&config.browser),
//!     ));
//!     let llm = create_provider(&config)?;
//!     let mut agent = ConversationAgent::new(config, llm, renderer, &workspace);
//!
//!     let reply = agent
//!         .handle_turn("A deck about Rust adoption", &[], &NoopListener)
//!         .await?;
//!     println!("{}", reply.text);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod render;
pub mod server;
pub mod session;
pub mod tools;
pub mod workspace;

// Re-export commonly used items
pub use agent::{AssistantReply, ConversationAgent, GenerationAgent};
pub use cli::Repl;
pub use core::{Config, DeckError, Result};
pub use session::{InMemorySessionStore, Session, SessionFactory, SessionStore};
pub use workspace::Workspace;
