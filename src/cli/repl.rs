//! Interactive REPL for Deckwright
//!
//! Provides the main user interaction loop.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::agent::{AssistantReply, ConversationAgent};
use crate::cli::commands::{extract_images, handle_command, CommandResult};
use crate::cli::console::ConsoleListener;
use crate::core::{Config, Result};
use crate::llm::create_provider;
use crate::render::{BrowserRenderer, SlideCapture};
use crate::workspace::Workspace;

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    agent: ConversationAgent,
    workspace: Workspace,
}

impl Repl {
    /// Create a REPL with custom configuration
    pub async fn with_config(config: Config) -> Result<Self> {
        let llm = create_provider(&config)?;
        let workspace = Workspace::from_config(&config.workspace);
        workspace.ensure().await?;

        let renderer = Arc::new(BrowserRenderer::new(
            workspace.clone(),
            SlideCapture::new(&config.browser),
        ));
        let agent = ConversationAgent::new(config, llm, renderer, &workspace);

        Ok(Self { agent, workspace })
    }

    /// Run a single prompt and return the reply
    pub async fn run_once(&mut self, prompt: &str, images: &[PathBuf]) -> Result<AssistantReply> {
        let listener = ConsoleListener::new(self.agent.config().agent.debug);
        self.agent.handle_turn(prompt, images, &listener).await
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        if !SlideCapture::is_available().await {
            println!("agent-browser not found. Decks can be written but not exported to PPTX.");
            println!("   To enable: npm install -g agent-browser && agent-browser install\n");
        }

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("You: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();

            if input.is_empty() {
                continue;
            }

            match handle_command(input, &mut self.agent) {
                CommandResult::Exit => {
                    println!("\nGoodbye!");
                    break;
                }
                CommandResult::Clear => {
                    println!("Conversation cleared.\n");
                    continue;
                }
                CommandResult::Handled(output) => {
                    println!("{}\n", output);
                    continue;
                }
                CommandResult::Continue(input) => {
                    let (text, images) = extract_images(&input);
                    for image in &images {
                        println!("Attaching {}", image.display());
                    }

                    match self.run_once(&text, &images).await {
                        Ok(reply) => print_reply(&reply),
                        Err(e) => eprintln!("\nError: {}\n", e),
                    }
                }
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = self.agent.config();

        println!(
            r#"
╔═══════════════════════════════════════════════════════════╗
║                                                           ║
║   Deckwright                                              ║
║   Talk through your idea, get a slide deck                ║
║                                                           ║
╚═══════════════════════════════════════════════════════════╝
"#
        );
        println!("Provider:   {}", self.agent.provider_name());
        println!("Workspace:  {}", self.workspace.root().display());
        println!("Models:");
        println!("  Chat:       {}", config.models.chat);
        println!("  Generation: {}", config.models.generation);
        println!();
        println!("Commands: help, reset, status, exit");
        println!("─────────────────────────────────────────────────────────────");
    }
}

/// Print a reply with its warnings and export location
pub fn print_reply(reply: &AssistantReply) {
    for warning in &reply.warnings {
        println!("Warning: {}", warning);
    }
    println!("\nAssistant:\n{}\n", reply.text);
    if let Some(artifact) = &reply.artifact {
        println!("Deck: {}\n", artifact.pptx_path.display());
    }
}
