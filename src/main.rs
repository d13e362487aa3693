//! Deckwright - conversational slide deck builder
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;

use clap::Parser;
use deckwright::cli::repl::print_reply;
use deckwright::llm::create_provider;
use deckwright::session::SessionFactory;
use deckwright::{Config, Repl};
use tracing_subscriber::{fmt, EnvFilter};

/// Deckwright - talk through an idea, get a slide deck
#[derive(Parser, Debug)]
#[command(name = "deckwright")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run the HTTP server instead of the REPL
    #[arg(long, short = 's')]
    serve: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,

    /// Image to attach to the prompt (repeatable)
    #[arg(long = "image", short = 'i')]
    images: Vec<PathBuf>,

    /// Model that talks with the user
    #[arg(long)]
    chat_model: Option<String>,

    /// Model that writes the slides
    #[arg(long)]
    generation_model: Option<String>,

    /// Root directory for slides, screenshots and exports
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// HTTP port for --serve
    #[arg(long)]
    port: Option<u16>,

    /// Run in headed browser mode (visible window)
    #[arg(long)]
    headed: bool,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(ref model) = args.chat_model {
        config.models.chat = model.clone();
    }

    if let Some(ref model) = args.generation_model {
        config.models.generation = model.clone();
    }

    if let Some(ref root) = args.workspace {
        config.workspace.root = root.clone();
    }

    if let Some(port) = args.port {
        config.server.port = port;
    }

    if args.debug {
        config.agent.debug = true;
    }

    if args.headed {
        config.browser.headed = true;
    }

    init_tracing(config.agent.debug);

    if args.serve {
        let llm = create_provider(&config)?;
        let factory = SessionFactory::new(config, llm);
        deckwright::server::serve(factory).await?;
        return Ok(());
    }

    let mut repl = Repl::with_config(config).await?;

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let reply = repl.run_once(&prompt, &args.images).await?;
        print_reply(&reply);
        return Ok(());
    }

    // Interactive REPL mode
    repl.run().await?;

    Ok(())
}
