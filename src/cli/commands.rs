//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use std::path::PathBuf;

use crate::agent::attachments::media_type_for;
use crate::agent::ConversationAgent;

/// Result of parsing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Continue processing as normal input
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// Clear history
    Clear,
}

/// Parse and handle special commands
pub fn handle_command(input: &str, agent: &mut ConversationAgent) -> CommandResult {
    let input = input.trim();
    let (cmd, args) = match input.split_once(' ') {
        Some((cmd, args)) => (cmd.to_lowercase(), args.trim()),
        None => (input.to_lowercase(), ""),
    };

    match cmd.as_str() {
        "exit" | "quit" | "q" => CommandResult::Exit,

        "clear" | "reset" => {
            agent.reset();
            CommandResult::Clear
        }

        "help" | "?" => CommandResult::Handled(help_text()),

        "set" => handle_set_command(args, agent),

        "status" => {
            let config = agent.config();
            let status = format!(
                "Deckwright Status:\n\
                 ─────────────────────────────\n\
                 Provider:     {}\n\
                 Chat:         {}\n\
                 Generation:   {}\n\
                 Tools:        {}\n\
                 User turns:   {}\n\
                 Last deck:    {}\n\
                 Debug:        {}",
                agent.provider_name(),
                config.models.chat,
                config.models.generation,
                agent.tool_names().join(", "),
                agent.user_turns(),
                agent
                    .last_artifact()
                    .map(|a| a.pptx_path.display().to_string())
                    .unwrap_or_else(|| "none".to_string()),
                if config.agent.debug { "on" } else { "off" }
            );
            CommandResult::Handled(status)
        }

        "save" => match agent.config().save() {
            Ok(path) => CommandResult::Handled(format!("Configuration saved to {}", path.display())),
            Err(e) => CommandResult::Handled(format!("Failed to save configuration: {}", e)),
        },

        "debug" => {
            let new_state = !agent.config().agent.debug;
            agent.set_debug(new_state);
            CommandResult::Handled(format!(
                "Debug mode: {}",
                if new_state { "ON" } else { "OFF" }
            ))
        }

        _ => {
            if input.starts_with('/') {
                CommandResult::Handled(format!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    cmd
                ))
            } else {
                CommandResult::Continue(input.to_string())
            }
        }
    }
}

/// Handle 'set' subcommands
fn handle_set_command(args: &str, agent: &mut ConversationAgent) -> CommandResult {
    let (key, value) = match args.split_once(' ') {
        Some((key, value)) => (key.to_lowercase(), value.trim()),
        None => (args.to_lowercase(), ""),
    };

    if key.is_empty() {
        return CommandResult::Handled(
            "Usage: set <chat|generation|debug> <value>\n\
             Examples:\n\
               set chat claude-sonnet-4-5-20250929\n\
               set generation claude-haiku-4-5\n\
               set debug on"
                .to_string(),
        );
    }

    match key.as_str() {
        "chat" => {
            if value.is_empty() {
                return CommandResult::Handled(format!(
                    "Current chat model: {}",
                    agent.config().models.chat
                ));
            }
            agent.set_chat_model(value);
            CommandResult::Handled(format!("Chat model set to: {}", value))
        }

        "generation" | "gen" => {
            if value.is_empty() {
                return CommandResult::Handled(format!(
                    "Current generation model: {}",
                    agent.config().models.generation
                ));
            }
            agent.set_generation_model(value);
            CommandResult::Handled(format!("Generation model set to: {}", value))
        }

        "debug" => {
            let enabled = matches!(value.to_lowercase().as_str(), "on" | "true" | "1" | "yes");
            agent.set_debug(enabled);
            CommandResult::Handled(format!(
                "Debug mode: {}",
                if enabled { "ON" } else { "OFF" }
            ))
        }

        _ => CommandResult::Handled(format!(
            "Unknown setting: {}. Available: chat, generation, debug",
            key
        )),
    }
}

/// Split image references out of a message
///
/// `image:path` tokens always count; bare tokens count when they end in
/// a supported image extension.
pub fn extract_images(input: &str) -> (String, Vec<PathBuf>) {
    let mut images = Vec::new();
    let mut words = Vec::new();

    for token in input.split_whitespace() {
        if let Some(path) = token.strip_prefix("image:") {
            if !path.is_empty() {
                images.push(PathBuf::from(path));
                continue;
            }
        } else if media_type_for(std::path::Path::new(token)).is_some() {
            images.push(PathBuf::from(token));
            continue;
        }
        words.push(token);
    }

    (words.join(" "), images)
}

/// Generate help text
fn help_text() -> String {
    r#"Deckwright Commands:
─────────────────────────────────────────────
  help, ?          Show this help message
  exit, quit, q    Exit Deckwright
  clear, reset     Start a new conversation
  status           Show current configuration
  debug            Toggle debug mode
  save             Save current settings to the config file

  set chat <model>         Set the chat model
  set generation <model>   Set the slide generation model
  set debug <on|off>       Enable/disable debug output

Images:
  Attach images with image:path/to/logo.png, or just include
  a path ending in .png, .jpg, .jpeg, .gif or .webp

Keyboard Shortcuts:
  Ctrl+C           Cancel current operation
  Ctrl+D           Exit Deckwright

Tips:
  - Describe your topic, audience and branding first
  - The deck is generated once the requirements are clear
─────────────────────────────────────────────"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_images_prefix() {
        let (text, images) = extract_images("use image:assets/logo.svg for the cover");
        assert_eq!(text, "use for the cover");
        assert_eq!(images, vec![PathBuf::from("assets/logo.svg")]);
    }

    #[test]
    fn test_extract_images_by_extension() {
        let (text, images) = extract_images("brand colours are in palette.PNG and chart.webp");
        assert_eq!(text, "brand colours are in and");
        assert_eq!(
            images,
            vec![PathBuf::from("palette.PNG"), PathBuf::from("chart.webp")]
        );
    }

    #[test]
    fn test_extract_images_plain_text() {
        let (text, images) = extract_images("a deck about   rust adoption");
        assert_eq!(text, "a deck about rust adoption");
        assert!(images.is_empty());
    }

    #[test]
    fn test_help_mentions_set() {
        assert!(help_text().contains("set generation"));
    }
}
