//! History management command handlers.

use colored::Colorize;
use prettytable::{format, Table};

use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::{ParleyError, Result};
use crate::history::{HistoryStore, SledHistory};
use crate::message::Sender;
use crate::render;

/// Handle history commands
pub fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let storage = match (&config.history.path, std::env::var_os("PARLEY_HISTORY_DB")) {
        (Some(path), None) => SledHistory::new_with_path(path)?,
        _ => SledHistory::new()?,
    };

    match command {
        HistoryCommand::List => {
            let conversations = storage.load()?;

            if conversations.is_empty() {
                println!("{}", "No conversation history found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

            table.add_row(prettytable::row![
                "ID".bold(),
                "Title".bold(),
                "Last Message".bold(),
                "Messages".bold(),
                "Updated".bold()
            ]);

            for conversation in conversations {
                let id_short: String = conversation.id.chars().take(8).collect();
                let title = truncate(&conversation.title, 40);
                let last = truncate(&conversation.last_message, 40);
                let updated = conversation
                    .timestamp
                    .get(..16)
                    .unwrap_or(&conversation.timestamp)
                    .replace('T', " ");

                table.add_row(prettytable::row![
                    id_short.cyan(),
                    title,
                    last,
                    conversation.messages.len(),
                    updated
                ]);
            }

            println!("\nConversation History:");
            table.printstd();
            println!();
            println!(
                "Use {} to resume a conversation.",
                "parley chat --resume <ID>".cyan()
            );
            println!();
        }
        HistoryCommand::Show { id, html } => {
            let conversation = storage
                .find(&id)?
                .ok_or_else(|| ParleyError::Storage(format!("No saved conversation matches '{id}'")))?;

            println!();
            println!("{} ({})", conversation.title.bold(), conversation.id.cyan());
            println!();
            for message in &conversation.messages {
                match message.sender {
                    Sender::User => {
                        println!("[{}] {}: {}", message.timestamp.dimmed(), "you".green(), message.text);
                    }
                    Sender::Bot => {
                        let body = if html {
                            render::render(&message.text, config.ui.theme)
                        } else {
                            message.text.clone()
                        };
                        println!("[{}] {}: {}", message.timestamp.dimmed(), "bot".blue(), body);
                    }
                }
            }
            println!();
        }
        HistoryCommand::Delete { id } => {
            let conversation = storage
                .find(&id)?
                .ok_or_else(|| ParleyError::Storage(format!("No saved conversation matches '{id}'")))?;
            storage.delete(&conversation.id)?;
            println!("{}", format!("Deleted conversation {}", conversation.id).green());
        }
    }

    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
