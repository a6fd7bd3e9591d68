//! Command-line interface definition for Parley
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat and history management.

use clap::{Parser, Subcommand};

/// Parley - Conversational chat session CLI
///
/// Chat with a response gateway, with conversation history persisted
/// locally and restorable across runs.
#[derive(Parser, Debug, Clone)]
#[command(name = "parley")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the history database path
    #[arg(long, env = "PARLEY_HISTORY_DB")]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Parley
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Seed the session with an initial prompt
        #[arg(short, long)]
        prompt: Option<String>,

        /// Start a fresh conversation, ignoring any saved scratch session
        #[arg(short, long)]
        new: bool,

        /// Resume a saved conversation by id (unambiguous prefixes accepted)
        #[arg(short, long, conflicts_with = "new")]
        resume: Option<String>,

        /// Use the offline echo gateway instead of the remote API
        #[arg(long)]
        offline: bool,
    },

    /// Manage saved conversations
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List saved conversations, most recent first
    List,

    /// Show the messages of a saved conversation
    Show {
        /// Conversation id (unambiguous prefixes accepted)
        id: String,

        /// Render assistant messages as HTML instead of plain text
        #[arg(long)]
        html: bool,
    },

    /// Delete a saved conversation
    Delete {
        /// Conversation id (unambiguous prefixes accepted)
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
