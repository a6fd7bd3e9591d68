//! Interactive chat mode handler.
//!
//! Instantiates a gateway and the history store, launches a `ChatSession`,
//! and runs a readline-based loop that submits user input to the session.
//! Session notices (for example the share clipboard fallback) are surfaced
//! through the broadcast channel and printed between turns.

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::error::{ParleyError, Result};
use crate::gateway::{GeminiGateway, ResponseGateway, ScriptedGateway};
use crate::history::{HistoryStore, SledHistory};
use crate::message::Sender;
use crate::platform::{MemoryClipboard, Platform};
use crate::session::{LaunchContext, SessionBuilder, SessionEvent};

/// Start an interactive chat session
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `prompt` - Optional seed prompt submitted as the first message
/// * `new` - Start fresh, ignoring any saved scratch session
/// * `resume` - Optional saved conversation id to restore
/// * `offline` - Use the echo gateway instead of the remote API
pub async fn run_chat(
    config: Config,
    prompt: Option<String>,
    new: bool,
    resume: Option<String>,
    offline: bool,
) -> Result<()> {
    let history = open_history(&config)?;

    let gateway: Arc<dyn ResponseGateway> = if offline {
        tracing::info!("Using offline echo gateway");
        Arc::new(ScriptedGateway::new())
    } else {
        Arc::new(GeminiGateway::new(&config.gateway)?)
    };

    let ctx = launch_context(&*history, prompt, new, resume)?;

    let platform = Platform::headless().with_clipboard(Arc::new(MemoryClipboard::new()));
    let mut session = SessionBuilder::new(gateway, Arc::clone(&history))
        .platform(platform)
        .response_timeout(Duration::from_secs(config.gateway.timeout_seconds))
        .launch(ctx);
    let mut events = session.subscribe();

    print_welcome_banner(session.conversation_id());

    // Replay restored messages so a resumed conversation is visible.
    for message in session.messages() {
        print_message(message.sender, &message.timestamp, &message.text);
    }

    // A seed prompt launches already awaiting; complete that turn first.
    if session.is_awaiting() {
        session.resolve_pending().await;
        print_new_replies(&session, &mut events, 1);
    }

    let mut rl = DefaultEditor::new()?;
    let mut printed = session.messages().len();

    loop {
        match rl.readline(&"you> ".green().to_string()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                match trimmed {
                    "/quit" | "/exit" => break,
                    "/help" => {
                        print_help();
                        continue;
                    }
                    "/copy" => {
                        if let Some(last) = session.messages().last().map(|m| m.id) {
                            session.copy_message(last);
                            if session.copied_indicator(last) {
                                println!("{}", "Copied last message.".cyan());
                            }
                        }
                        drain_notices(&mut events);
                        continue;
                    }
                    "/share" => {
                        let text = session
                            .messages()
                            .iter()
                            .rev()
                            .find(|m| m.sender == Sender::Bot)
                            .map(|m| m.text.clone());
                        match text {
                            Some(text) => session.share_message(&text),
                            None => println!("{}", "Nothing to share yet.".yellow()),
                        }
                        drain_notices(&mut events);
                        continue;
                    }
                    _ => {}
                }

                printed += 1; // the user message just echoed by readline
                session.submit(trimmed).await;
                printed = print_new_replies(&session, &mut events, printed);
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    session.close();
    println!("{}", "Session saved. Goodbye.".cyan());
    Ok(())
}

/// Opens the sled-backed history store
///
/// The `PARLEY_HISTORY_DB` environment variable (or the `--storage-path`
/// flag that mirrors into it) wins over the configured path.
fn open_history(config: &Config) -> Result<Arc<dyn HistoryStore>> {
    let store = match (&config.history.path, std::env::var_os("PARLEY_HISTORY_DB")) {
        (Some(path), None) => SledHistory::new_with_path(path)?,
        _ => SledHistory::new()?,
    };
    Ok(Arc::new(store))
}

/// Resolves CLI flags into the session launch context
fn launch_context(
    history: &dyn HistoryStore,
    prompt: Option<String>,
    new: bool,
    resume: Option<String>,
) -> Result<LaunchContext> {
    if let Some(id) = resume {
        let summary = history
            .find(&id)?
            .ok_or_else(|| ParleyError::Storage(format!("No saved conversation matches '{id}'")))?;
        return Ok(LaunchContext::resume_from(summary));
    }

    Ok(LaunchContext {
        initial_message: prompt,
        new_chat: new,
        resume: None,
    })
}

/// Prints replies appended since `printed` and returns the new count
fn print_new_replies(
    session: &crate::session::ChatSession,
    events: &mut broadcast::Receiver<SessionEvent>,
    printed: usize,
) -> usize {
    for message in &session.messages()[printed.min(session.messages().len())..] {
        if message.sender == Sender::Bot {
            print_message(message.sender, &message.timestamp, &message.text);
        }
    }
    drain_notices(events);
    session.messages().len()
}

fn drain_notices(events: &mut broadcast::Receiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::Notice(text) = event {
            println!("{}", text.yellow());
        }
    }
}

fn print_message(sender: Sender, timestamp: &str, text: &str) {
    let label = match sender {
        Sender::User => "you".green(),
        Sender::Bot => "bot".blue(),
    };
    println!("[{}] {}: {}", timestamp.dimmed(), label, text);
}

fn print_welcome_banner(conversation_id: &str) {
    println!();
    println!("{}", "Parley interactive chat".bold());
    println!("Conversation: {}", conversation_id.cyan());
    println!("Type {} for commands, {} to leave.", "/help".cyan(), "/quit".cyan());
    println!();
}

fn print_help() {
    println!("Available commands:");
    println!("  {}   Copy the last message", "/copy ".cyan());
    println!("  {}  Share the last assistant reply", "/share".cyan());
    println!("  {}   Show this help", "/help ".cyan());
    println!("  {}   End the session", "/quit ".cyan());
}
