//! Parley - Conversational chat session library
//!
//! This library provides the core functionality for the Parley chat CLI:
//! the session state machine, the response gateway abstraction, history
//! persistence, and markdown rendering.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Chat session state machine and event notifications
//! - `gateway`: Response gateway abstraction and implementations (Gemini, scripted)
//! - `history`: Conversation summaries, scratch sessions, and the sled store
//! - `message`: Message model, sender roles, and id allocation
//! - `render`: Markdown to HTML rendering with theme support
//! - `platform`: Clipboard and share capability ports
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use parley::gateway::ScriptedGateway;
//! use parley::history::MemoryHistory;
//! use parley::session::{LaunchContext, SessionBuilder};
//!
//! #[tokio::main]
//! async fn main() {
//!     let gateway = Arc::new(ScriptedGateway::new());
//!     let history = Arc::new(MemoryHistory::new());
//!     let mut session =
//!         SessionBuilder::new(gateway, history).launch(LaunchContext::cold_start());
//!     session.submit("hello").await;
//!     assert_eq!(session.messages().len(), 2);
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod history;
pub mod message;
pub mod platform;
pub mod render;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use error::{ParleyError, Result};
pub use message::{Message, MessageId, Sender};
pub use session::{ChatSession, LaunchContext, Phase, SessionBuilder, SessionEvent};
