//! Conversation history persistence
//!
//! The history store owns two things, kept deliberately separate:
//!
//! - the durable collection of [`ConversationSummary`] records, keyed by
//!   conversation id, used for the history listing and for resuming past
//!   conversations, and
//! - the ephemeral scratch copy of the currently active session
//!   ([`ActiveSession`]), overwritten on every message-list change and
//!   cleared when a new chat begins.
//!
//! The store is a port: the session state machine only ever talks to the
//! [`HistoryStore`] trait, so tests inject [`MemoryHistory`] and the CLI
//! wires up [`SledHistory`]. Corrupt or missing stored values are treated
//! as absent, never surfaced to callers as errors.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::Result;
use crate::message::Message;

mod memory;
mod sled_store;

pub use memory::MemoryHistory;
pub use sled_store::SledHistory;

/// Persisted record representing one conversation
///
/// `title` is derived from the first user message of the conversation
/// (first 30 characters) and set exactly once; later saves carry an empty
/// title and the store preserves the existing one when merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Unique conversation identifier (ULID)
    pub id: String,

    /// Title derived from the first user message, set once per conversation
    pub title: String,

    /// Most recent bot reply text
    pub last_message: String,

    /// RFC-3339 time of the last summary write
    pub timestamp: String,

    /// Full snapshot of the session's message list at write time
    pub messages: Vec<Message>,
}

/// Ephemeral scratch copy of the active session
///
/// Distinct from the durable summary collection: it exists so an
/// interrupted session can be restored in the same profile, and it is
/// cleared when a new chat begins. The conversation id travels with the
/// messages so a restored session keeps writing to the same durable
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSession {
    /// Conversation id the scratch copy belongs to
    pub conversation_id: String,
    /// Snapshot of the in-memory message list
    pub messages: Vec<Message>,
}

/// Port for durable conversation history plus the active-session scratch copy
///
/// Implementations must guarantee that `save` merges by conversation id and
/// never corrupts or truncates unrelated records. Writes from concurrent
/// processes follow last-write-wins; individual records are never torn.
pub trait HistoryStore: Send + Sync {
    /// Loads all stored summaries, most recently updated first
    ///
    /// Returns an empty list when nothing is stored. Individual corrupt
    /// records are skipped (logged, not raised).
    fn load(&self) -> Result<Vec<ConversationSummary>>;

    /// Saves a summary, merging with any existing record with the same id
    ///
    /// When the incoming title is empty and the stored record already has a
    /// title, the stored title is preserved.
    fn save(&self, summary: &ConversationSummary) -> Result<()>;

    /// Looks up a single summary by full id or unique id prefix
    fn find(&self, id: &str) -> Result<Option<ConversationSummary>>;

    /// Deletes a summary by full id or id prefix
    fn delete(&self, id: &str) -> Result<()>;

    /// Loads the scratch copy of the active session, if one exists
    ///
    /// A corrupt scratch value is treated as absent.
    fn load_active(&self) -> Result<Option<ActiveSession>>;

    /// Overwrites the scratch copy of the active session
    fn save_active(&self, active: &ActiveSession) -> Result<()>;

    /// Removes only the scratch copy, leaving the durable collection intact
    fn clear_active(&self) -> Result<()>;
}

/// Generates a new conversation id
///
/// ULIDs are used rather than UUIDs because they sort by creation time,
/// which keeps the history listing stable without a secondary index.
pub fn new_conversation_id() -> String {
    Ulid::new().to_string()
}

/// Current UTC time in RFC-3339 format, used for all summary timestamps
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Derives a conversation title from its first prompt (first 30 characters)
pub fn title_from_prompt(prompt: &str) -> String {
    prompt.chars().take(30).collect()
}
