//! Chat message data model
//!
//! Defines the [`Message`] structure shared by the session state machine,
//! the history store, and the renderer, along with the id and display
//! timestamp allocation rules.
//!
//! Message ids are millisecond clock readings bumped past the last issued
//! id, so they are unique within a session and roughly ordered by creation
//! time. Display timestamps are HH:MM 24-hour strings captured at creation
//! and never reconstructed from the id.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Unique message identifier within a session
pub type MessageId = i64;

/// Who authored a message
///
/// Immutable after creation: a user message never becomes a bot message
/// and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Message entered by the user
    User,
    /// Message generated by the AI assistant
    Bot,
}

impl Sender {
    /// Returns true for user-authored messages
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User)
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Bot => write!(f, "bot"),
        }
    }
}

/// A single message in a conversation
///
/// Only the `text` field of a user message may change after creation (in
/// place edits); `id`, `sender`, and `timestamp` are fixed.
///
/// # Examples
///
/// ```
/// use parley::message::{Message, Sender};
///
/// let msg = Message::user(1, "Hello!");
/// assert_eq!(msg.sender, Sender::User);
/// assert!(msg.sender.is_user());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier within the session
    pub id: MessageId,
    /// Message content (markdown for bot messages)
    pub text: String,
    /// Message author
    pub sender: Sender,
    /// Display time (HH:MM, 24-hour), captured at creation
    pub timestamp: String,
}

impl Message {
    /// Creates a new user message stamped with the current clock time
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::User,
            timestamp: clock_time(),
        }
    }

    /// Creates a new bot message stamped with the current clock time
    pub fn bot(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::Bot,
            timestamp: clock_time(),
        }
    }
}

/// Current local time as an HH:MM 24-hour display string
pub fn clock_time() -> String {
    Local::now().format("%H:%M").to_string()
}

/// Allocates unique, monotonically increasing message ids
///
/// Ids start from the millisecond clock and are bumped by one whenever the
/// clock has not advanced since the last allocation, so two messages created
/// in the same millisecond still get distinct ids.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    last: MessageId,
}

impl IdAllocator {
    /// Creates a fresh allocator
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator that will never re-issue ids at or below `last`
    ///
    /// Used when resuming a session from a snapshot so new messages cannot
    /// collide with restored ones.
    pub fn starting_after(last: MessageId) -> Self {
        Self { last }
    }

    /// Returns the next unique id
    pub fn next_id(&mut self) -> MessageId {
        let now = chrono::Utc::now().timestamp_millis();
        self.last = now.max(self.last + 1);
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let msg = Message::user(42, "Hello");
        assert_eq!(msg.id, 42);
        assert_eq!(msg.text, "Hello");
        assert_eq!(msg.sender, Sender::User);
        assert!(msg.sender.is_user());
    }

    #[test]
    fn test_bot_message() {
        let msg = Message::bot(43, "Hi there");
        assert_eq!(msg.sender, Sender::Bot);
        assert!(!msg.sender.is_user());
    }

    #[test]
    fn test_timestamp_format() {
        let msg = Message::user(1, "x");
        // HH:MM, 24-hour
        assert_eq!(msg.timestamp.len(), 5);
        assert_eq!(msg.timestamp.as_bytes()[2], b':');
        let hours: u32 = msg.timestamp[..2].parse().expect("hours parse");
        let minutes: u32 = msg.timestamp[3..].parse().expect("minutes parse");
        assert!(hours < 24);
        assert!(minutes < 60);
    }

    #[test]
    fn test_sender_serde_lowercase() {
        let json = serde_json::to_string(&Sender::User).unwrap();
        assert_eq!(json, "\"user\"");
        let json = serde_json::to_string(&Sender::Bot).unwrap();
        assert_eq!(json, "\"bot\"");

        let back: Sender = serde_json::from_str("\"bot\"").unwrap();
        assert_eq!(back, Sender::Bot);
    }

    #[test]
    fn test_message_roundtrip() {
        let msg = Message {
            id: 7,
            text: "round trip".to_string(),
            sender: Sender::Bot,
            timestamp: "14:05".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_id_allocator_unique_ids() {
        let mut alloc = IdAllocator::new();
        let a = alloc.next_id();
        let b = alloc.next_id();
        let c = alloc.next_id();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_id_allocator_starting_after() {
        let far_future = chrono::Utc::now().timestamp_millis() + 1_000_000;
        let mut alloc = IdAllocator::starting_after(far_future);
        assert_eq!(alloc.next_id(), far_future + 1);
    }

    #[test]
    fn test_sender_display() {
        assert_eq!(Sender::User.to_string(), "user");
        assert_eq!(Sender::Bot.to_string(), "bot");
    }
}
