//! Session event notifications
//!
//! The session exposes a subscribe/notify interface so any front end can
//! observe it: subscribers get a broadcast receiver and re-render from the
//! session's accessors when events arrive. Events carry no payloads beyond
//! identifiers; the session itself is the source of truth.

use crate::message::MessageId;

/// Processing phase of the session
///
/// At most one gateway request is in flight at a time: submissions made
/// while `AwaitingResponse` are dropped, not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No request in flight; submissions are accepted
    #[default]
    Idle,
    /// A gateway request is in flight; submissions are dropped
    AwaitingResponse,
}

/// Notification emitted by the session to its subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The message list changed (append or in-place edit)
    MessagesChanged,
    /// The processing phase changed
    PhaseChanged(Phase),
    /// A conversation summary was written to the history store
    HistoryUpdated,
    /// A copied indicator was set for this message
    CopiedIndicatorSet(MessageId),
    /// This message's copied indicator expired
    CopiedIndicatorCleared(MessageId),
    /// A user-facing notice (e.g. share fell back to the clipboard)
    Notice(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_default_is_idle() {
        assert_eq!(Phase::default(), Phase::Idle);
    }

    #[test]
    fn test_events_are_comparable() {
        assert_eq!(
            SessionEvent::CopiedIndicatorSet(3),
            SessionEvent::CopiedIndicatorSet(3)
        );
        assert_ne!(
            SessionEvent::PhaseChanged(Phase::Idle),
            SessionEvent::PhaseChanged(Phase::AwaitingResponse)
        );
    }
}
