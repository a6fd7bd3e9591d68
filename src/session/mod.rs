//! Chat session state machine
//!
//! [`ChatSession`] owns the in-memory message list for one conversation
//! and drives every state transition explicitly: `submit` appends the
//! user's message and performs the gateway round trip, `edit_message`
//! rewrites a user message in place, `copy_message` / `share_message`
//! exercise the platform capability ports. The machine is UI-framework
//! independent; front ends subscribe to [`SessionEvent`]s and re-render
//! from the accessors.
//!
//! # Persistence model
//!
//! Every message-list change mirrors the full list into the history
//! store's scratch slot (idempotent overwrite), and every successful
//! gateway turn writes a [`ConversationSummary`] into the durable
//! collection. Storage failures degrade the session to in-memory-only
//! operation for that turn; they never interrupt the conversation.
//!
//! # Teardown
//!
//! The session carries a cancellation token. Once cancelled (session
//! closed), no state mutation happens after any asynchronous suspension,
//! so a late-arriving gateway response cannot touch a dead session.

mod events;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::gateway::ResponseGateway;
use crate::history::{
    new_conversation_id, now_rfc3339, title_from_prompt, ActiveSession, ConversationSummary,
    HistoryStore,
};
use crate::message::{IdAllocator, Message, MessageId};
use crate::platform::Platform;

pub use events::{Phase, SessionEvent};

/// Fixed apology inserted when the gateway call fails
pub const APOLOGY_MESSAGE: &str = "I apologize, but I encountered an error. Please try again.";

/// Apology inserted when the gateway call exceeds the response timeout
pub const TIMEOUT_APOLOGY_MESSAGE: &str =
    "I apologize, but the response timed out. Please try again.";

/// How long a copied indicator stays set
pub const COPIED_INDICATOR_TTL: Duration = Duration::from_millis(2000);

/// Default cap on how long a single gateway round trip may take
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(60);

/// Initialization parameters handed over from the routing boundary
///
/// Exactly one of "resume with snapshot", "new chat with seed", or "cold
/// start" applies, resolved in the priority order documented on
/// [`SessionBuilder::launch`].
#[derive(Debug, Clone, Default)]
pub struct LaunchContext {
    /// Seed prompt to submit as the conversation's first message
    pub initial_message: Option<String>,
    /// The navigation carried a "new chat" signal
    pub new_chat: bool,
    /// Explicit history selection to resume verbatim
    pub resume: Option<ConversationSummary>,
}

impl LaunchContext {
    /// A cold start with no seed, no resume, no new-chat signal
    pub fn cold_start() -> Self {
        Self::default()
    }

    /// A new chat seeded with `prompt`
    pub fn new_chat_with(prompt: impl Into<String>) -> Self {
        Self {
            initial_message: Some(prompt.into()),
            new_chat: true,
            resume: None,
        }
    }

    /// Resume a stored conversation verbatim
    pub fn resume_from(summary: ConversationSummary) -> Self {
        Self {
            initial_message: None,
            new_chat: false,
            resume: Some(summary),
        }
    }
}

/// Builder for [`ChatSession`]
pub struct SessionBuilder {
    gateway: Arc<dyn ResponseGateway>,
    history: Arc<dyn HistoryStore>,
    platform: Platform,
    response_timeout: Duration,
}

impl SessionBuilder {
    /// Creates a builder with the two mandatory ports
    pub fn new(gateway: Arc<dyn ResponseGateway>, history: Arc<dyn HistoryStore>) -> Self {
        Self {
            gateway,
            history,
            platform: Platform::headless(),
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }

    /// Attaches the host platform capabilities
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Overrides the gateway response timeout
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Builds the session, applying the initialization priority order:
    ///
    /// 1. explicit resume → restore that snapshot verbatim, no gateway call;
    /// 2. new chat with a seed prompt → list starts with exactly the seed
    ///    user message, a gateway turn becomes pending, the stale scratch
    ///    copy is cleared;
    /// 3. a scratch copy exists → restore the interrupted session verbatim;
    /// 4. seed prompt without the new-chat signal → same as 2;
    /// 5. otherwise → empty list.
    ///
    /// When a seed is pending the session is already in
    /// [`Phase::AwaitingResponse`]; the caller drives the actual round trip
    /// with [`ChatSession::resolve_pending`].
    pub fn launch(self, ctx: LaunchContext) -> ChatSession {
        let (events, _) = broadcast::channel(64);
        let mut session = ChatSession {
            conversation_id: new_conversation_id(),
            messages: Vec::new(),
            phase: Phase::Idle,
            ids: IdAllocator::new(),
            gateway: self.gateway,
            history: self.history,
            platform: self.platform,
            response_timeout: self.response_timeout,
            cancel: CancellationToken::new(),
            events,
            copied: HashMap::new(),
            pending_seed: None,
        };
        session.initialize(ctx);
        session
    }
}

/// The state machine for one chat conversation
pub struct ChatSession {
    conversation_id: String,
    messages: Vec<Message>,
    phase: Phase,
    ids: IdAllocator,
    gateway: Arc<dyn ResponseGateway>,
    history: Arc<dyn HistoryStore>,
    platform: Platform,
    response_timeout: Duration,
    cancel: CancellationToken,
    events: broadcast::Sender<SessionEvent>,
    copied: HashMap<MessageId, Instant>,
    pending_seed: Option<String>,
}

impl ChatSession {
    fn initialize(&mut self, ctx: LaunchContext) {
        if let Some(summary) = ctx.resume {
            // Case 1: explicit history selection, restored verbatim.
            self.conversation_id = summary.id;
            self.ids = IdAllocator::starting_after(
                summary.messages.iter().map(|m| m.id).max().unwrap_or(0),
            );
            self.messages = summary.messages;
            self.mirror_scratch();
            return;
        }

        if !ctx.new_chat {
            // Case 3: an interrupted session in this profile wins over a
            // bare seed prompt.
            match self.history.load_active() {
                Ok(Some(active)) if !active.messages.is_empty() => {
                    self.conversation_id = active.conversation_id;
                    self.ids = IdAllocator::starting_after(
                        active.messages.iter().map(|m| m.id).max().unwrap_or(0),
                    );
                    self.messages = active.messages;
                    return;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("load_active failed, starting fresh: {}", e);
                }
            }
        }

        // A seed that trims to nothing is no seed at all, same as the
        // non-empty-after-trim rule submit enforces.
        let seed = ctx
            .initial_message
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match seed {
            Some(seed) => {
                // Cases 2 and 4: the list begins with exactly the seed user
                // message and a gateway turn is pending. The stale scratch
                // copy is cleared before anything is mirrored.
                self.clear_scratch();
                let id = self.ids.next_id();
                self.messages.push(Message::user(id, seed));
                self.set_phase(Phase::AwaitingResponse);
                self.pending_seed = Some(seed.to_string());
            }
            None => {
                // Case 5: cold start.
                if ctx.new_chat {
                    self.clear_scratch();
                }
            }
        }
    }

    /// Subscribes to session notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// The conversation's persistent identifier
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// The current message list, in chronological order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The current processing phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while a gateway request is in flight (or pending)
    pub fn is_awaiting(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    /// A token that is cancelled when the session closes
    ///
    /// Front ends hold a clone to abort an in-flight turn on teardown.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Closes the session
    ///
    /// Any in-flight gateway turn stops mutating state at its next
    /// suspension point; further operations are dropped.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Performs the gateway turn for a pending seed prompt, if any
    ///
    /// No-op when the session was not launched with a seed.
    pub async fn resolve_pending(&mut self) {
        if let Some(prompt) = self.pending_seed.take() {
            let first_turn = self.messages.len() == 1;
            self.request_reply(prompt, first_turn).await;
        }
    }

    /// Submits a user prompt
    ///
    /// Dropped (not queued) when the trimmed text is empty, a request is
    /// already in flight, or the session is closed. Otherwise appends the
    /// user message, transitions to `AwaitingResponse`, performs the
    /// gateway round trip, and returns to `Idle`.
    pub async fn submit(&mut self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        if self.phase != Phase::Idle {
            tracing::debug!("Dropping submission while a request is in flight");
            return;
        }
        if self.cancel.is_cancelled() {
            tracing::debug!("Dropping submission on a closed session");
            return;
        }

        let first_turn = self.messages.is_empty();
        let id = self.ids.next_id();
        self.messages.push(Message::user(id, trimmed));
        self.notify(SessionEvent::MessagesChanged);
        self.mirror_scratch();

        self.set_phase(Phase::AwaitingResponse);
        self.request_reply(trimmed.to_string(), first_turn).await;
    }

    /// One gateway round trip: call, append the reply (or an apology),
    /// persist the summary on success, and return to `Idle`.
    async fn request_reply(&mut self, prompt: String, first_turn: bool) {
        let gateway = Arc::clone(&self.gateway);
        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => {
                tracing::debug!("Session closed while awaiting the gateway");
                return;
            }
            result = tokio::time::timeout(
                self.response_timeout,
                gateway.generate_response(&prompt),
            ) => result,
        };

        // The await above is the suspension point; re-check before any
        // mutation so a response racing with close() is discarded.
        if self.cancel.is_cancelled() {
            return;
        }

        match outcome {
            Ok(Ok(reply)) => {
                let id = self.ids.next_id();
                self.messages.push(Message::bot(id, &reply));
                self.notify(SessionEvent::MessagesChanged);
                self.mirror_scratch();
                self.persist_summary(first_turn, &prompt, &reply);
            }
            Ok(Err(e)) => {
                tracing::warn!("Gateway call failed: {}", e);
                let id = self.ids.next_id();
                self.messages.push(Message::bot(id, APOLOGY_MESSAGE));
                self.notify(SessionEvent::MessagesChanged);
                self.mirror_scratch();
            }
            Err(_) => {
                tracing::warn!(
                    "Gateway call timed out after {:?}",
                    self.response_timeout
                );
                let id = self.ids.next_id();
                self.messages.push(Message::bot(id, TIMEOUT_APOLOGY_MESSAGE));
                self.notify(SessionEvent::MessagesChanged);
                self.mirror_scratch();
            }
        }

        self.set_phase(Phase::Idle);
    }

    /// Edits a user message's text in place
    ///
    /// Returns false and leaves all state untouched when no message has
    /// this id or the message is bot-authored. Never triggers a gateway
    /// call or a durable history write; `id`, `sender`, `timestamp`, and
    /// position are preserved.
    pub fn edit_message(&mut self, id: MessageId, new_text: impl Into<String>) -> bool {
        let Some(message) = self
            .messages
            .iter_mut()
            .find(|m| m.id == id && m.sender.is_user())
        else {
            return false;
        };
        message.text = new_text.into();
        self.notify(SessionEvent::MessagesChanged);
        self.mirror_scratch();
        true
    }

    /// Copies a message's text to the host clipboard
    ///
    /// On success a copied indicator for that id is set for two seconds
    /// and then clears by itself. A missing clipboard capability or a
    /// failed write is logged; the only user-visible effect is the absent
    /// indicator.
    pub fn copy_message(&mut self, id: MessageId) {
        let Some(text) = self
            .messages
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.text.clone())
        else {
            return;
        };

        let Some(clipboard) = self.platform.clipboard.as_ref() else {
            tracing::debug!("copy_message: no clipboard capability");
            return;
        };

        if let Err(e) = clipboard.write_text(&text) {
            tracing::warn!("copy_message failed: {}", e);
            return;
        }

        self.copied.insert(id, Instant::now());
        self.notify(SessionEvent::CopiedIndicatorSet(id));

        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(COPIED_INDICATOR_TTL).await;
            events.send(SessionEvent::CopiedIndicatorCleared(id)).ok();
        });
    }

    /// True while the copied indicator for `id` is set
    ///
    /// Each indicator expires two seconds after its own copy,
    /// independently of other messages' indicators.
    pub fn copied_indicator(&self, id: MessageId) -> bool {
        self.copied
            .get(&id)
            .map(|set_at| set_at.elapsed() < COPIED_INDICATOR_TTL)
            .unwrap_or(false)
    }

    /// Shares a message's text via the host share facility
    ///
    /// Falls back to a clipboard copy with a user notice when no share
    /// capability is present. Failures are logged, never surfaced as
    /// errors.
    pub fn share_message(&mut self, text: &str) {
        if let Some(share) = self.platform.share.as_ref() {
            if let Err(e) = share.share_text(text) {
                tracing::warn!("share_message failed: {}", e);
            }
            return;
        }

        match self.platform.clipboard.as_ref() {
            Some(clipboard) => match clipboard.write_text(text) {
                Ok(()) => {
                    self.notify(SessionEvent::Notice(
                        "Copied to clipboard - sharing not supported".to_string(),
                    ));
                }
                Err(e) => {
                    tracing::warn!("share_message clipboard fallback failed: {}", e);
                }
            },
            None => {
                tracing::debug!("share_message: no share or clipboard capability");
            }
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            self.phase = phase;
            self.notify(SessionEvent::PhaseChanged(phase));
        }
    }

    fn notify(&self, event: SessionEvent) {
        // A send error only means nobody is subscribed.
        self.events.send(event).ok();
    }

    /// Overwrites the scratch copy with the full current list
    fn mirror_scratch(&self) {
        let active = ActiveSession {
            conversation_id: self.conversation_id.clone(),
            messages: self.messages.clone(),
        };
        if let Err(e) = self.history.save_active(&active) {
            tracing::warn!("save_active failed, continuing in-memory: {}", e);
        }
    }

    fn clear_scratch(&self) {
        if let Err(e) = self.history.clear_active() {
            tracing::warn!("clear_active failed: {}", e);
        }
    }

    /// Writes the conversation summary after a successful turn
    ///
    /// The title is set from the triggering prompt only on the
    /// conversation's first turn; the store preserves it on later merges.
    fn persist_summary(&self, first_turn: bool, prompt: &str, reply: &str) {
        let summary = ConversationSummary {
            id: self.conversation_id.clone(),
            title: if first_turn {
                title_from_prompt(prompt)
            } else {
                String::new()
            },
            last_message: reply.to_string(),
            timestamp: now_rfc3339(),
            messages: self.messages.clone(),
        };

        match self.history.save(&summary) {
            Ok(()) => {
                self.notify(SessionEvent::HistoryUpdated);
            }
            Err(e) => {
                tracing::warn!("History save failed, continuing in-memory: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ScriptedGateway;
    use crate::history::MemoryHistory;
    use crate::message::Sender;
    use crate::platform::MemoryClipboard;

    fn build(
        gateway: Arc<ScriptedGateway>,
        history: Arc<MemoryHistory>,
        ctx: LaunchContext,
    ) -> ChatSession {
        SessionBuilder::new(gateway, history).launch(ctx)
    }

    #[tokio::test]
    async fn test_submit_appends_user_then_bot_and_returns_to_idle() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_reply("Hi!");
        let history = Arc::new(MemoryHistory::new());
        let mut session = build(gateway, Arc::clone(&history), LaunchContext::cold_start());

        session.submit("Hello").await;

        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].sender, Sender::User);
        assert_eq!(session.messages()[0].text, "Hello");
        assert_eq!(session.messages()[1].sender, Sender::Bot);
        assert_eq!(session.messages()[1].text, "Hi!");
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_submit_trims_and_drops_whitespace_only() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_reply("reply");
        let history = Arc::new(MemoryHistory::new());
        let mut session = build(gateway, history, LaunchContext::cold_start());

        session.submit("   \n\t ").await;
        assert!(session.messages().is_empty());

        session.submit("  padded  ").await;
        assert_eq!(session.messages()[0].text, "padded");
    }

    #[tokio::test]
    async fn test_gateway_failure_appends_fixed_apology_and_skips_history() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_failure("backend down");
        let history = Arc::new(MemoryHistory::new());
        let mut session = build(gateway, Arc::clone(&history), LaunchContext::cold_start());

        session.submit("Hello").await;

        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].sender, Sender::Bot);
        assert_eq!(session.messages()[1].text, APOLOGY_MESSAGE);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(history.load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_writes_summary_with_first_turn_title() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_reply("nice to meet you");
        gateway.push_reply("still here");
        let history = Arc::new(MemoryHistory::new());
        let mut session = build(gateway, Arc::clone(&history), LaunchContext::cold_start());

        session.submit("Hello there, this is a rather long first prompt").await;

        let summaries = history.load().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].title, "Hello there, this is a rather ");
        assert_eq!(summaries[0].last_message, "nice to meet you");
        assert_eq!(summaries[0].messages, session.messages());

        session.submit("Second turn").await;
        let summaries = history.load().unwrap();
        assert_eq!(summaries.len(), 1);
        // Title from the first turn survives the merge.
        assert_eq!(summaries[0].title, "Hello there, this is a rather ");
        assert_eq!(summaries[0].last_message, "still here");
    }

    #[tokio::test]
    async fn test_new_chat_with_seed_starts_with_one_user_message() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_reply("Hi!");
        let history = Arc::new(MemoryHistory::new());
        let mut session = build(
            gateway,
            Arc::clone(&history),
            LaunchContext::new_chat_with("Hello"),
        );

        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].text, "Hello");
        assert_eq!(session.messages()[0].sender, Sender::User);
        assert!(session.is_awaiting());

        session.resolve_pending().await;
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].text, "Hi!");
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_whitespace_only_seed_is_a_cold_start() {
        let gateway = Arc::new(ScriptedGateway::new());
        let history = Arc::new(MemoryHistory::new());
        let mut session = build(
            gateway,
            history,
            LaunchContext::new_chat_with("   \n\t "),
        );

        assert!(session.messages().is_empty());
        assert_eq!(session.phase(), Phase::Idle);

        // Nothing is pending, so resolving is a no-op.
        session.resolve_pending().await;
        assert!(session.messages().is_empty());
    }

    #[tokio::test]
    async fn test_submit_while_awaiting_is_dropped() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_reply("Hi!");
        let history = Arc::new(MemoryHistory::new());
        let mut session = build(
            gateway,
            history,
            LaunchContext::new_chat_with("seed prompt"),
        );

        // The seed turn is still pending, so the machine is awaiting.
        assert!(session.is_awaiting());
        session.submit("dropped, not queued").await;
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].text, "seed prompt");

        session.resolve_pending().await;
        assert_eq!(session.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_new_chat_clears_stale_scratch() {
        let history = Arc::new(MemoryHistory::new());
        history
            .save_active(&ActiveSession {
                conversation_id: "stale".to_string(),
                messages: vec![Message::user(1, "old draft")],
            })
            .unwrap();

        let gateway = Arc::new(ScriptedGateway::new());
        let session = build(
            gateway,
            Arc::clone(&history),
            LaunchContext {
                initial_message: None,
                new_chat: true,
                resume: None,
            },
        );

        assert!(session.messages().is_empty());
        assert!(history.load_active().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scratch_restore_when_no_new_chat_signal() {
        let history = Arc::new(MemoryHistory::new());
        let stored = vec![Message::user(10, "draft"), Message::bot(11, "reply")];
        history
            .save_active(&ActiveSession {
                conversation_id: "SCRATCH1".to_string(),
                messages: stored.clone(),
            })
            .unwrap();

        let gateway = Arc::new(ScriptedGateway::new());
        let session = build(gateway, history, LaunchContext::cold_start());

        assert_eq!(session.messages(), stored.as_slice());
        assert_eq!(session.conversation_id(), "SCRATCH1");
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_scratch_wins_over_bare_seed() {
        let history = Arc::new(MemoryHistory::new());
        history
            .save_active(&ActiveSession {
                conversation_id: "SCRATCH2".to_string(),
                messages: vec![Message::user(1, "interrupted")],
            })
            .unwrap();

        let gateway = Arc::new(ScriptedGateway::new());
        let session = build(
            gateway,
            history,
            LaunchContext {
                initial_message: Some("seed".to_string()),
                new_chat: false,
                resume: None,
            },
        );

        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].text, "interrupted");
        assert!(!session.is_awaiting());
    }

    #[tokio::test]
    async fn test_bare_seed_without_scratch_behaves_like_new_chat() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_reply("ok");
        let history = Arc::new(MemoryHistory::new());
        let mut session = build(
            gateway,
            history,
            LaunchContext {
                initial_message: Some("seed".to_string()),
                new_chat: false,
                resume: None,
            },
        );

        assert_eq!(session.messages().len(), 1);
        assert!(session.is_awaiting());
        session.resolve_pending().await;
        assert_eq!(session.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_resume_restores_snapshot_without_gateway_call() {
        let snapshot = ConversationSummary {
            id: "RESUMED".to_string(),
            title: "Old chat".to_string(),
            last_message: "bye".to_string(),
            timestamp: now_rfc3339(),
            messages: vec![
                Message::user(1, "hi"),
                Message::bot(2, "hello"),
                Message::user(3, "bye?"),
                Message::bot(4, "bye"),
            ],
        };

        // Empty-script gateway would echo; a gateway turn would change the
        // list, so an unchanged list proves no call happened.
        let gateway = Arc::new(ScriptedGateway::new());
        let history = Arc::new(MemoryHistory::new());
        let mut session = build(
            gateway,
            history,
            LaunchContext::resume_from(snapshot.clone()),
        );
        session.resolve_pending().await;

        assert_eq!(session.messages(), snapshot.messages.as_slice());
        assert_eq!(session.conversation_id(), "RESUMED");
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_edit_message_rewrites_only_user_text() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_reply("reply");
        let history = Arc::new(MemoryHistory::new());
        let mut session = build(gateway, history, LaunchContext::cold_start());
        session.submit("original").await;

        let user = session.messages()[0].clone();
        let bot = session.messages()[1].clone();

        assert!(session.edit_message(user.id, "edited"));
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].text, "edited");
        assert_eq!(session.messages()[0].id, user.id);
        assert_eq!(session.messages()[0].timestamp, user.timestamp);
        assert_eq!(session.messages()[0].sender, Sender::User);

        // Bot messages are not editable.
        assert!(!session.edit_message(bot.id, "tampered"));
        assert_eq!(session.messages()[1].text, "reply");

        // Unknown ids are a no-op.
        assert!(!session.edit_message(999_999, "nope"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_indicator_clears_after_two_seconds() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_reply("reply");
        let history = Arc::new(MemoryHistory::new());
        let mut session = SessionBuilder::new(gateway, history)
            .platform(Platform::headless().with_clipboard(Arc::clone(&clipboard) as _))
            .launch(LaunchContext::cold_start());
        session.submit("copy me").await;

        let id = session.messages()[1].id;
        session.copy_message(id);

        assert_eq!(clipboard.contents().as_deref(), Some("reply"));
        assert!(session.copied_indicator(id));

        tokio::time::advance(Duration::from_millis(1999)).await;
        assert!(session.copied_indicator(id));

        tokio::time::advance(Duration::from_millis(2)).await;
        assert!(!session.copied_indicator(id));
    }

    #[tokio::test]
    async fn test_copy_without_clipboard_sets_no_indicator() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_reply("reply");
        let history = Arc::new(MemoryHistory::new());
        let mut session = build(gateway, history, LaunchContext::cold_start());
        session.submit("hello").await;

        let id = session.messages()[1].id;
        session.copy_message(id);
        assert!(!session.copied_indicator(id));
    }

    #[tokio::test]
    async fn test_share_falls_back_to_clipboard_with_notice() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let gateway = Arc::new(ScriptedGateway::new());
        let history = Arc::new(MemoryHistory::new());
        let mut session = SessionBuilder::new(gateway, history)
            .platform(Platform::headless().with_clipboard(Arc::clone(&clipboard) as _))
            .launch(LaunchContext::cold_start());

        let mut rx = session.subscribe();
        session.share_message("share this");

        assert_eq!(clipboard.contents().as_deref(), Some("share this"));
        let event = rx.try_recv().unwrap();
        assert!(matches!(event, SessionEvent::Notice(_)));
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_session_usable() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_reply("still works");
        let history = Arc::new(MemoryHistory::new());
        history.fail_all();

        let mut session = build(gateway, Arc::clone(&history), LaunchContext::cold_start());
        session.submit("Hello").await;

        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].text, "still works");
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_closed_session_drops_submissions() {
        let gateway = Arc::new(ScriptedGateway::new());
        let history = Arc::new(MemoryHistory::new());
        let mut session = build(gateway, history, LaunchContext::cold_start());

        session.close();
        session.submit("too late").await;
        assert!(session.messages().is_empty());
    }

    #[tokio::test]
    async fn test_message_ids_are_unique_within_session() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_reply("a");
        gateway.push_reply("b");
        let history = Arc::new(MemoryHistory::new());
        let mut session = build(gateway, history, LaunchContext::cold_start());

        session.submit("one").await;
        session.submit("two").await;

        let mut ids: Vec<_> = session.messages().iter().map(|m| m.id).collect();
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[tokio::test]
    async fn test_scratch_mirrors_every_list_change() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_reply("reply");
        let history = Arc::new(MemoryHistory::new());
        let mut session = build(gateway, Arc::clone(&history), LaunchContext::cold_start());

        session.submit("hello").await;
        let active = history.load_active().unwrap().unwrap();
        assert_eq!(active.messages, session.messages());
        assert_eq!(active.conversation_id, session.conversation_id());

        let id = session.messages()[0].id;
        session.edit_message(id, "hello edited");
        let active = history.load_active().unwrap().unwrap();
        assert_eq!(active.messages[0].text, "hello edited");
    }
}
