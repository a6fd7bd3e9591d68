//! AI response gateway abstraction
//!
//! The gateway is the single external call the chat session makes: one
//! prompt in, one complete reply string out. It is deliberately opaque,
//! with no streaming contract and no provider detail leaking into the
//! session state machine. Implementations: [`GeminiGateway`] for the hosted API and
//! [`ScriptedGateway`] with canned replies for tests and offline demos.

use async_trait::async_trait;

use crate::error::{ParleyError, Result};

mod gemini;

pub use gemini::GeminiGateway;

/// Port for the external text-generation service
///
/// The session invokes this exactly once per user turn and treats any
/// error as a recoverable gateway failure.
#[async_trait]
pub trait ResponseGateway: Send + Sync {
    /// Generates a reply for the given prompt
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Gateway` when the call fails or the response
    /// is malformed.
    async fn generate_response(&self, prompt: &str) -> Result<String>;
}

/// A step in a [`ScriptedGateway`] playbook
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Succeed with this reply text
    Reply(String),
    /// Fail with a gateway error carrying this message
    Fail(String),
}

/// Gateway that replays a preset sequence of replies
///
/// Each call consumes the next scripted step; when the script runs out the
/// gateway echoes the prompt back. Used throughout the test suite to drive
/// the session without a network, and by the `--offline` demo mode.
#[derive(Default)]
pub struct ScriptedGateway {
    script: std::sync::Mutex<std::collections::VecDeque<ScriptedReply>>,
}

impl ScriptedGateway {
    /// Creates a gateway with an empty script (echoes every prompt)
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway from a fixed sequence of steps
    pub fn with_script(steps: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            script: std::sync::Mutex::new(steps.into_iter().collect()),
        }
    }

    /// Queues a successful reply
    pub fn push_reply(&self, text: impl Into<String>) {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(ScriptedReply::Reply(text.into()));
    }

    /// Queues a failure
    pub fn push_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(ScriptedReply::Fail(message.into()));
    }
}

#[async_trait]
impl ResponseGateway for ScriptedGateway {
    async fn generate_response(&self, prompt: &str) -> Result<String> {
        let step = self
            .script
            .lock()
            .expect("script lock poisoned")
            .pop_front();

        match step {
            Some(ScriptedReply::Reply(text)) => Ok(text),
            Some(ScriptedReply::Fail(message)) => Err(ParleyError::Gateway(message).into()),
            None => Ok(format!("You said: {}", prompt)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_gateway_replays_in_order() {
        let gateway = ScriptedGateway::with_script([
            ScriptedReply::Reply("first".to_string()),
            ScriptedReply::Reply("second".to_string()),
        ]);

        assert_eq!(gateway.generate_response("a").await.unwrap(), "first");
        assert_eq!(gateway.generate_response("b").await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_scripted_gateway_failure_step() {
        let gateway = ScriptedGateway::new();
        gateway.push_failure("boom");

        let err = gateway.generate_response("x").await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_scripted_gateway_echoes_when_script_empty() {
        let gateway = ScriptedGateway::new();
        let reply = tokio_test::block_on(gateway.generate_response("hello")).unwrap();
        assert_eq!(reply, "You said: hello");
    }
}
