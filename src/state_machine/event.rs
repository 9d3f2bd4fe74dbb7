//! Events that can occur in a conversation

use super::state::TurnMode;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// Inbound user utterance
    UserMessage { text: String, mode: TurnMode },

    /// Raw text returned by the completion service
    CompletionReceived { raw: String },

    /// The completion service failed (provider error, transport error or timeout).
    /// Every kind of failure is handled the same way, so only the message is kept.
    CompletionFailed { message: String },
}

impl Event {
    /// Short name for logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Event::UserMessage { .. } => "user_message",
            Event::CompletionReceived { .. } => "completion_received",
            Event::CompletionFailed { .. } => "completion_failed",
        }
    }
}
