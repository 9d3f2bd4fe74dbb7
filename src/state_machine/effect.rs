//! Effects produced by state transitions

use super::log::Speaker;
use super::state::TurnMode;
use super::turn::TurnResult;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append an utterance to the conversation log
    AppendUtterance { speaker: Speaker, text: String },

    /// Build a prompt from the current log and call the completion service
    RequestCompletion { mode: TurnMode },

    /// Hand the turn's result back to the caller
    Respond(TurnResult),
}

impl Effect {
    pub fn append_user(text: impl Into<String>) -> Self {
        Effect::AppendUtterance {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn append_agent(text: impl Into<String>) -> Self {
        Effect::AppendUtterance {
            speaker: Speaker::Agent,
            text: text.into(),
        }
    }
}
