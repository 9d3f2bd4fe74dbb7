//! Append-only conversation log

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Agent,
}

impl Speaker {
    /// Prefix used when the log is rendered into a prompt
    pub fn label(self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Agent => "Agent",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single speaker-tagged line of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: Speaker,
    pub text: String,
}

/// Ordered record of every utterance in a session.
///
/// Utterances can only be appended; the log is never truncated or reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConversationLog {
    utterances: Vec<Utterance>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.utterances.push(Utterance {
            speaker,
            text: text.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    /// Formatted `"<Speaker>: <text>"` lines in insertion order.
    ///
    /// The iterator is lazy and can be cloned to walk the log again.
    pub fn render(&self) -> impl Iterator<Item = String> + Clone + '_ {
        self.utterances
            .iter()
            .map(|u| format!("{}: {}", u.speaker, u.text))
    }

    /// All rendered lines joined with newlines, ready for a prompt
    pub fn rendered(&self) -> String {
        self.render().collect::<Vec<_>>().join("\n")
    }

    /// Like [`rendered`](Self::rendered), with one extra line that is not
    /// (yet) part of the log
    pub fn rendered_with(&self, speaker: Speaker, text: &str) -> String {
        self.render()
            .chain(std::iter::once(format!("{speaker}: {text}")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
