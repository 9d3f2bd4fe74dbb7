//! Per-turn results returned to callers

use super::reply::Flag;
use serde::Serialize;

pub const TERMINAL_RESPONSE: &str = "All objectives completed.";
pub const TERMINAL_OBJECTIVE: &str = "None";
pub const DECODE_ERROR: &str = "Failed to parse LLM response";
pub const FREEFORM_OBJECTIVE: &str = "Goal-Oriented (Freeform)";
pub const FREEFORM_MODE: &str = "basic";
pub const PROVIDER_ERROR_RESPONSE: &str = "Error from provider";

/// Outcome of one turn. Serialized without a tag so each variant keeps its
/// own wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TurnResult {
    /// Scripted reply applied to the objective cursor
    Progress {
        response: String,
        objective: String,
        flag: Flag,
    },
    /// Reply text did not decode; the user utterance is logged, the cursor is unchanged
    DecodeFailed { error: String, raw: String },
    /// Plain-text freeform reply
    Freeform {
        response: String,
        objective: String,
        mode: String,
    },
    /// Freeform turn whose completion call failed
    ProviderFailed { response: String, raw: String },
}

impl TurnResult {
    /// Fixed result for turns after the objective sequence has ended
    pub fn terminal() -> Self {
        TurnResult::Progress {
            response: TERMINAL_RESPONSE.to_string(),
            objective: TERMINAL_OBJECTIVE.to_string(),
            flag: Flag::Conclude,
        }
    }

    pub fn decode_failed(raw: impl Into<String>) -> Self {
        TurnResult::DecodeFailed {
            error: DECODE_ERROR.to_string(),
            raw: raw.into(),
        }
    }

    pub fn freeform(response: impl Into<String>) -> Self {
        TurnResult::Freeform {
            response: response.into(),
            objective: FREEFORM_OBJECTIVE.to_string(),
            mode: FREEFORM_MODE.to_string(),
        }
    }

    pub fn provider_failed(raw: impl Into<String>) -> Self {
        TurnResult::ProviderFailed {
            response: PROVIDER_ERROR_RESPONSE.to_string(),
            raw: raw.into(),
        }
    }

    pub fn flag(&self) -> Option<Flag> {
        match self {
            TurnResult::Progress { flag, .. } => Some(*flag),
            _ => None,
        }
    }
}
