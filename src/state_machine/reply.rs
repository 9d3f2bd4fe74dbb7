//! Strict decoding of the completion service's structured reply
//!
//! The reply text comes from an untrusted remote service, so it is only ever
//! decoded as data. Anything other than an object with exactly `res` and
//! `flag` is rejected.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Progression signal attached to every scripted reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    /// Stay on the current objective
    Continue,
    /// Move to the next objective
    Shift,
    /// End the objective sequence
    Conclude,
}

impl Flag {
    pub fn as_str(self) -> &'static str {
        match self {
            Flag::Continue => "continue",
            Flag::Shift => "shift",
            Flag::Conclude => "conclude",
        }
    }
}

/// A successfully decoded scripted reply
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentReply {
    pub res: String,
    pub flag: Flag,
}

impl AgentReply {
    /// Synthetic reply used when the completion service fails outright
    pub fn provider_failure(message: &str) -> Self {
        Self {
            res: format!("Sorry, an error occurred: {message}"),
            flag: Flag::Conclude,
        }
    }
}

/// Reply text that does not match the `{ res, flag }` shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed reply: {reason}")]
pub struct DecodeError {
    pub reason: String,
    /// The offending text, verbatim
    pub raw: String,
}

/// Decode a raw reply.
///
/// Surrounding whitespace and a single enclosing markdown code fence are
/// tolerated; the payload itself must be exactly one JSON object.
pub fn parse_reply(raw: &str) -> Result<AgentReply, DecodeError> {
    let failed = |reason: String| DecodeError {
        reason,
        raw: raw.to_string(),
    };

    let payload = strip_code_fence(raw.trim());
    let value: Value = serde_json::from_str(payload).map_err(|e| failed(e.to_string()))?;
    // Derived struct decoding would also take `["text", "flag"]`
    if !value.is_object() {
        return Err(failed("expected a JSON object".to_string()));
    }
    AgentReply::deserialize(value).map_err(|e| failed(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(body) = text
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return text;
    };
    // First line of the fence carries the info string (e.g. `json`)
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => text,
    }
}
