//! Conversation state types

use super::reply::Flag;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Objective label reported once the cursor has reached the end
pub const COMPLETED_LABEL: &str = "Completed";

// ============================================================================
// Script - goal and objectives
// ============================================================================

/// Problems with a goal/objective script
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("goal must not be blank")]
    BlankGoal,
    #[error("objective list must not be empty")]
    NoObjectives,
    #[error("objective {index} is blank")]
    BlankObjective { index: usize },
}

/// Fixed, ordered, non-empty list of objectives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveList(Arc<[String]>);

impl ObjectiveList {
    pub fn new(objectives: Vec<String>) -> Result<Self, ScriptError> {
        if objectives.is_empty() {
            return Err(ScriptError::NoObjectives);
        }
        if let Some(index) = objectives.iter().position(|o| o.trim().is_empty()) {
            return Err(ScriptError::BlankObjective { index });
        }
        Ok(Self(objectives.into()))
    }

    /// Number of objectives (`N`); also the terminal cursor position
    pub fn count(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.to_vec()
    }
}

/// The overall goal plus the objectives pursued to reach it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    goal: String,
    objectives: ObjectiveList,
}

impl Script {
    pub fn new(goal: impl Into<String>, objectives: ObjectiveList) -> Result<Self, ScriptError> {
        let goal = goal.into();
        if goal.trim().is_empty() {
            return Err(ScriptError::BlankGoal);
        }
        Ok(Self { goal, objectives })
    }

    /// The car-service discount negotiation used when no script is configured
    pub fn car_service_discount() -> Self {
        let objectives = [
            "Introduce yourself and state your intent",
            "Gather service details",
            "Ask about pricing",
            "Ask for discounts",
            "End the conversation politely",
        ];
        Self {
            goal: "Get a discount on a car service by calling a representative.".to_string(),
            objectives: ObjectiveList(objectives.iter().map(ToString::to_string).collect()),
        }
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn objectives(&self) -> &ObjectiveList {
        &self.objectives
    }
}

// ============================================================================
// Objective Cursor
// ============================================================================

/// Position in the objective list.
///
/// Always within `0..=N`; `N` means every objective is done. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct ObjectiveCursor(usize);

impl ObjectiveCursor {
    pub fn start() -> Self {
        Self(0)
    }

    pub fn position(self) -> usize {
        self.0
    }

    pub fn is_complete(self, objectives: &ObjectiveList) -> bool {
        self.0 >= objectives.count()
    }

    /// Cursor after applying a progression flag
    pub fn advance(self, flag: Flag, objectives: &ObjectiveList) -> Self {
        let end = objectives.count();
        match flag {
            Flag::Continue => self,
            Flag::Shift => Self((self.0 + 1).min(end)),
            Flag::Conclude => Self(end),
        }
    }

    pub fn active_objective(self, objectives: &ObjectiveList) -> Option<&str> {
        objectives.get(self.0)
    }

    /// Active objective, or [`COMPLETED_LABEL`] past the end
    pub fn label(self, objectives: &ObjectiveList) -> &str {
        self.active_objective(objectives).unwrap_or(COMPLETED_LABEL)
    }
}

// ============================================================================
// Conversation State
// ============================================================================

/// How a turn's reply is requested and interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnMode {
    /// Objective-driven turn with a structured `{ res, flag }` reply
    Scripted,
    /// Goal-only dialogue; the reply is plain text and the cursor is untouched
    Freeform,
}

/// What the session is doing right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Phase {
    /// Ready for a user message
    #[default]
    Idle,
    /// Waiting on the completion service. The user message is held here and
    /// only reaches the log once the turn resolves.
    AwaitingCompletion { mode: TurnMode, pending: String },
}

/// Conversation state driven by [`transition`](super::transition)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ConvState {
    pub cursor: ObjectiveCursor,
    pub phase: Phase,
}

impl ConvState {
    pub fn idle(cursor: ObjectiveCursor) -> Self {
        Self {
            cursor,
            phase: Phase::Idle,
        }
    }

    pub fn awaiting(cursor: ObjectiveCursor, mode: TurnMode, pending: impl Into<String>) -> Self {
        Self {
            cursor,
            phase: Phase::AwaitingCompletion {
                mode,
                pending: pending.into(),
            },
        }
    }

    /// User message of the turn in flight, if any
    pub fn pending_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Idle => None,
            Phase::AwaitingCompletion { pending, .. } => Some(pending),
        }
    }
}

/// Context for a conversation (immutable configuration)
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub session_id: String,
    pub script: Arc<Script>,
}

impl ConvContext {
    pub fn new(session_id: impl Into<String>, script: Arc<Script>) -> Self {
        Self {
            session_id: session_id.into(),
            script,
        }
    }

    pub fn objectives(&self) -> &ObjectiveList {
        self.script.objectives()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objectives(n: usize) -> ObjectiveList {
        ObjectiveList::new((1..=n).map(|i| format!("objective {i}")).collect()).unwrap()
    }

    #[test]
    fn test_objective_list_rejects_empty() {
        assert_eq!(ObjectiveList::new(vec![]), Err(ScriptError::NoObjectives));
        assert_eq!(
            ObjectiveList::new(vec!["a".into(), "  ".into()]),
            Err(ScriptError::BlankObjective { index: 1 })
        );
    }

    #[test]
    fn test_script_rejects_blank_goal() {
        assert_eq!(
            Script::new("   ", objectives(1)),
            Err(ScriptError::BlankGoal)
        );
    }

    #[test]
    fn test_default_script() {
        let script = Script::car_service_discount();
        assert_eq!(script.objectives().count(), 5);
        assert_eq!(
            script.objectives().get(0),
            Some("Introduce yourself and state your intent")
        );
        assert_eq!(
            script.objectives().get(4),
            Some("End the conversation politely")
        );
    }

    #[test]
    fn test_cursor_advance() {
        let list = objectives(3);
        let start = ObjectiveCursor::start();

        assert_eq!(start.advance(Flag::Continue, &list), start);
        assert_eq!(start.advance(Flag::Shift, &list).position(), 1);
        assert_eq!(start.advance(Flag::Conclude, &list).position(), 3);

        let last = ObjectiveCursor(2);
        assert_eq!(last.advance(Flag::Shift, &list).position(), 3);
        assert!(last.advance(Flag::Shift, &list).is_complete(&list));

        let done = ObjectiveCursor(3);
        assert_eq!(done.advance(Flag::Shift, &list), done);
    }

    #[test]
    fn test_cursor_labels() {
        let list = objectives(2);
        assert_eq!(ObjectiveCursor::start().label(&list), "objective 1");
        assert_eq!(ObjectiveCursor(1).label(&list), "objective 2");
        assert_eq!(ObjectiveCursor(2).label(&list), COMPLETED_LABEL);
        assert_eq!(ObjectiveCursor(2).active_objective(&list), None);
    }

    #[test]
    fn test_state_serialization() {
        let state = ConvState::awaiting(ObjectiveCursor(1), TurnMode::Scripted, "hi");
        assert_eq!(state.pending_message(), Some("hi"));
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "cursor": 1,
                "phase": { "type": "awaiting_completion", "mode": "scripted", "pending": "hi" }
            })
        );
        assert_eq!(ConvState::default().pending_message(), None);
    }
}
