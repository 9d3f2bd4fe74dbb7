//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! outcome. All I/O is expressed as [`Effect`]s for the runtime to execute.

use super::reply::{parse_reply, AgentReply};
use super::state::{ObjectiveCursor, ObjectiveList, Phase, TurnMode};
use super::{ConvContext, ConvState, Effect, Event, TurnResult};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A turn is already in progress for this session")]
    TurnInProgress,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    let objectives = context.objectives();

    match (&state.phase, event) {
        // Objectives exhausted: answer without logging or calling out
        (Phase::Idle, Event::UserMessage { mode: TurnMode::Scripted, .. })
            if state.cursor.is_complete(objectives) =>
        {
            Ok(TransitionResult::new(state.clone())
                .with_effect(Effect::Respond(TurnResult::terminal())))
        }

        // The message is held until the turn resolves
        (Phase::Idle, Event::UserMessage { text, mode }) => Ok(TransitionResult::new(
            ConvState::awaiting(state.cursor, mode, text),
        )
        .with_effect(Effect::RequestCompletion { mode })),

        (Phase::AwaitingCompletion { .. }, Event::UserMessage { .. }) => {
            Err(TransitionError::TurnInProgress)
        }

        // ============================================================
        // Scripted replies
        // ============================================================
        (
            Phase::AwaitingCompletion {
                mode: TurnMode::Scripted,
                pending,
            },
            Event::CompletionReceived { raw },
        ) => match parse_reply(&raw) {
            Ok(reply) => Ok(apply_reply(state.cursor, objectives, pending, reply)),
            // The user message stays logged; no agent line and no cursor move
            Err(e) => Ok(TransitionResult::new(ConvState::idle(state.cursor))
                .with_effect(Effect::append_user(pending.clone()))
                .with_effect(Effect::Respond(TurnResult::decode_failed(e.raw)))),
        },

        // Provider failures end the objective sequence with an apology
        (
            Phase::AwaitingCompletion {
                mode: TurnMode::Scripted,
                pending,
            },
            Event::CompletionFailed { message },
        ) => Ok(apply_reply(
            state.cursor,
            objectives,
            pending,
            AgentReply::provider_failure(&message),
        )),

        // ============================================================
        // Freeform replies
        // ============================================================
        (
            Phase::AwaitingCompletion {
                mode: TurnMode::Freeform,
                pending,
            },
            Event::CompletionReceived { raw },
        ) => Ok(TransitionResult::new(ConvState::idle(state.cursor))
            .with_effect(Effect::append_user(pending.clone()))
            .with_effect(Effect::append_agent(raw.clone()))
            .with_effect(Effect::Respond(TurnResult::freeform(raw)))),

        (
            Phase::AwaitingCompletion {
                mode: TurnMode::Freeform,
                pending,
            },
            Event::CompletionFailed { message },
        ) => Ok(TransitionResult::new(ConvState::idle(state.cursor))
            .with_effect(Effect::append_user(pending.clone()))
            .with_effect(Effect::Respond(TurnResult::provider_failed(message)))),

        (Phase::Idle, event) => Err(TransitionError::InvalidTransition(format!(
            "{} while idle",
            event.name()
        ))),
    }
}

/// Log the user message and the agent's reply, then move the cursor
/// according to the reply's flag
fn apply_reply(
    cursor: ObjectiveCursor,
    objectives: &ObjectiveList,
    user_text: &str,
    reply: AgentReply,
) -> TransitionResult {
    let next = cursor.advance(reply.flag, objectives);
    let objective = next.label(objectives).to_string();

    TransitionResult::new(ConvState::idle(next))
        .with_effect(Effect::append_user(user_text))
        .with_effect(Effect::append_agent(reply.res.clone()))
        .with_effect(Effect::Respond(TurnResult::Progress {
            response: reply.res,
            objective,
            flag: reply.flag,
        }))
}
