//! Turn executor
//!
//! Feeds events through the pure transition function and performs the
//! resulting effects against a session.

use super::session::Session;
use super::traits::CompletionClient;
use crate::config::AgentConfig;
use crate::llm::{LlmError, LlmRequest};
use crate::prompt::build_prompt;
use crate::state_machine::{
    transition, ConvState, Effect, Event, Phase, TransitionError, TurnMode, TurnResult,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Parameters applied to every completion request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionSettings {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl From<&AgentConfig> for CompletionSettings {
    fn from(config: &AgentConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: config.request_timeout,
        }
    }
}

/// Runs turns against sessions using a completion client
pub struct ConversationRuntime {
    client: Arc<dyn CompletionClient>,
    settings: CompletionSettings,
}

impl ConversationRuntime {
    pub fn new(client: Arc<dyn CompletionClient>, settings: CompletionSettings) -> Self {
        Self { client, settings }
    }

    pub fn model_id(&self) -> &str {
        self.client.model_id()
    }

    /// Process one user message to completion.
    ///
    /// The caller must hold the session exclusively for the whole call.
    pub async fn run_turn(
        &self,
        session: &mut Session,
        text: String,
        mode: TurnMode,
    ) -> Result<TurnResult, TransitionError> {
        // Only an interrupted turn can leave a session waiting while unlocked
        if let Phase::AwaitingCompletion { .. } = session.state.phase {
            tracing::warn!(
                session_id = %session.context.session_id,
                "Resetting session left awaiting a completion"
            );
            session.state = ConvState::idle(session.state.cursor);
        }

        let mut events_to_process = vec![Event::UserMessage { text, mode }];
        let mut outcome = None;

        while let Some(event) = events_to_process.pop() {
            let result = transition(&session.state, &session.context, event)?;
            session.state = result.new_state;

            for effect in result.effects {
                match effect {
                    Effect::AppendUtterance { speaker, text } => session.log.append(speaker, text),
                    Effect::RequestCompletion { mode } => {
                        events_to_process.push(self.request_completion(session, mode).await);
                    }
                    Effect::Respond(result) => outcome = Some(result),
                }
            }
        }

        let result = outcome.ok_or_else(|| {
            TransitionError::InvalidTransition("turn finished without a result".to_string())
        })?;
        log_outcome(session, &result);
        Ok(result)
    }

    async fn request_completion(&self, session: &Session, mode: TurnMode) -> Event {
        let prompt = build_prompt(&session.context, &session.state, &session.log, mode);
        let request = LlmRequest::new(prompt)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);

        let error = match timeout(self.settings.timeout, self.client.complete(&request)).await {
            Ok(Ok(response)) => return Event::CompletionReceived { raw: response.text },
            Ok(Err(e)) => e,
            Err(_) => LlmError::timeout(self.settings.timeout),
        };

        tracing::warn!(
            session_id = %session.context.session_id,
            error = %error.message,
            kind = ?error.kind,
            "Completion failed"
        );
        Event::CompletionFailed {
            message: error.message,
        }
    }
}

fn log_outcome(session: &Session, result: &TurnResult) {
    let session_id = &session.context.session_id;
    let cursor = session.state.cursor.position();
    match result {
        TurnResult::Progress { flag, objective, .. } => {
            tracing::info!(
                session_id = %session_id,
                cursor,
                flag = flag.as_str(),
                objective = %objective,
                "Scripted turn completed"
            );
        }
        TurnResult::DecodeFailed { raw, .. } => {
            tracing::warn!(session_id = %session_id, cursor, raw = %raw, "Failed to decode reply");
        }
        TurnResult::Freeform { .. } | TurnResult::ProviderFailed { .. } => {
            tracing::info!(session_id = %session_id, cursor, "Freeform turn completed");
        }
    }
}
