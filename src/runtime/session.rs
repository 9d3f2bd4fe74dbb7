//! Per-session conversation state

use crate::state_machine::{ConvContext, ConvState, ConversationLog, Utterance};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Everything one conversation owns: its cursor/phase and its log
#[derive(Debug)]
pub struct Session {
    pub context: ConvContext,
    pub state: ConvState,
    pub log: ConversationLog,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    pub fn new(context: ConvContext, now: DateTime<Utc>) -> Self {
        Self {
            context,
            state: ConvState::default(),
            log: ConversationLog::new(),
            created_at: now,
            last_active: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active = now;
    }

    /// Whether the session has been idle for longer than `ttl` at `now`
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        (now - self.last_active)
            .to_std()
            .is_ok_and(|idle| idle > ttl)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let objectives = self.context.objectives();
        SessionSnapshot {
            session_id: self.context.session_id.clone(),
            cursor: self.state.cursor.position(),
            objective_count: objectives.count(),
            active_objective: self.state.cursor.label(objectives).to_string(),
            completed: self.state.cursor.is_complete(objectives),
            transcript: self.log.utterances().to_vec(),
            created_at: self.created_at,
            last_active: self.last_active,
        }
    }
}

/// Read-only view of a session for API responses
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub cursor: usize,
    pub objective_count: usize,
    pub active_objective: String,
    pub completed: bool,
    pub transcript: Vec<Utterance>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}
