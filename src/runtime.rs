//! Runtime for executing conversations
//!
//! Owns the live sessions and serializes turns per session. Different
//! sessions proceed concurrently.

mod executor;
mod session;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{CompletionSettings, ConversationRuntime};
pub use session::SessionSnapshot;
pub use traits::*;

use session::Session;

use crate::state_machine::{ConvContext, Script, TransitionError, TurnMode, TurnResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

const MAX_SESSION_ID_LEN: usize = 128;

type SessionHandle = Arc<Mutex<Session>>;

/// Errors surfaced by session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session id: {0:?}")]
    InvalidId(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("turn task failed: {0}")]
    TaskFailed(String),
}

/// Manager for all live sessions
pub struct SessionManager {
    script: Arc<Script>,
    runtime: Arc<ConversationRuntime>,
    sessions: RwLock<HashMap<String, SessionHandle>>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(script: Arc<Script>, runtime: ConversationRuntime, ttl: Duration) -> Self {
        Self {
            script,
            runtime: Arc::new(runtime),
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn script(&self) -> &Arc<Script> {
        &self.script
    }

    pub fn model_id(&self) -> &str {
        self.runtime.model_id()
    }

    /// Start a new session under a fresh id
    pub async fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Session::new(ConvContext::new(id.clone(), self.script.clone()), Utc::now());
        self.sessions
            .write()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(session)));
        tracing::info!(session_id = %id, "Created session");
        id
    }

    async fn get_or_create(&self, id: &str) -> Result<SessionHandle, SessionError> {
        validate_session_id(id)?;

        if let Some(handle) = self.sessions.read().await.get(id) {
            return Ok(handle.clone());
        }

        let mut sessions = self.sessions.write().await;
        let handle = sessions.entry(id.to_string()).or_insert_with(|| {
            tracing::info!(session_id = %id, "Created session on first message");
            let context = ConvContext::new(id, self.script.clone());
            Arc::new(Mutex::new(Session::new(context, Utc::now())))
        });
        Ok(handle.clone())
    }

    /// Run one turn on the session named `id`, creating it if needed.
    ///
    /// Turns on the same session run one after another in arrival order.
    /// The turn runs on its own task so a dropped caller cannot leave the
    /// session half-updated.
    pub async fn handle_turn(
        &self,
        id: &str,
        text: String,
        mode: TurnMode,
    ) -> Result<TurnResult, SessionError> {
        let handle = self.get_or_create(id).await?;
        let runtime = self.runtime.clone();

        let task = tokio::spawn(async move {
            let mut session = handle.lock_owned().await;
            let result = runtime.run_turn(&mut session, text, mode).await;
            session.touch(Utc::now());
            result
        });

        task.await
            .map_err(|e| SessionError::TaskFailed(e.to_string()))?
            .map_err(SessionError::from)
    }

    pub async fn snapshot(&self, id: &str) -> Option<SessionSnapshot> {
        let handle = self.sessions.read().await.get(id).cloned()?;
        let session = handle.lock().await;
        Some(session.snapshot())
    }

    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Removed session");
        }
        removed
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for longer than the TTL. Sessions that are in
    /// use are kept.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| {
            // Another holder means a turn or snapshot is in flight
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            match handle.try_lock() {
                Ok(session) => !session.is_expired(now, self.ttl),
                Err(_) => true,
            }
        });
        before - sessions.len()
    }

    /// Periodically sweep expired sessions until the process exits
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let interval = interval.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = manager.sweep_expired(Utc::now()).await;
                if removed > 0 {
                    tracing::info!(removed, "Swept expired sessions");
                }
            }
        })
    }
}

fn validate_session_id(id: &str) -> Result<(), SessionError> {
    let valid = !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SessionError::InvalidId(id.to_string()))
    }
}
