//! Completion service layer
//!
//! The agent only ever sends one rendered prompt and reads back one block of
//! text, so a provider is reduced to a single `complete` call. Providers are
//! built by the [`ModelRegistry`] from environment configuration.

mod error;
mod models;
mod openai;
mod registry;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use models::{all_models, ModelDef, Provider};
pub use openai::OpenAIService;
pub use registry::{LlmConfig, ModelRegistry};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// A model that turns one prompt into one reply
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Send `request.prompt` as a single user message and return the reply text
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    fn model_id(&self) -> &str;
}

/// Wraps a provider and records each completion call
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let started = Instant::now();
        let result = self.inner.complete(request).await;
        let elapsed_ms = started.elapsed().as_millis();
        let prompt_chars = request.prompt.chars().count();

        match &result {
            Ok(response) => tracing::info!(
                model = %self.model_id,
                elapsed_ms = %elapsed_ms,
                prompt_chars,
                reply_chars = response.text.chars().count(),
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "Completion returned"
            ),
            Err(e) => tracing::error!(
                model = %self.model_id,
                elapsed_ms = %elapsed_ms,
                prompt_chars,
                error = %e.message,
                kind = ?e.kind,
                transport = e.kind.is_transport(),
                "Completion failed"
            ),
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
