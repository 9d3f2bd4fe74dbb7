//! Model registry for managing available LLM providers

use super::models::ModelDef;
use super::{all_models, LlmService, LoggingService, OpenAIService, Provider};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Model used when nothing else is configured
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

/// Client-side HTTP timeout when none is configured
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for LLM providers
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// OpenAI-compatible gateway base URL; the gateway handles authentication
    pub gateway: Option<String>,
    /// Default model ID
    pub default_model: Option<String>,
    pub request_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            openai_api_key: None,
            gateway: None,
            default_model: None,
            request_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            groq_api_key: lookup(Provider::Groq.api_key_env_var()),
            openai_api_key: lookup(Provider::OpenAI.api_key_env_var()),
            gateway: lookup("LLM_GATEWAY"),
            default_model: lookup("DEFAULT_MODEL"),
            request_timeout: lookup("AGENT_REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map_or(DEFAULT_HTTP_TIMEOUT, Duration::from_secs),
        }
    }
}

/// Registry of available LLM models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    default_model: String,
}

impl ModelRegistry {
    /// Create an empty registry for testing purposes
    #[cfg(test)]
    pub fn new_empty() -> Self {
        Self {
            services: HashMap::new(),
            default_model: "test-model".to_string(),
        }
    }

    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();

        for model_def in all_models() {
            if let Some(service) = Self::try_create_model(model_def, config) {
                services.insert(model_def.id.to_string(), service);
            }
        }

        let default_model = config
            .default_model
            .clone()
            .or_else(|| {
                if services.contains_key(DEFAULT_MODEL) {
                    Some(DEFAULT_MODEL.to_string())
                } else {
                    // Fall back to first available model
                    let mut ids: Vec<_> = services.keys().cloned().collect();
                    ids.sort();
                    ids.into_iter().next()
                }
            })
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Self {
            services,
            default_model,
        }
    }

    /// Try to create a model service, validating prerequisites
    fn try_create_model(model_def: &ModelDef, config: &LlmConfig) -> Option<Arc<dyn LlmService>> {
        // In gateway mode the gateway handles the actual authentication
        let api_key = if config.gateway.is_some() {
            "implicit".to_string()
        } else {
            match model_def.provider {
                Provider::Groq => config.groq_api_key.as_ref()?,
                Provider::OpenAI => config.openai_api_key.as_ref()?,
            }
            .clone()
        };

        if config.gateway.is_none() && api_key.is_empty() {
            return None;
        }

        match OpenAIService::new(
            api_key,
            model_def,
            config.gateway.as_deref(),
            config.request_timeout,
        ) {
            Ok(service) => Some(Arc::new(LoggingService::new(Arc::new(service)))),
            Err(e) => {
                tracing::warn!(model = model_def.id, error = %e, "Skipping model");
                None
            }
        }
    }

    /// Get a model by ID
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    /// Get the default model
    pub fn default(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.default_model)
    }

    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    /// Get detailed information about available models
    pub fn available_model_info(&self) -> Vec<crate::api::ModelInfo> {
        all_models()
            .iter()
            .filter(|def| self.services.contains_key(def.id))
            .map(|def| crate::api::ModelInfo {
                id: def.id.to_string(),
                provider: def.provider.display_name().to_string(),
                description: def.description.to_string(),
            })
            .collect()
    }

    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }
}
