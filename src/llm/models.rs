//! Centralized model definitions
//!
//! Every provider here speaks the `OpenAI` chat-completions protocol, so a
//! model is just a provider plus the name the provider knows it by.

/// LLM provider enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Groq,
    OpenAI,
}

impl Provider {
    /// Get the display name for this provider
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Groq => "Groq",
            Provider::OpenAI => "OpenAI",
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }

    /// Chat-completions endpoint, either direct or through a gateway
    pub fn endpoint(self, gateway: Option<&str>) -> String {
        match (gateway, self) {
            (Some(gw), Provider::Groq) => {
                format!("{}/groq/openai/v1/chat/completions", gw.trim_end_matches('/'))
            }
            (Some(gw), Provider::OpenAI) => {
                format!("{}/openai/v1/chat/completions", gw.trim_end_matches('/'))
            }
            (None, Provider::Groq) => "https://api.groq.com/openai/v1/chat/completions".to_string(),
            (None, Provider::OpenAI) => "https://api.openai.com/v1/chat/completions".to_string(),
        }
    }
}

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// User-facing model ID
    pub id: &'static str,
    pub provider: Provider,
    /// Name sent in the request body
    pub api_name: &'static str,
    pub description: &'static str,
}

/// Get all available model definitions
pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "llama3-70b-8192",
            provider: Provider::Groq,
            api_name: "llama3-70b-8192",
            description: "Llama 3 70B on Groq (reference model)",
        },
        ModelDef {
            id: "llama-3.3-70b-versatile",
            provider: Provider::Groq,
            api_name: "llama-3.3-70b-versatile",
            description: "Llama 3.3 70B on Groq",
        },
        ModelDef {
            id: "llama-3.1-8b-instant",
            provider: Provider::Groq,
            api_name: "llama-3.1-8b-instant",
            description: "Llama 3.1 8B on Groq (fast, cheap)",
        },
        ModelDef {
            id: "gpt-4o",
            provider: Provider::OpenAI,
            api_name: "gpt-4o",
            description: "GPT-4o",
        },
        ModelDef {
            id: "gpt-4o-mini",
            provider: Provider::OpenAI,
            api_name: "gpt-4o-mini",
            description: "GPT-4o mini (fast, cheap)",
        },
    ]
}
