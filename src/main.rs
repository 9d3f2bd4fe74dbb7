//! Objective agent - goal-driven conversational agent server
//!
//! Walks an LLM through a fixed list of objectives, one user message at a
//! time, and serves the conversation over HTTP.

mod api;
mod config;
mod llm;
mod prompt;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use config::{load_script, AgentConfig};
use llm::{LlmConfig, ModelRegistry};
use runtime::{CompletionSettings, ConversationRuntime, RegistryCompletionClient, SessionManager};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "objective_agent=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AgentConfig::from_env();
    let script = Arc::new(load_script(config.script_path.as_deref())?);
    tracing::info!(
        goal = %script.goal(),
        objectives = script.objectives().count(),
        "Loaded script"
    );

    // Initialize LLM registry
    let llm_config = LlmConfig::from_env();
    let llm_registry = Arc::new(ModelRegistry::new(&llm_config));

    if llm_registry.has_models() {
        tracing::info!(
            models = ?llm_registry.available_models(),
            default = %llm_registry.default_model_id(),
            "LLM registry initialized"
        );
    } else {
        tracing::warn!("No LLM API keys configured. Set GROQ_API_KEY or LLM_GATEWAY.");
    }

    // Sessions
    let client = RegistryCompletionClient::new(
        llm_registry.clone(),
        llm_registry.default_model_id().to_string(),
    );
    let conversation_runtime =
        ConversationRuntime::new(Arc::new(client), CompletionSettings::from(&config));
    let sessions = Arc::new(SessionManager::new(
        script,
        conversation_runtime,
        config.session_ttl,
    ));
    sessions.spawn_sweeper(config.sweep_interval);
    tracing::info!(
        model = %sessions.model_id(),
        ttl_secs = config.session_ttl.as_secs(),
        "Session manager ready"
    );

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(AppState::new(sessions, llm_registry))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Objective agent listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
