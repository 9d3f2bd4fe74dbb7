//! HTTP request handlers

use super::types::{
    ChatRequest, CreateSessionResponse, ErrorResponse, ModelsResponse, ScriptResponse,
    SuccessResponse,
};
use super::AppState;
use crate::runtime::{SessionError, SessionSnapshot};
use crate::state_machine::{TransitionError, TurnMode, TurnResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session lifecycle
        .route("/api/sessions/new", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/delete", post(delete_session))
        // Turns
        .route("/api/sessions/:id/chat", post(scripted_chat))
        .route("/api/sessions/:id/basic-chat", post(basic_chat))
        // Script and model info
        .route("/api/script", get(get_script))
        .route("/api/models", get(list_models))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<CreateSessionResponse> {
    let session_id = state.sessions.create().await;
    Json(CreateSessionResponse { session_id })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state
        .sessions
        .snapshot(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {id}")))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.sessions.remove(&id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(AppError::NotFound(format!("Session not found: {id}")))
    }
}

// ============================================================
// Turns
// ============================================================

async fn scripted_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<TurnResult>, AppError> {
    let result = state
        .sessions
        .handle_turn(&id, req.message, TurnMode::Scripted)
        .await?;
    Ok(Json(result))
}

async fn basic_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<TurnResult>, AppError> {
    let result = state
        .sessions
        .handle_turn(&id, req.message, TurnMode::Freeform)
        .await?;
    Ok(Json(result))
}

// ============================================================
// Script and Models
// ============================================================

async fn get_script(State(state): State<AppState>) -> Json<ScriptResponse> {
    let script = state.sessions.script();
    Json(ScriptResponse {
        goal: script.goal().to_string(),
        objectives: script.objectives().to_vec(),
    })
}

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.llm_registry.available_model_info(),
        default: state.llm_registry.default_model_id().to_string(),
    })
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("objective-agent ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidId(_) => AppError::BadRequest(err.to_string()),
            SessionError::Transition(TransitionError::TurnInProgress) => {
                AppError::Conflict(err.to_string())
            }
            SessionError::Transition(_) | SessionError::TaskFailed(_) => {
                tracing::error!(error = %err, "Turn failed");
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
