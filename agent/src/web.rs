//! Single-page chat UI and its JSON API.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::agent::ChatBackend;
use crate::error::AgentError;
use crate::sessions::SessionStore;

/// The embedded chat page.
const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared state for the chat routes.
#[derive(Clone)]
pub struct AppState {
    /// The agent (or a stub in tests) answering messages.
    pub backend: Arc<dyn ChatBackend>,
    /// Per-session conversation histories.
    pub sessions: SessionStore,
}

/// One chat turn from the browser.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Session to continue; omitted on the first message of a conversation.
    pub session_id: Option<Uuid>,
    /// The user's message.
    pub message: String,
}

/// The assistant's answer.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Session id to send with the next message.
    pub session_id: Uuid,
    /// Assistant text.
    pub reply: String,
}

/// Errors surfaced to the browser.
#[derive(Debug)]
pub enum ApiError {
    /// The message was empty or whitespace.
    EmptyMessage,
    /// The agent failed to produce an answer.
    Agent(AgentError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::EmptyMessage => (
                StatusCode::BAD_REQUEST,
                "Your input cannot be empty!".to_string(),
            ),
            Self::Agent(e) => {
                tracing::error!(error = %e, "chat turn failed");
                (StatusCode::BAD_GATEWAY, format!("agent error: {e}"))
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Build the chat router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/chat", post(chat))
        .with_state(state)
}

/// Serve the chat UI until the process exits.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), AgentError> {
    let app = router(state);
    tracing::info!(%addr, "chat UI listening on http://{addr}/");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::EmptyMessage);
    }

    // A fresh id per conversation keeps concurrent sessions independent.
    let session_id = request.session_id.unwrap_or_else(Uuid::new_v4);
    let history = state.sessions.history(session_id).await;
    let mut history = history.lock().await;

    let reply = state
        .backend
        .reply(&mut history, &request.message)
        .await
        .map_err(ApiError::Agent)?;

    Ok(Json(ChatResponse { session_id, reply }))
}
