//! HTTP routes for the chat relay.

use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use parley_conversation::{AssistantReply, ConversationService, HealthStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Acknowledgement text returned by `POST /clear`.
pub const CLEARED_MESSAGE: &str = "Conversation cleared successfully";

/// Shared application state.
pub struct AppState {
    /// The single conversation served by this process.
    pub conversation: ConversationService,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(conversation: ConversationService) -> Self {
        Self { conversation }
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

/// Body returned by `POST /clear`.
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: &'static str,
}

/// Builds the application router.
///
/// Cross-origin requests are accepted from any origin.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/clear", post(clear))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Submits a user message and returns the assistant's reply.
///
/// The body is decoded by hand so that malformed JSON gets the same
/// `{"error": ...}` shape as every other failure. An empty body counts as
/// a missing message.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AssistantReply>, ApiError> {
    let request = if body.is_empty() {
        ChatRequest { message: None }
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::MalformedBody {
            reason: e.to_string(),
        })?
    };

    let message = request.message.unwrap_or_default();
    let reply = state.conversation.submit(&message).await?;
    Ok(Json(reply))
}

/// Empties the conversation history.
pub async fn clear(State(state): State<Arc<AppState>>) -> Json<ClearResponse> {
    state.conversation.clear().await;
    Json(ClearResponse {
        message: CLEARED_MESSAGE,
    })
}

/// Reports history length and window size.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(state.conversation.health().await)
}
