//! Chat and health routes

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::service::{AnswerService, ChatAnswer};

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    query: String,
}

/// Liveness response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Answering service status
#[derive(Serialize)]
pub struct ChatHealthResponse {
    pub status: &'static str,
    pub initialized: bool,
    pub message: &'static str,
}

async fn chat(
    State(service): State<Arc<dyn AnswerService>>,
    body: Bytes,
) -> (StatusCode, Json<ChatAnswer>) {
    let Ok(request) = serde_json::from_slice::<ChatRequest>(&body) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ChatAnswer::rejected("Invalid JSON in request body")),
        );
    };

    let query = request.query.trim();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ChatAnswer::rejected("Query is required")),
        );
    }

    tracing::info!(chars = query.len(), "chat query");
    match service.answer(query).await {
        Ok(answer) => (StatusCode::OK, Json(answer)),
        Err(e) => {
            tracing::error!(error = %e, "chat query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatAnswer::rejected(format!("Internal server error: {e}"))),
            )
        }
    }
}

async fn chat_health() -> Json<ChatHealthResponse> {
    Json(ChatHealthResponse {
        status: "ok",
        initialized: true,
        message: "Remote RAG service is enabled",
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /api/chat` and `GET /api/chat/health`
pub fn chat_router(service: Arc<dyn AnswerService>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/chat/health", get(chat_health))
        .with_state(service)
}

/// `GET /health`
pub fn health_router() -> Router {
    Router::new().route("/health", get(health))
}
