//! Thin HTTP surface over the chat service.
//!
//! Transport only: DTOs in, one [`ChatService`] call, DTOs out. All
//! conversation semantics live in [`crate::chat`]; error payloads carry only
//! the user-safe message, with the specific failure kind logged here.

use crate::chat::ChatService;
use crate::config::ServerConfig;
use crate::error::{ChatError, Result};
use crate::generator::Generator;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info};

/// Chat request payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
    /// Token from a previous response; omit to start a new conversation.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Chat response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated reply.
    pub reply: String,
    /// Token to send with the next turn.
    pub session_id: String,
}

/// Health probe payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving.
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Error payload returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// User-safe description of what went wrong.
    pub error: String,
}

/// Build the service router.
pub fn router<G: Generator + 'static>(
    service: Arc<ChatService<G>>,
    server: &ServerConfig,
) -> Router {
    Router::new()
        .route("/chat", post(chat::<G>))
        .route("/health", get(health))
        .route("/", get(root))
        .layer(cors_layer(&server.allowed_origins))
        .with_state(service)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
}

async fn chat<G: Generator + 'static>(
    State(service): State<Arc<ChatService<G>>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    match service
        .converse(&request.message, request.session_id.as_deref())
        .await
    {
        Ok(outcome) => Json(ChatResponse {
            reply: outcome.reply,
            session_id: outcome.session_token,
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

fn error_response(error: &ChatError) -> Response {
    let status = if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        error!(error = %error, "chat request failed");
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(ErrorResponse {
            error: error.user_message(),
        }),
    )
        .into_response()
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "kokoro-bot",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health",
            "chat": "/chat (POST)"
        }
    }))
}

/// Bind the configured address and serve until interrupted.
///
/// # Errors
///
/// Returns an IO error if the address cannot be bound or the server fails.
pub async fn serve<G: Generator + 'static>(
    service: Arc<ChatService<G>>,
    server: &ServerConfig,
) -> Result<()> {
    let app = router(service, server);
    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeneratorError;

    #[test]
    fn test_chat_request_session_id_is_optional() {
        let request: ChatRequest = serde_json::from_str(r#"{"message": "Hello"}"#).unwrap();
        assert_eq!(request.message, "Hello");
        assert!(request.session_id.is_none());

        let request: ChatRequest =
            serde_json::from_str(r#"{"message": "Hi", "session_id": "abc"}"#).unwrap();
        assert_eq!(request.session_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_health_payload() {
        let payload = serde_json::to_value(HealthResponse::default()).unwrap();
        assert_eq!(payload, serde_json::json!({ "status": "ok" }));
    }

    #[test]
    fn test_error_status_mapping() {
        let response = error_response(&ChatError::invalid_input("message must not be empty"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = error_response(&ChatError::from(GeneratorError::Unavailable(
            "HTTP 500".to_string(),
        )));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
