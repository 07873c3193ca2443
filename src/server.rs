//! HTTP front door for the chat service.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/chat` | Ask a question; returns HTML answer + sources |
//! | `GET`  | `/api/health` | Health check |
//! | `GET`  | `/files/{name}` | Raw PDF from the data directory |
//!
//! # Error Contract
//!
//! ```json
//! { "error": "Question is required" }
//! ```
//!
//! `400` for a missing/empty question or malformed body, `500` for any
//! failure inside the chain (the message is passed through), `404` for
//! unknown files.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser front end
//! served from another port can call the API.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::chain::ConversationalChain;
use crate::config::{CitationStyle, Config};
use crate::format::{bullet_prompt, format_answer, sources_for};
use crate::models::SourceRef;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    chain: Arc<ConversationalChain>,
    citation_style: CitationStyle,
}

/// Builds the router. Split out from [`run_server`] so tests can drive it
/// without binding a socket.
pub fn router(
    chain: Arc<ConversationalChain>,
    data_dir: &Path,
    citation_style: CitationStyle,
) -> Router {
    let state = AppState {
        chain,
        citation_style,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(handle_chat))
        .route("/api/health", get(handle_health))
        .nest_service("/files", ServeDir::new(data_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Binds to `[server].bind` and serves until the process is terminated.
pub async fn run_server(config: &Config, chain: Arc<ConversationalChain>) -> anyhow::Result<()> {
    let app = router(chain, &config.data.dir, config.server.citation_style);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "chat server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: message.into(),
    }
}

// ============ GET /api/health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// ============ POST /api/chat ============

#[derive(Deserialize, Default)]
struct ChatRequest {
    #[serde(default)]
    question: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
    sources: Vec<SourceRef>,
}

/// Handler for `POST /api/chat`.
///
/// The body is parsed by hand rather than with the `Json` extractor so that
/// every rejection keeps the `{ "error": ... }` shape.
async fn handle_chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, AppError> {
    let req: ChatRequest = if body.is_empty() {
        ChatRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| bad_request(format!("Invalid JSON body: {}", e)))?
    };

    let question = req.question.unwrap_or_default();
    let question = question.trim();
    if question.is_empty() {
        return Err(bad_request("Question is required"));
    }

    let result = state
        .chain
        .ask(&bullet_prompt(question))
        .await
        .map_err(|e| {
            let message = format!("{:#}", e);
            tracing::error!(error = %message, "chat request failed");
            internal(message)
        })?;

    let sources = sources_for(&result.source_chunks);
    let response = format_answer(&result.answer, &sources, state.citation_style);

    Ok(Json(ChatResponse { response, sources }))
}
