//! HTTP server for the designer chat API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Liveness probe (no `Origin` required) |
//! | `POST` | `/humphrey/chat` | Merge an instruction into a form configuration |
//!
//! `POST /humphrey/chat` takes `{"prompt": "...", "formId": "..."}` and
//! answers `200` with the model's raw output encoded as a JSON string. The
//! output is expected to be a JSON object with `response` and `form`
//! fields, but it is not checked here.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "prompt must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404, used for unknown
//! routes and rejected origins), `generation_error` (500).
//!
//! # Layering
//!
//! The origin gate ([`crate::origin::enforce_origin`]) is the outermost
//! layer, then CORS, then the routes.

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::chat::{ChatPipeline, ChatRequest};
use crate::config::Config;
use crate::error::GenerationError;
use crate::generation::create_generator;
use crate::origin::{enforce_origin, OriginGate};
use crate::store::{FormStore, SqliteFormStore};

pub const HEALTH_PATH: &str = "/health";
pub const CHAT_PATH: &str = "/humphrey/chat";

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: ChatPipeline,
}

impl AppState {
    pub fn new(pipeline: ChatPipeline) -> Self {
        Self { pipeline }
    }
}

/// Assemble the router: routes, CORS, and the origin gate outermost.
pub fn build_router(state: AppState, gate: Arc<OriginGate>) -> Router {
    let cors = gate.cors_layer();

    Router::new()
        .route(HEALTH_PATH, get(handle_health))
        .route(CHAT_PATH, post(handle_chat))
        .fallback(handle_not_found)
        .layer(cors)
        .layer(from_fn_with_state(gate, enforce_origin))
        .with_state(state)
}

/// Starts the HTTP server.
///
/// Opens and provisions the form store first; a provisioning failure aborts
/// startup. Then builds the generator and origin gate from configuration,
/// binds to `[server].bind` and serves until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store = SqliteFormStore::open(&config.store).await?;
    store
        .ensure_ready()
        .await
        .context("form store provisioning failed")?;
    tracing::info!(
        path = %config.store.path.display(),
        collection = store.collection(),
        "form store ready"
    );

    let generator = create_generator(&config.generation)?;
    tracing::info!(model = generator.model_name(), "generation provider ready");

    let pipeline = ChatPipeline::new(Arc::new(store), Arc::from(generator));
    let gate = Arc::new(OriginGate::new(config.server.allowed_origins.clone()));
    let app = build_router(AppState::new(pipeline), gate);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!(bind = %config.server.bind, "designer chat listening");

    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and human-readable message.
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Constructs a 404 Not Found error.
pub(crate) fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

impl From<GenerationError> for AppError {
    fn from(e: GenerationError) -> Self {
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "generation_error".to_string(),
            message: e.to_string(),
        }
    }
}

/// Unknown routes answer with the same body as a rejected origin.
async fn handle_not_found() -> AppError {
    not_found("Not Found")
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    message: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /humphrey/chat ============

/// Handler for `POST /humphrey/chat`.
///
/// Returns `400` for a malformed body or empty fields, `500` when the
/// generator fails. Store problems never surface here.
async fn handle_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<String>, AppError> {
    let Json(request) = body.map_err(|e| bad_request(e.body_text()))?;
    request.validate().map_err(bad_request)?;

    let output = state.pipeline.handle(&request).await?;
    Ok(Json(output))
}
