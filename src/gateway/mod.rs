//! Axum-based HTTP gateway exposing the classifier at `POST /classify`.
//!
//! Transport concerns are applied as tower layers around the single route:
//! - CORS for any origin, outermost so every response carries it
//! - Request timeout
//! - Request body size limit, enforced by the JSON extractor so oversize
//!   bodies get the JSON error body
//! - Panic capture, so a handler panic becomes a JSON 500 instead of a
//!   dropped connection

use crate::classifier::{ClassificationResult, Classifier};
use crate::config::GatewayConfig;
use crate::util::truncate_with_ellipsis;
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

/// The only route.
pub const CLASSIFY_PATH: &str = "/classify";
/// Characters of input text included in the per-request log line.
pub const LOG_PREVIEW_CHARS: usize = 40;
/// How long browsers may cache a CORS preflight.
pub const CORS_MAX_AGE_SECS: u64 = 3600;

// ══════════════════════════════════════════════════════════════════════════════
// WIRE TYPES
// ══════════════════════════════════════════════════════════════════════════════

/// `POST /classify` request body. `text` stays untyped so JSON falsy values
/// (`false`, `0`, `[]`, `{}`) count as missing rather than malformed.
#[derive(Debug, Deserialize)]
pub struct ClassifyBody {
    #[serde(default)]
    pub text: Option<Value>,
}

impl ClassifyBody {
    /// The text to classify, or the error the caller should see.
    pub fn into_text(self) -> Result<String, ClassifyError> {
        match self.text {
            None => Err(ClassifyError::MissingText),
            Some(value) if is_falsy(&value) => Err(ClassifyError::MissingText),
            Some(Value::String(text)) => Ok(text),
            Some(other) => Err(ClassifyError::Internal(format!(
                "text must be a string, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Body of the 400/413/500 responses produced by the classify handler.
/// Routing (405) and timeout (408) responses come from the transport
/// layers and have empty bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors surfaced by the classify handler.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("No text provided for classification")]
    MissingText,

    #[error("Request body too large")]
    BodyTooLarge,

    #[error("Internal classification error: {0}")]
    Internal(String),
}

impl ClassifyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ClassifyError::MissingText => StatusCode::BAD_REQUEST,
            ClassifyError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ClassifyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ClassifyError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ClassifyError::BodyTooLarge
        } else {
            ClassifyError::Internal(rejection.body_text())
        }
    }
}

impl IntoResponse for ClassifyError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// ROUTER
// ══════════════════════════════════════════════════════════════════════════════

/// Shared handler state. The classifier is immutable, so requests never
/// contend on it.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
}

impl AppState {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }
}

/// Build the router with all transport layers applied.
pub fn router(state: AppState, config: &GatewayConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(CORS_MAX_AGE_SECS));

    Router::new()
        .route(CLASSIFY_PATH, post(handle_classify))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(cors)
}

/// Whether binding `host` would expose the gateway beyond this machine.
pub fn is_public_bind(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return false;
    }
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .map_or(true, |ip| !ip.is_loopback())
}

/// Bind and serve until Ctrl-C / SIGTERM.
pub async fn run_gateway(config: &GatewayConfig, classifier: Classifier) -> Result<()> {
    if is_public_bind(&config.host) && !config.allow_public_bind {
        anyhow::bail!(
            "🛑 Refusing to bind to {}: the classifier would be reachable from other hosts.\n\
             Fix: use --host 127.0.0.1 (default) or set\n\
             [gateway] allow_public_bind = true in the config file.",
            config.host
        );
    }

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    let local_addr = listener.local_addr()?;

    let app = router(AppState::new(classifier), config);

    tracing::info!("Classifier listening on http://{local_addr}{CLASSIFY_PATH}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server failed")?;
    tracing::info!("Classifier stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Shutdown signal received, draining connections");
}

// ══════════════════════════════════════════════════════════════════════════════
// AXUM HANDLERS
// ══════════════════════════════════════════════════════════════════════════════

/// POST /classify: tag and prioritize `text`.
async fn handle_classify(
    State(state): State<AppState>,
    body: Result<Json<ClassifyBody>, JsonRejection>,
) -> Result<Json<ClassificationResult>, ClassifyError> {
    let Json(body) = body.map_err(|e| {
        tracing::warn!("Classify body rejected: {e}");
        ClassifyError::from(e)
    })?;

    let text = body.into_text()?;

    let result = state.classifier.classify(&text);

    tracing::info!(
        preview = %truncate_with_ellipsis(&text, LOG_PREVIEW_CHARS),
        tags = ?result.tag_labels(),
        priority = %result.priority,
        "Classified text"
    );

    Ok(Json(result))
}

/// Turn a caught handler panic into the standard 500 error body.
fn panic_response(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    };
    tracing::error!("Classify handler panicked: {details}");
    ClassifyError::Internal(details).into_response()
}
