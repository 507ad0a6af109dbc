//! HTTP route definitions and handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::error;

use gqlgw_domain::engine::{NotificationBus, PersistedQueryResolver, QueryHandler, SchemaProvider};
use gqlgw_server::handlers::batch::{BatchError, RawRequest};

use super::state::AppState;

/// Default request body size limit (1MB).
/// This prevents memory exhaustion from oversized payloads.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Creates the HTTP router with the gateway endpoints.
///
/// Applies the default body size limit (1MB) and permissive CORS; an
/// `OPTIONS` preflight is answered by the CORS layer without entering
/// the pipeline.
pub fn create_router<E, P, B>(state: AppState<E, P, B>) -> Router
where
    E: SchemaProvider + QueryHandler,
    P: PersistedQueryResolver,
    B: NotificationBus,
{
    create_router_with_body_limit(state, DEFAULT_BODY_LIMIT)
}

/// Creates the HTTP router with a custom body size limit.
pub fn create_router_with_body_limit<E, P, B>(
    state: AppState<E, P, B>,
    body_limit: usize,
) -> Router
where
    E: SchemaProvider + QueryHandler,
    P: PersistedQueryResolver,
    B: NotificationBus,
{
    let shared_state = Arc::new(state);
    Router::new()
        .route("/graphql/:schema_key", post(execute::<E, P, B>))
        .route("/health", get(health_check))
        .with_state(shared_state)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

// ============================================================
// Error Handling
// ============================================================

/// Request-level error codes.
///
/// Only request-level failures take this form; per-operation execution
/// failures are reported in-band as `errors` inside a 200 response.
pub mod error_codes {
    /// No operation could be extracted from the request (400).
    pub const MISSING_QUERY_PARAMETER: &str = "missing_query_parameter";
    /// Operation count exceeds the configured ceiling (400).
    pub const BATCH_LIMIT_EXCEEDED: &str = "batch_limit_exceeded";
    /// Schema not found or not buildable; a deployment problem, not a
    /// client one (500).
    pub const SCHEMA_NOT_FOUND: &str = "schema_not_found";
    /// Unexpected internal server error.
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a missing query parameter error (400).
    pub fn missing_query(message: impl Into<String>) -> Self {
        Self::new(error_codes::MISSING_QUERY_PARAMETER, message)
    }

    /// Creates a batch limit exceeded error (400).
    pub fn batch_limit_exceeded(message: impl Into<String>) -> Self {
        Self::new(error_codes::BATCH_LIMIT_EXCEEDED, message)
    }

    /// Creates a schema not found error (500).
    pub fn schema_not_found(message: impl Into<String>) -> Self {
        Self::new(error_codes::SCHEMA_NOT_FOUND, message)
    }

    /// Creates an internal error (500).
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::INTERNAL_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use error_codes::*;

        let status = match self.code.as_str() {
            MISSING_QUERY_PARAMETER | BATCH_LIMIT_EXCEEDED => StatusCode::BAD_REQUEST,
            SCHEMA_NOT_FOUND => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

impl From<BatchError> for ApiError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::MissingQuery => ApiError::missing_query("missing query parameter"),
            BatchError::BatchTooLarge { size, max } => ApiError::batch_limit_exceeded(format!(
                "batch size {size} exceeds maximum allowed {max}"
            )),
            BatchError::SchemaNotFound { schema } => {
                error!(%schema, "request for unknown schema");
                ApiError::schema_not_found(format!("schema '{schema}' not found"))
            }
            BatchError::SchemaBuildFailed { schema, message } => {
                // Build failures carry engine internals; log them, return
                // a sanitized message.
                error!(%schema, error = %message, "schema autobuild failed");
                ApiError::schema_not_found(format!("schema '{schema}' could not be built"))
            }
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ============================================================
// Handlers
// ============================================================

/// Basic health check - returns 200 if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Executes a single operation or an operation batch.
///
/// The response body is a bare result object when the request carried
/// exactly one operation, and a JSON array in request order otherwise.
/// Per-operation failures appear in-band; only request-level failures
/// change the status code.
async fn execute<E, P, B>(
    State(state): State<Arc<AppState<E, P, B>>>,
    Path(schema_key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<impl IntoResponse>
where
    E: SchemaProvider + QueryHandler,
    P: PersistedQueryResolver,
    B: NotificationBus,
{
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let request = RawRequest {
        content_type,
        body: &body,
    };

    let response = state.coordinator.handle(&schema_key, request).await?;
    Ok(Json(response))
}
