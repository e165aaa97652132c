//! Request/response endpoints. Shared error body lives here.

mod chat;
mod health;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

pub use chat::{chat, ChatRequest};
pub use health::{health, HealthResponse};

// ── Shared types ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, error: impl Into<String>, detail: Option<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            detail,
        }),
    )
}
