//! `POST /chat` (and its `/api/chat` alias).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use persona_agent::ChatOutcome;
use serde::Deserialize;
use tracing::{error, info};

use super::{api_error, ApiError};
use crate::state::AppState;

pub(crate) const GENERIC_FAILURE: &str = "An error occurred while processing your message.";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Accepted for client compatibility; conversations are not persisted.
    #[serde(default)]
    pub conversation_id: Option<String>,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatOutcome>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Message must not be empty.", None));
    }

    info!(
        conversation_id = req.conversation_id.as_deref().unwrap_or("default"),
        chars = req.message.chars().count(),
        "chat request"
    );

    match state.workflow.chat(&req.message).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => {
            error!(error = %e, "chat workflow failed");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_FAILURE,
                Some(e.to_string()),
            ))
        }
    }
}
