//! `GET /ws/chat`: chat over a WebSocket.
//!
//! Each text frame `{"text": "...", "conversation_id"?: "..."}` runs the
//! workflow once and is answered with `{"type": "message", "response",
//! "thinking"}` or `{"type": "error", "error"}`. Errors never close the
//! connection; frames on one socket are answered in order.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use persona_agent::Workflow;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::state::AppState;

// ── WebSocket Messages ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatFrame {
    pub text: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplyFrame {
    Message { response: String, thinking: String },
    Error { error: String },
}

impl ReplyFrame {
    fn error(error: impl Into<String>) -> Self {
        ReplyFrame::Error { error: error.into() }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Answer one incoming text frame.
pub async fn handle_frame(workflow: &Workflow, raw: &str) -> ReplyFrame {
    let frame: ChatFrame = match serde_json::from_str(raw) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "malformed chat frame");
            return ReplyFrame::error(format!("Invalid message frame: {e}"));
        }
    };

    if frame.text.trim().is_empty() {
        return ReplyFrame::error("Message must not be empty.");
    }
    debug!(conversation_id = frame.conversation_id.as_deref().unwrap_or("default"), "chat frame");

    match workflow.chat(&frame.text).await {
        Ok(outcome) => ReplyFrame::Message {
            response: outcome.response,
            thinking: outcome.thinking,
        },
        Err(e) => {
            error!(error = %e, "chat workflow failed");
            ReplyFrame::error(e.to_string())
        }
    }
}

// ── WebSocket Handler ───────────────────────────────────────────

pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    info!("chat socket opened");

    while let Some(msg) = receiver.next().await {
        let reply = match msg {
            Ok(Message::Text(text)) => handle_frame(&state.workflow, text.as_str()).await,
            Ok(Message::Binary(_)) => ReplyFrame::error("Binary frames are not supported."),
            Ok(Message::Close(_)) => break,
            // Pings are answered by axum; pongs need nothing.
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "chat socket receive failed");
                break;
            }
        };

        if sender.send(Message::Text(reply.to_json().into())).await.is_err() {
            break;
        }
    }

    info!("chat socket closed");
}
