//! The chat workflow as an explicit state machine.
//!
//! ```text
//! start ──greeting──▶ greet ─────────────────────────────────────────▶ end
//!   └──────otherwise──▶ retrieve ▶ classify_intent ▶ think ▶ respond ▶ end
//! ```
//!
//! Steps run strictly in sequence. Service failures propagate unchanged to
//! the caller; nothing is retried.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use persona_ingest::embedding::EmbeddingError;
use persona_ingest::index::IndexError;
use persona_llm::{LlmError, Message};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::context::ServiceContext;
use crate::greeting::{is_greeting, GREETING_RESPONSE, GREETING_THINKING};
use crate::prompts::{response_prompt, thinking_prompt};
use crate::retriever::retrieve_context;
use crate::state::{ChatOutcome, ConversationState};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Index query failed: {0}")]
    Index(#[from] IndexError),

    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Intent classification failed: {0}")]
    Classifier(String),

    #[error("State field {field} read or written before {requires}")]
    StateOutOfOrder {
        field: &'static str,
        requires: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Start,
    Greet,
    Retrieve,
    ClassifyIntent,
    Think,
    Respond,
    End,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Start => "start",
            Step::Greet => "greet",
            Step::Retrieve => "retrieve",
            Step::ClassifyIntent => "classify_intent",
            Step::Think => "think",
            Step::Respond => "respond",
            Step::End => "end",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs one message through the pipeline. Cheap to clone; every clone shares
/// the same [`ServiceContext`].
#[derive(Clone)]
pub struct Workflow {
    ctx: Arc<ServiceContext>,
}

impl Workflow {
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    /// Run the workflow and return the client-facing fields.
    pub async fn chat(&self, message: &str) -> Result<ChatOutcome, WorkflowError> {
        self.run(message).await?.into_outcome()
    }

    /// Run the workflow to `end` and return the full state.
    pub async fn run(&self, message: &str) -> Result<ConversationState, WorkflowError> {
        if message.trim().is_empty() {
            return Err(WorkflowError::EmptyMessage);
        }

        let start = Instant::now();
        let mut state = ConversationState::new(message);
        let mut step = Step::Start;

        loop {
            state.enter(step);
            step = match step {
                Step::Start => route(&state),
                Step::Greet => self.greet(&mut state)?,
                Step::Retrieve => self.retrieve(&mut state).await?,
                Step::ClassifyIntent => self.classify_intent(&mut state).await?,
                Step::Think => self.think(&mut state).await?,
                Step::Respond => self.respond(&mut state).await?,
                Step::End => break,
            };
        }

        state.finish()?;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(steps = state.steps().len(), elapsed_ms, "workflow complete");
        Ok(state)
    }

    fn greet(&self, state: &mut ConversationState) -> Result<Step, WorkflowError> {
        info!("handling greeting");
        state.record_greeting(GREETING_THINKING.to_string(), GREETING_RESPONSE.to_string())?;
        Ok(Step::End)
    }

    async fn retrieve(&self, state: &mut ConversationState) -> Result<Step, WorkflowError> {
        info!(top_k = self.ctx.settings.top_k, "retrieving context");
        let context = retrieve_context(
            self.ctx.embedder.as_ref(),
            self.ctx.index.as_ref(),
            state.query(),
            self.ctx.settings.top_k,
        )
        .await?;
        state.record_context(context)?;
        Ok(Step::ClassifyIntent)
    }

    async fn classify_intent(&self, state: &mut ConversationState) -> Result<Step, WorkflowError> {
        let intent = self.ctx.classifier.classify(state.query()).await?;
        info!(%intent, "classified intent");
        state.record_intent(intent)?;
        Ok(Step::Think)
    }

    async fn think(&self, state: &mut ConversationState) -> Result<Step, WorkflowError> {
        info!("thinking");
        let prompt = thinking_prompt(
            &self.ctx.settings.persona_name,
            state.query(),
            state.intent()?,
            state.retrieved_context()?,
        );
        let thinking = self.complete(prompt).await?;
        state.record_thinking(thinking)?;
        Ok(Step::Respond)
    }

    async fn respond(&self, state: &mut ConversationState) -> Result<Step, WorkflowError> {
        info!("generating response");
        let prompt = response_prompt(
            &self.ctx.settings.persona_name,
            state.retrieved_context()?,
            state.thinking()?,
            state.query(),
        );
        let response = self.complete(prompt).await?;
        state.record_response(response)?;
        Ok(Step::End)
    }

    async fn complete(&self, prompt: String) -> Result<String, LlmError> {
        self.ctx
            .llm
            .complete(
                vec![Message::user(prompt)],
                self.ctx.settings.temperature,
                self.ctx.settings.max_tokens,
            )
            .await
    }
}

/// Entry routing: greetings short-circuit, everything else retrieves.
fn route(state: &ConversationState) -> Step {
    if is_greeting(state.query()) {
        Step::Greet
    } else {
        Step::Retrieve
    }
}
