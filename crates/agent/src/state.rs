//! Per-message conversation state.
//!
//! Fields are filled strictly in pipeline order (query, context, intent,
//! thinking, response). Each `record_*` call checks that the producing step
//! before it has run, and each accessor fails rather than hand out a field
//! that has not been produced yet.

use persona_llm::Message;
use serde::Serialize;

use crate::intent::Intent;
use crate::workflow::{Step, WorkflowError};

#[derive(Debug, Clone)]
pub struct ConversationState {
    messages: Vec<Message>,
    query: String,
    retrieved_context: Option<String>,
    intent: Option<Intent>,
    thinking: Option<String>,
    response: Option<String>,
    steps: Vec<Step>,
}

/// The fields surfaced to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatOutcome {
    pub response: String,
    pub thinking: String,
    pub retrieved_context: String,
}

fn out_of_order(field: &'static str, requires: &'static str) -> WorkflowError {
    WorkflowError::StateOutOfOrder { field, requires }
}

impl ConversationState {
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            messages: vec![Message::user(query.clone())],
            query,
            retrieved_context: None,
            intent: None,
            thinking: None,
            response: None,
            steps: Vec::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Steps visited so far, in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub(crate) fn enter(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn retrieved_context(&self) -> Result<&str, WorkflowError> {
        self.retrieved_context
            .as_deref()
            .ok_or_else(|| out_of_order("retrieved_context", "retrieve"))
    }

    pub fn intent(&self) -> Result<Intent, WorkflowError> {
        self.intent.ok_or_else(|| out_of_order("intent", "classify_intent"))
    }

    pub fn thinking(&self) -> Result<&str, WorkflowError> {
        self.thinking.as_deref().ok_or_else(|| out_of_order("thinking", "think"))
    }

    pub fn response(&self) -> Result<&str, WorkflowError> {
        self.response.as_deref().ok_or_else(|| out_of_order("response", "respond"))
    }

    pub fn record_context(&mut self, context: String) -> Result<(), WorkflowError> {
        if self.response.is_some() {
            return Err(out_of_order("retrieved_context", "an unanswered state"));
        }
        self.retrieved_context = Some(context);
        Ok(())
    }

    pub fn record_intent(&mut self, intent: Intent) -> Result<(), WorkflowError> {
        self.retrieved_context()?;
        self.intent = Some(intent);
        Ok(())
    }

    pub fn record_thinking(&mut self, thinking: String) -> Result<(), WorkflowError> {
        self.intent()?;
        self.thinking = Some(thinking);
        Ok(())
    }

    pub fn record_response(&mut self, response: String) -> Result<(), WorkflowError> {
        self.thinking()?;
        self.response = Some(response);
        Ok(())
    }

    /// The greeting path answers directly, skipping context and intent.
    pub fn record_greeting(&mut self, thinking: String, response: String) -> Result<(), WorkflowError> {
        if self.retrieved_context.is_some() {
            return Err(out_of_order("response", "a state without retrieved context"));
        }
        self.thinking = Some(thinking);
        self.response = Some(response);
        Ok(())
    }

    /// Append the assistant reply to the history once a response exists.
    pub(crate) fn finish(&mut self) -> Result<(), WorkflowError> {
        let reply = self.response()?.to_string();
        self.messages.push(Message::assistant(reply));
        Ok(())
    }

    pub fn into_outcome(self) -> Result<ChatOutcome, WorkflowError> {
        let response = self.response()?.to_string();
        let thinking = self.thinking()?.to_string();
        Ok(ChatOutcome {
            response,
            thinking,
            retrieved_context: self.retrieved_context.unwrap_or_default(),
        })
    }
}
