//! The conversational workflow: greeting short-circuit, retrieval, intent
//! classification, reasoning and response generation over one
//! [`ConversationState`] per message.

pub mod context;
pub mod greeting;
pub mod intent;
pub mod prompts;
pub mod retriever;
pub mod state;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use context::{ContextError, ServiceContext, WorkflowSettings};
pub use intent::{Intent, IntentClassifier, KeywordClassifier};
pub use state::{ChatOutcome, ConversationState};
pub use workflow::{Step, Workflow, WorkflowError};
