//! Shared service handles for the workflow, built once at startup.

use std::sync::Arc;

use persona_core::config::Requirement;
use persona_core::{Config, PersonaError};
use persona_ingest::embedding::{create_embedder, Embedder, EmbeddingError};
use persona_ingest::index::{IndexError, PineconeIndex, VectorIndex};
use persona_llm::{create_provider, LlmError, LlmProvider};
use thiserror::Error;
use tracing::info;

use crate::intent::{IntentClassifier, KeywordClassifier};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] PersonaError),

    #[error("Embedding setup failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Index setup failed: {0}")]
    Index(#[from] IndexError),

    #[error("LLM setup failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Index {0} does not exist; run `persona load` first")]
    IndexMissing(String),
}

/// Per-request generation settings.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub persona_name: String,
    pub top_k: usize,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl WorkflowSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            persona_name: config.persona.name.clone(),
            top_k: config.retrieval.top_k,
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        }
    }
}

/// Client handles shared read-only by every workflow run.
pub struct ServiceContext {
    pub embedder: Arc<dyn Embedder>,
    pub index: Arc<dyn VectorIndex>,
    pub llm: Arc<dyn LlmProvider>,
    pub classifier: Arc<dyn IntentClassifier>,
    pub settings: WorkflowSettings,
}

impl ServiceContext {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LlmProvider>,
        classifier: Arc<dyn IntentClassifier>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            embedder,
            index,
            llm,
            classifier,
            settings,
        }
    }

    /// Validate serving configuration and build the hosted-service clients.
    /// Any missing credential fails here with the full list of missing keys.
    pub fn from_config(config: &Config) -> Result<Self, ContextError> {
        config.require(Requirement::Serve)?;

        let embedder = create_embedder(&config.embedding, &config.llm)?;
        let index: Arc<dyn VectorIndex> = Arc::new(PineconeIndex::from_config(&config.pinecone)?);
        let llm = create_provider(&config.llm)?;

        info!(
            index = %index.name(),
            llm = %llm.name(),
            embedding_model = %config.embedding.model,
            "Service context ready"
        );

        Ok(Self::new(
            embedder,
            index,
            llm,
            Arc::new(KeywordClassifier::default()),
            WorkflowSettings::from_config(config),
        ))
    }

    /// Confirm the index the workflow reads from has been created.
    pub async fn verify_index(&self) -> Result<(), ContextError> {
        if self.index.exists().await? {
            Ok(())
        } else {
            Err(ContextError::IndexMissing(self.index.name().to_string()))
        }
    }
}
