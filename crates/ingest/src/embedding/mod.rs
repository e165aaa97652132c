pub mod batcher;
pub mod gemini;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use persona_core::config::{EmbeddingConfig, LlmConfig};

pub use batcher::{EmbeddedText, EmbeddingBatcher};
pub use gemini::GeminiEmbedder;
pub use openai::OpenAiEmbedder;
pub use traits::{Embedder, EmbeddingError};

/// Build the configured embedding backend. Credentials live in the LLM
/// section because both backends share one API key per vendor.
pub fn create_embedder(
    embedding: &EmbeddingConfig,
    llm: &LlmConfig,
) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    match embedding.provider.as_str() {
        "gemini" => {
            let key = llm
                .google_api_key
                .clone()
                .ok_or_else(|| EmbeddingError::NotConfigured("GOOGLE_API_KEY not set".into()))?;
            Ok(Arc::new(GeminiEmbedder::new(
                key,
                embedding.model.clone(),
                embedding.dimensions,
            )))
        }
        "openai" => {
            let key = llm
                .openai_api_key
                .clone()
                .ok_or_else(|| EmbeddingError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            Ok(Arc::new(OpenAiEmbedder::new(
                key,
                embedding.model.clone(),
                Some(llm.openai_base_url.clone()),
                embedding.dimensions,
            )))
        }
        other => Err(EmbeddingError::NotConfigured(format!(
            "unknown embedding provider '{other}'"
        ))),
    }
}
