use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding count mismatch: sent {sent} texts, got {received} vectors")]
    CountMismatch { sent: usize, received: usize },

    #[error("Embedding provider not configured: {0}")]
    NotConfigured(String),
}

/// Trait for embedding backends (Gemini, OpenAI).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of documents, returning one vector per input text (in order).
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embed a single search query. Backends that distinguish query and
    /// document embeddings override this.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text]).await?;
        if vectors.len() != 1 {
            return Err(EmbeddingError::CountMismatch {
                sent: 1,
                received: vectors.len(),
            });
        }
        vectors
            .pop()
            .ok_or(EmbeddingError::CountMismatch { sent: 1, received: 0 })
    }

    /// The dimensionality of the output vectors.
    fn dimensions(&self) -> usize;
}

/// Check a backend response: one vector per input, each of the expected width.
pub(crate) fn validate_embeddings(
    sent: usize,
    dimensions: usize,
    embeddings: &[Vec<f32>],
) -> Result<(), EmbeddingError> {
    if embeddings.len() != sent {
        return Err(EmbeddingError::CountMismatch {
            sent,
            received: embeddings.len(),
        });
    }
    if let Some(bad) = embeddings.iter().find(|v| v.len() != dimensions) {
        return Err(EmbeddingError::DimensionMismatch {
            expected: dimensions,
            actual: bad.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_short_response() {
        let err = validate_embeddings(2, 3, &[vec![0.0; 3]]).unwrap_err();
        assert!(matches!(err, EmbeddingError::CountMismatch { sent: 2, received: 1 }));
    }

    #[test]
    fn validate_rejects_wrong_width() {
        let err = validate_embeddings(2, 3, &[vec![0.0; 3], vec![0.0; 4]]).unwrap_err();
        assert!(matches!(err, EmbeddingError::DimensionMismatch { expected: 3, actual: 4 }));
    }

    #[test]
    fn validate_accepts_matching_response() {
        assert!(validate_embeddings(1, 2, &[vec![0.1, 0.2]]).is_ok());
    }
}
