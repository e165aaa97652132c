use std::sync::Arc;

use uuid::Uuid;

use super::traits::{Embedder, EmbeddingError};

/// A chunk together with its id and embedding, ready for upsert.
#[derive(Debug, Clone)]
pub struct EmbeddedText {
    pub id: Uuid,
    pub text: String,
    pub values: Vec<f32>,
}

/// Collects (id, text) pairs and flushes when the batch is full.
pub struct EmbeddingBatcher {
    buffer: Vec<(Uuid, String)>,
    batch_size: usize,
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingBatcher {
    pub fn new(embedder: Arc<dyn Embedder>, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            buffer: Vec::with_capacity(batch_size),
            batch_size,
            embedder,
        }
    }

    /// Add a text to the batch. Returns the embedded batch when it is full (auto-flush).
    pub async fn add(
        &mut self,
        id: Uuid,
        text: String,
    ) -> Result<Option<Vec<EmbeddedText>>, EmbeddingError> {
        self.buffer.push((id, text));
        if self.buffer.len() >= self.batch_size {
            Ok(Some(self.flush().await?))
        } else {
            Ok(None)
        }
    }

    /// Force-flush remaining items.
    pub async fn flush(&mut self) -> Result<Vec<EmbeddedText>, EmbeddingError> {
        if self.buffer.is_empty() {
            return Ok(Vec::new());
        }
        let batch: Vec<(Uuid, String)> = self.buffer.drain(..).collect();
        let texts: Vec<&str> = batch.iter().map(|(_, t)| t.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != batch.len() {
            return Err(EmbeddingError::CountMismatch {
                sent: batch.len(),
                received: embeddings.len(),
            });
        }

        Ok(batch
            .into_iter()
            .zip(embeddings)
            .map(|((id, text), values)| EmbeddedText { id, text, values })
            .collect())
    }

    /// Number of items currently buffered.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
