use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Index API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Index not found: {0}")]
    NotFound(String),

    #[error("Index {name} not ready after {waited_secs}s")]
    NotReady { name: String, waited_secs: u64 },

    #[error("Dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index not configured: {0}")]
    NotConfigured(String),
}

/// Creation parameters for a similarity index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub dimension: usize,
    /// "cosine", "euclidean" or "dotproduct".
    pub metric: String,
}

/// One stored vector: the chunk text travels as the payload.
#[derive(Debug, Clone)]
pub struct IndexRecord {
    pub id: String,
    pub text: String,
    pub values: Vec<f32>,
}

/// A query hit.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMatch {
    pub id: String,
    pub score: f32,
    pub text: String,
}

/// A remote (or in-process) nearest-neighbour index over text chunks.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    fn name(&self) -> &str;

    async fn exists(&self) -> Result<bool, IndexError>;

    /// Vector width of the existing index, `None` if it is absent or does
    /// not report one.
    async fn dimension(&self) -> Result<Option<usize>, IndexError>;

    /// Create the index. Implementations may return once it accepts writes.
    async fn create(&self, spec: &IndexSpec) -> Result<(), IndexError>;

    /// Insert or overwrite records. Returns the number written.
    async fn upsert(&self, records: &[IndexRecord]) -> Result<usize, IndexError>;

    /// The `top_k` nearest records to `vector`, best first.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>, IndexError>;
}
