//! Pushes chunks through the embedder into the similarity index.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::embedding::{EmbeddedText, Embedder, EmbeddingBatcher, EmbeddingError};
use crate::index::{IndexError, IndexRecord, IndexSpec, VectorIndex};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("No chunks to load")]
    NoChunks,

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Index operation failed: {0}")]
    Index(#[from] IndexError),
}

/// Outcome of a load run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Whether the index had to be created first.
    pub created_index: bool,
    pub chunks: usize,
    pub upserted: usize,
}

pub struct IndexLoader {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    metric: String,
    batch_size: usize,
}

impl IndexLoader {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        metric: impl Into<String>,
        batch_size: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            metric: metric.into(),
            batch_size,
        }
    }

    /// Create the index with the embedder's dimensionality if it is absent.
    /// An existing index must have that same width. Returns `true` when it
    /// was created.
    pub async fn ensure_index(&self) -> Result<bool, IndexError> {
        let expected = self.embedder.dimensions();
        if self.index.exists().await? {
            if let Some(actual) = self.index.dimension().await? {
                if actual != expected {
                    return Err(IndexError::DimensionMismatch { expected, actual });
                }
            }
            info!(index = %self.index.name(), dimension = expected, "Index exists");
            return Ok(false);
        }
        let spec = IndexSpec {
            dimension: expected,
            metric: self.metric.clone(),
        };
        self.index.create(&spec).await?;
        info!(index = %self.index.name(), dimension = spec.dimension, "Index created");
        Ok(true)
    }

    /// Embed and upsert every chunk under a fresh random id.
    ///
    /// Nothing deduplicates: loading the same chunks twice stores them twice.
    /// The first failure aborts the run; batches already written stay written.
    pub async fn load(&self, chunks: &[String]) -> Result<LoadReport, LoadError> {
        if chunks.is_empty() {
            return Err(LoadError::NoChunks);
        }

        let created_index = self.ensure_index().await?;
        let mut batcher = EmbeddingBatcher::new(self.embedder.clone(), self.batch_size);
        let mut upserted = 0;

        for chunk in chunks {
            if let Some(batch) = batcher.add(Uuid::new_v4(), chunk.clone()).await? {
                upserted += self.write(batch).await?;
            }
        }
        let rest = batcher.flush().await?;
        upserted += self.write(rest).await?;

        info!(index = %self.index.name(), chunks = chunks.len(), upserted, "Load complete");
        Ok(LoadReport {
            created_index,
            chunks: chunks.len(),
            upserted,
        })
    }

    async fn write(&self, batch: Vec<EmbeddedText>) -> Result<usize, IndexError> {
        if batch.is_empty() {
            return Ok(0);
        }
        let records: Vec<IndexRecord> = batch
            .into_iter()
            .map(|e| IndexRecord {
                id: e.id.to_string(),
                text: e.text,
                values: e.values,
            })
            .collect();
        let written = self.index.upsert(&records).await?;
        info!(batch = records.len(), written, "Upserted batch");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::InMemoryIndex;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeEmbedder {
        call_count: AtomicUsize,
        fail: bool,
    }

    impl FakeEmbedder {
        fn new() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(EmbeddingError::Api("quota exceeded".into()));
            }
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    fn chunks(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("chunk number {i}")).collect()
    }

    #[tokio::test]
    async fn creates_index_then_upserts_in_batches() {
        let embedder = Arc::new(FakeEmbedder::new());
        let index = Arc::new(InMemoryIndex::new("profile"));
        let loader = IndexLoader::new(embedder.clone(), index.clone(), "cosine", 2);

        let report = loader.load(&chunks(5)).await.unwrap();
        assert_eq!(
            report,
            LoadReport {
                created_index: true,
                chunks: 5,
                upserted: 5
            }
        );
        assert_eq!(embedder.call_count.load(Ordering::SeqCst), 3);
        assert_eq!(index.len().await, 5);
    }

    #[tokio::test]
    async fn existing_index_is_reused() {
        let embedder = Arc::new(FakeEmbedder::new());
        let index = Arc::new(InMemoryIndex::with_spec(
            "profile",
            IndexSpec {
                dimension: 3,
                metric: "cosine".into(),
            },
        ));
        let loader = IndexLoader::new(embedder, index, "cosine", 64);
        let report = loader.load(&chunks(1)).await.unwrap();
        assert!(!report.created_index);
    }

    #[tokio::test]
    async fn existing_index_with_other_width_is_refused() {
        let embedder = Arc::new(FakeEmbedder::new());
        let index = Arc::new(InMemoryIndex::with_spec(
            "profile",
            IndexSpec {
                dimension: 768,
                metric: "cosine".into(),
            },
        ));
        let loader = IndexLoader::new(embedder.clone(), index.clone(), "cosine", 64);

        let err = loader.load(&chunks(2)).await.unwrap_err();
        assert!(matches!(
            err,
            LoadError::Index(IndexError::DimensionMismatch {
                expected: 3,
                actual: 768
            })
        ));
        assert_eq!(embedder.call_count.load(Ordering::SeqCst), 0);
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn reloading_duplicates_entries() {
        let index = Arc::new(InMemoryIndex::new("profile"));
        let loader = IndexLoader::new(Arc::new(FakeEmbedder::new()), index.clone(), "cosine", 64);
        loader.load(&chunks(3)).await.unwrap();
        loader.load(&chunks(3)).await.unwrap();
        assert_eq!(index.len().await, 6);
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let index = Arc::new(InMemoryIndex::new("profile"));
        let loader = IndexLoader::new(Arc::new(FakeEmbedder::new()), index.clone(), "cosine", 64);
        assert!(matches!(loader.load(&[]).await, Err(LoadError::NoChunks)));
        assert!(!index.exists().await.unwrap());
    }

    #[tokio::test]
    async fn embedding_failure_aborts() {
        let embedder = Arc::new(FakeEmbedder {
            fail: true,
            ..FakeEmbedder::new()
        });
        let index = Arc::new(InMemoryIndex::new("profile"));
        let loader = IndexLoader::new(embedder, index.clone(), "cosine", 64);
        let err = loader.load(&chunks(2)).await.unwrap_err();
        assert!(matches!(err, LoadError::Embedding(EmbeddingError::Api(_))));
        assert!(index.is_empty().await);
    }
}
