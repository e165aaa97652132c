use persona_ingest::embedding::Embedder;
use persona_ingest::index::VectorIndex;
use tracing::debug;

use crate::workflow::WorkflowError;

/// Embed `query`, fetch the `top_k` nearest chunks and join their text with
/// newlines in match order. No relevance cut-off is applied.
pub async fn retrieve_context(
    embedder: &dyn Embedder,
    index: &dyn VectorIndex,
    query: &str,
    top_k: usize,
) -> Result<String, WorkflowError> {
    let vector = embedder.embed_query(query).await?;
    let matches = index.query(&vector, top_k).await?;
    debug!(index = %index.name(), hits = matches.len(), "Retrieved context");
    Ok(matches
        .into_iter()
        .take(top_k)
        .map(|m| m.text)
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seeded_index, FakeEmbedder};
    use async_trait::async_trait;
    use persona_ingest::index::{IndexError, IndexMatch, IndexRecord, IndexSpec};

    /// Returns a fixed match list whose scores are deliberately not sorted.
    struct FixedIndex {
        matches: Vec<IndexMatch>,
    }

    #[async_trait]
    impl VectorIndex for FixedIndex {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn exists(&self) -> Result<bool, IndexError> {
            Ok(true)
        }

        async fn dimension(&self) -> Result<Option<usize>, IndexError> {
            Ok(None)
        }

        async fn create(&self, _spec: &IndexSpec) -> Result<(), IndexError> {
            Ok(())
        }

        async fn upsert(&self, records: &[IndexRecord]) -> Result<usize, IndexError> {
            Ok(records.len())
        }

        async fn query(&self, _vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>, IndexError> {
            Ok(self.matches.iter().take(top_k).cloned().collect())
        }
    }

    fn hit(id: &str, score: f32, text: &str) -> IndexMatch {
        IndexMatch { id: id.into(), score, text: text.into() }
    }

    #[tokio::test]
    async fn context_matches_index_order() {
        let embedder = FakeEmbedder::new();
        let index = seeded_index(&embedder, 8).await;

        let vector = embedder.embed_query("rust projects").await.unwrap();
        let expected = index
            .query(&vector, 5)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect::<Vec<_>>()
            .join("\n");

        let context = retrieve_context(&embedder, &index, "rust projects", 5).await.unwrap();
        assert_eq!(context, expected);
    }

    #[tokio::test]
    async fn fragments_are_not_reordered_by_score() {
        let index = FixedIndex {
            matches: vec![
                hit("b", 0.2, "Role: Dev"),
                hit("a", 0.9, "Skill Category: Languages"),
                hit("c", 0.5, "Degree: BSc"),
            ],
        };
        let context = retrieve_context(&FakeEmbedder::new(), &index, "q", 5).await.unwrap();
        assert_eq!(context, "Role: Dev\nSkill Category: Languages\nDegree: BSc");
    }

    #[tokio::test]
    async fn returns_at_most_top_k_lines() {
        let embedder = FakeEmbedder::new();
        let index = seeded_index(&embedder, 8).await;
        let context = retrieve_context(&embedder, &index, "anything", 5).await.unwrap();
        assert_eq!(context.lines().count(), 5);
    }

    #[tokio::test]
    async fn small_index_returns_everything() {
        let embedder = FakeEmbedder::new();
        let index = seeded_index(&embedder, 2).await;
        let context = retrieve_context(&embedder, &index, "weather", 5).await.unwrap();
        assert_eq!(context.lines().count(), 2);
    }

    #[tokio::test]
    async fn embedding_failure_propagates() {
        let embedder = FakeEmbedder::failing();
        let index = seeded_index(&FakeEmbedder::new(), 2).await;
        let err = retrieve_context(&embedder, &index, "q", 5).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Embedding(_)));
    }
}
