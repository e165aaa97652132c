//! In-process index with brute-force similarity search. Used by tests and
//! local runs where no hosted index is available.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::{IndexError, IndexMatch, IndexRecord, IndexSpec, VectorIndex};

pub struct InMemoryIndex {
    name: String,
    spec: RwLock<Option<IndexSpec>>,
    records: RwLock<Vec<IndexRecord>>,
}

impl InMemoryIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: RwLock::new(None),
            records: RwLock::new(Vec::new()),
        }
    }

    /// An index that already exists with the given spec.
    pub fn with_spec(name: impl Into<String>, spec: IndexSpec) -> Self {
        Self {
            name: name.into(),
            spec: RwLock::new(Some(spec)),
            records: RwLock::new(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn require_spec(&self) -> Result<IndexSpec, IndexError> {
        self.spec
            .read()
            .await
            .clone()
            .ok_or_else(|| IndexError::NotFound(self.name.clone()))
    }
}

fn score(metric: &str, a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    match metric {
        "dotproduct" => dot,
        "euclidean" => {
            let dist: f32 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
            -dist.sqrt()
        }
        _ => {
            let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
            let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
            if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
                0.0
            } else {
                dot / (mag_a * mag_b)
            }
        }
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self) -> Result<bool, IndexError> {
        Ok(self.spec.read().await.is_some())
    }

    async fn dimension(&self) -> Result<Option<usize>, IndexError> {
        Ok(self.spec.read().await.as_ref().map(|spec| spec.dimension))
    }

    async fn create(&self, spec: &IndexSpec) -> Result<(), IndexError> {
        *self.spec.write().await = Some(spec.clone());
        Ok(())
    }

    async fn upsert(&self, records: &[IndexRecord]) -> Result<usize, IndexError> {
        let spec = self.require_spec().await?;
        if let Some(bad) = records.iter().find(|r| r.values.len() != spec.dimension) {
            return Err(IndexError::DimensionMismatch {
                expected: spec.dimension,
                actual: bad.values.len(),
            });
        }

        let mut stored = self.records.write().await;
        for record in records {
            match stored.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record.clone(),
                None => stored.push(record.clone()),
            }
        }
        Ok(records.len())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>, IndexError> {
        let spec = self.require_spec().await?;
        if vector.len() != spec.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: spec.dimension,
                actual: vector.len(),
            });
        }

        let stored = self.records.read().await;
        let mut matches: Vec<IndexMatch> = stored
            .iter()
            .map(|r| IndexMatch {
                id: r.id.clone(),
                score: score(&spec.metric, vector, &r.values),
                text: r.text.clone(),
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, text: &str, values: Vec<f32>) -> IndexRecord {
        IndexRecord {
            id: id.into(),
            text: text.into(),
            values,
        }
    }

    fn cosine_spec() -> IndexSpec {
        IndexSpec {
            dimension: 2,
            metric: "cosine".into(),
        }
    }

    #[tokio::test]
    async fn missing_index_rejects_writes() {
        let index = InMemoryIndex::new("profile");
        assert!(!index.exists().await.unwrap());
        let err = index.upsert(&[record("a", "x", vec![1.0, 0.0])]).await.unwrap_err();
        assert!(matches!(err, IndexError::NotFound(_)));
    }

    #[tokio::test]
    async fn query_orders_by_similarity() {
        let index = InMemoryIndex::new("profile");
        index.create(&cosine_spec()).await.unwrap();
        index
            .upsert(&[
                record("a", "east", vec![1.0, 0.0]),
                record("b", "north", vec![0.0, 1.0]),
                record("c", "north-east", vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let hits = index.query(&[0.9, 0.1], 2).await.unwrap();
        let texts: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["east", "north-east"]);
    }

    #[tokio::test]
    async fn upsert_overwrites_same_id() {
        let index = InMemoryIndex::with_spec("profile", cosine_spec());
        index.upsert(&[record("a", "old", vec![1.0, 0.0])]).await.unwrap();
        index.upsert(&[record("a", "new", vec![1.0, 0.0])]).await.unwrap();
        assert_eq!(index.len().await, 1);
        assert_eq!(index.query(&[1.0, 0.0], 5).await.unwrap()[0].text, "new");
    }

    #[tokio::test]
    async fn wrong_dimension_is_rejected() {
        let index = InMemoryIndex::with_spec("profile", cosine_spec());
        let err = index.query(&[1.0, 0.0, 0.0], 5).await.unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { expected: 2, actual: 3 }));
    }
}
