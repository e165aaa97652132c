//! Hand-written fakes shared by the workflow tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use persona_ingest::embedding::{Embedder, EmbeddingError};
use persona_ingest::index::{InMemoryIndex, IndexRecord, IndexSpec, VectorIndex};
use persona_llm::{LlmError, LlmProvider, Message};

use crate::context::{ServiceContext, WorkflowSettings};
use crate::intent::KeywordClassifier;

pub const DIMS: usize = 4;

pub struct FakeEmbedder {
    pub calls: AtomicUsize,
    fail: bool,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self { calls: AtomicUsize::new(0), fail: false }
    }

    pub fn failing() -> Self {
        Self { calls: AtomicUsize::new(0), fail: true }
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let bytes = text.as_bytes();
        let sum: u32 = bytes.iter().map(|b| u32::from(*b)).sum();
        vec![
            bytes.len() as f32 + 1.0,
            (sum % 97) as f32 + 1.0,
            text.matches('s').count() as f32 + 1.0,
            1.0,
        ]
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EmbeddingError::Api("embedding service unavailable".into()));
        }
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        DIMS
    }
}

/// Index pre-loaded with `n` single-line profile chunks.
pub async fn seeded_index(embedder: &FakeEmbedder, n: usize) -> InMemoryIndex {
    let index = InMemoryIndex::with_spec(
        "profile",
        IndexSpec { dimension: DIMS, metric: "cosine".into() },
    );
    let texts: Vec<String> = (0..n)
        .map(|i| format!("Skill Category: Area {i} Skills: Rust, Tokio, Axum"))
        .collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let vectors = embedder.embed_batch(&refs).await.unwrap();
    let records: Vec<IndexRecord> = texts
        .into_iter()
        .zip(vectors)
        .enumerate()
        .map(|(i, (text, values))| IndexRecord { id: format!("chunk-{i}"), text, values })
        .collect();
    index.upsert(&records).await.unwrap();
    index
}

/// Answers the reasoning prompt with a monologue and the response prompt
/// with a first-person reply. Records every prompt it receives.
pub struct FakeLlm {
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
    fail: bool,
}

impl FakeLlm {
    pub fn new() -> Self {
        Self { calls: AtomicUsize::new(0), prompts: Mutex::new(Vec::new()), fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::new() }
    }

    pub fn prompt(&self, i: usize) -> String {
        self.prompts.lock().unwrap()[i].clone()
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    fn name(&self) -> &str {
        "fake"
    }

    async fn complete(
        &self,
        messages: Vec<Message>,
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LlmError::ApiError { status: 503, body: "overloaded".into() });
        }
        let prompt = messages.into_iter().map(|m| m.content).collect::<Vec<_>>().join("\n");
        let reply = if prompt.contains("internal monologue") {
            "THINKING: The user wants my skills. I should list what my memory says."
        } else {
            "I mostly work in Rust, with Tokio and Axum for services."
        };
        self.prompts.lock().unwrap().push(prompt);
        Ok(reply.to_string())
    }
}

pub struct Fixture {
    pub embedder: Arc<FakeEmbedder>,
    pub index: Arc<InMemoryIndex>,
    pub llm: Arc<FakeLlm>,
    pub context: Arc<ServiceContext>,
}

pub async fn fixture_with(embedder: FakeEmbedder, llm: FakeLlm, chunks: usize) -> Fixture {
    let index = Arc::new(seeded_index(&FakeEmbedder::new(), chunks).await);
    let embedder = Arc::new(embedder);
    let llm = Arc::new(llm);
    let context = Arc::new(ServiceContext::new(
        embedder.clone(),
        index.clone(),
        llm.clone(),
        Arc::new(KeywordClassifier::default()),
        WorkflowSettings {
            persona_name: "Sam Doe".into(),
            top_k: 5,
            temperature: 0.7,
            max_tokens: 256,
        },
    ));
    Fixture { embedder, index, llm, context }
}

pub async fn fixture() -> Fixture {
    fixture_with(FakeEmbedder::new(), FakeLlm::new(), 8).await
}
