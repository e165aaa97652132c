//! Fakes and app wiring shared by the server integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use persona_agent::{KeywordClassifier, ServiceContext, Workflow, WorkflowSettings};
use persona_core::Config;
use persona_ingest::embedding::{Embedder, EmbeddingError};
use persona_ingest::index::InMemoryIndex;
use persona_ingest::IndexLoader;
use persona_llm::{LlmError, LlmProvider, Message};
use persona_server::AppState;

pub struct FakeEmbedder {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|t| vec![t.len() as f32 + 1.0, t.matches(' ').count() as f32 + 1.0, 1.0])
            .collect())
    }

    fn dimensions(&self) -> usize {
        3
    }
}

pub struct FakeLlm {
    pub calls: AtomicUsize,
    pub fail: bool,
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
            return Err(LlmError::ApiError { status: 429, body: "quota exhausted".into() });
        }
        let prompt = &messages[0].content;
        if prompt.contains("internal monologue") {
            Ok("THINKING: They want my skills; the context lists Rust.".into())
        } else {
            Ok("I work mostly in Rust and Go.".into())
        }
    }
}

pub struct TestApp {
    pub state: Arc<AppState>,
    pub embedder: Arc<FakeEmbedder>,
    pub llm: Arc<FakeLlm>,
}

const CHUNKS: &[&str] = &[
    "Skill Category: Languages\nSkills: Rust, Go",
    "Role: Engineer\nCompany: Acme\nDuration: 2021-2024\nDescription: Built the ingest pipeline.",
    "Project: Crawler\nTechnologies: Rust, Tokio\nDescription: Fast crawler.\nContribution: Author",
    "Degree: BSc\nInstitution: UWA\nDuration: N/A",
    "Name: Sam Doe\nRole: Engineer\nBio: Builds things.\nEmail: sam@example.com\nLocation: Perth",
    "Skill Category: Cloud\nSkills: AWS, GCP",
];

pub async fn test_app(llm_fails: bool) -> TestApp {
    let index = Arc::new(InMemoryIndex::new("profile"));
    let loader_embedder = Arc::new(FakeEmbedder { calls: AtomicUsize::new(0) });
    let chunks: Vec<String> = CHUNKS.iter().map(|c| c.to_string()).collect();
    IndexLoader::new(loader_embedder, index.clone(), "cosine", 4)
        .load(&chunks)
        .await
        .unwrap();

    let embedder = Arc::new(FakeEmbedder { calls: AtomicUsize::new(0) });
    let llm = Arc::new(FakeLlm { calls: AtomicUsize::new(0), fail: llm_fails });
    let ctx = ServiceContext::new(
        embedder.clone(),
        index,
        llm.clone(),
        Arc::new(KeywordClassifier::default()),
        WorkflowSettings {
            persona_name: "Sam Doe".into(),
            top_k: 5,
            temperature: 0.7,
            max_tokens: 256,
        },
    );

    let config = Config::from_lookup("", &|_| None);
    let state = Arc::new(AppState::new(Workflow::new(Arc::new(ctx)), &config));
    TestApp { state, embedder, llm }
}
