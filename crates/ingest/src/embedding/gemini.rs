use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::traits::{validate_embeddings, Embedder, EmbeddingError};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Gemini embedding backend (`batchEmbedContents`).
///
/// Documents are embedded with task type `RETRIEVAL_DOCUMENT` and queries with
/// `RETRIEVAL_QUERY`, so stored chunks and incoming questions land in the
/// matching halves of the retrieval embedding space.
pub struct GeminiEmbedder {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    dimensions: usize,
}

impl GeminiEmbedder {
    pub fn new(api_key: String, model: String, dimensions: usize) -> Self {
        let model = model.trim_start_matches("models/").to_string();
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
            dimensions,
        }
    }

    /// Point at a different API host (proxies, local fakes).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request_body(&self, texts: &[&str], task_type: &str) -> serde_json::Value {
        let requests: Vec<serde_json::Value> = texts
            .iter()
            .map(|text| {
                json!({
                    "model": format!("models/{}", self.model),
                    "content": { "parts": [{ "text": text }] },
                    "taskType": task_type,
                })
            })
            .collect();
        json!({ "requests": requests })
    }

    async fn embed_with_task(
        &self,
        texts: &[&str],
        task_type: &str,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/v1beta/models/{}:batchEmbedContents",
            self.base_url, self.model
        );
        debug!(model = %self.model, count = texts.len(), task_type, "Gemini embedding request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_request_body(texts, task_type))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("{status}: {body}")));
        }

        let resp: BatchEmbedResponse = response.json().await?;
        let embeddings: Vec<Vec<f32>> = resp.embeddings.into_iter().map(|e| e.values).collect();
        validate_embeddings(texts.len(), self.dimensions, &embeddings)?;
        Ok(embeddings)
    }
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.embed_with_task(texts, "RETRIEVAL_DOCUMENT").await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_with_task(&[text], "RETRIEVAL_QUERY").await?;
        vectors.pop().ok_or(EmbeddingError::CountMismatch { sent: 1, received: 0 })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
