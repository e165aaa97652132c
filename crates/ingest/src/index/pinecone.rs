//! Pinecone serverless index over its REST API.
//!
//! Control-plane calls (describe, create) go to `PINECONE_CONTROL_URL`; data
//! calls (upsert, query) go to the per-index host returned by describe, which
//! is resolved once and cached.

use std::time::Duration;

use async_trait::async_trait;
use persona_core::config::PineconeConfig;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::traits::{IndexError, IndexMatch, IndexRecord, IndexSpec, VectorIndex};

const API_VERSION: &str = "2024-07";
const READY_POLL_INTERVAL: Duration = Duration::from_secs(2);
const READY_MAX_POLLS: u32 = 60;

pub struct PineconeIndex {
    client: Client,
    api_key: String,
    name: String,
    control_url: String,
    cloud: String,
    region: String,
    host: OnceCell<String>,
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    dimension: Option<usize>,
    #[serde(default)]
    status: Option<IndexStatus>,
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

#[derive(Debug, Deserialize)]
struct UpsertResponse {
    #[serde(rename = "upsertedCount", default)]
    upserted_count: usize,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

impl PineconeIndex {
    pub fn new(
        api_key: String,
        name: String,
        control_url: String,
        cloud: String,
        region: String,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            name,
            control_url: control_url.trim_end_matches('/').to_string(),
            cloud,
            region,
            host: OnceCell::new(),
        }
    }

    pub fn from_config(config: &PineconeConfig) -> Result<Self, IndexError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| IndexError::NotConfigured("PINECONE_API_KEY not set".into()))?;
        let name = config
            .index
            .clone()
            .ok_or_else(|| IndexError::NotConfigured("PINECONE_INDEX not set".into()))?;
        Ok(Self::new(
            api_key,
            name,
            config.control_url.clone(),
            config.cloud.clone(),
            config.region.clone(),
        ))
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    async fn error_from(response: reqwest::Response) -> IndexError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        IndexError::Api { status, body }
    }

    async fn describe(&self) -> Result<Option<IndexDescription>, IndexError> {
        let url = format!("{}/indexes/{}", self.control_url, self.name);
        let response = self.request(reqwest::Method::GET, url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(Some(response.json().await?))
    }

    async fn wait_until_ready(&self) -> Result<(), IndexError> {
        for _ in 0..READY_MAX_POLLS {
            if let Some(desc) = self.describe().await? {
                if desc.status.as_ref().is_some_and(|s| s.ready) {
                    return Ok(());
                }
            }
            debug!(index = %self.name, "Waiting for index to become ready");
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
        Err(IndexError::NotReady {
            name: self.name.clone(),
            waited_secs: READY_POLL_INTERVAL.as_secs() * u64::from(READY_MAX_POLLS),
        })
    }

    /// Data-plane base URL for this index.
    async fn host(&self) -> Result<&str, IndexError> {
        let host = self
            .host
            .get_or_try_init(|| async {
                let desc = self
                    .describe()
                    .await?
                    .ok_or_else(|| IndexError::NotFound(self.name.clone()))?;
                let host = desc
                    .host
                    .filter(|h| !h.is_empty())
                    .ok_or_else(|| IndexError::NotFound(format!("{} has no host yet", self.name)))?;
                Ok::<_, IndexError>(data_plane_url(&host))
            })
            .await?;
        Ok(host.as_str())
    }
}

fn data_plane_url(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("https://{host}")
    }
}

fn create_body(name: &str, spec: &IndexSpec, cloud: &str, region: &str) -> serde_json::Value {
    json!({
        "name": name,
        "dimension": spec.dimension,
        "metric": spec.metric,
        "spec": { "serverless": { "cloud": cloud, "region": region } },
    })
}

fn upsert_body(records: &[IndexRecord]) -> serde_json::Value {
    let vectors: Vec<serde_json::Value> = records
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "values": r.values,
                "metadata": { "text": r.text },
            })
        })
        .collect();
    json!({ "vectors": vectors })
}

fn into_matches(resp: QueryResponse) -> Vec<IndexMatch> {
    resp.matches
        .into_iter()
        .filter_map(|m| {
            let text = m
                .metadata
                .as_ref()
                .and_then(|md| md.get("text"))
                .and_then(|t| t.as_str())
                .map(str::to_string);
            match text {
                Some(text) => Some(IndexMatch {
                    id: m.id,
                    score: m.score,
                    text,
                }),
                None => {
                    warn!(id = %m.id, "Match has no text payload, skipping");
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self) -> Result<bool, IndexError> {
        Ok(self.describe().await?.is_some())
    }

    async fn dimension(&self) -> Result<Option<usize>, IndexError> {
        Ok(self.describe().await?.and_then(|desc| desc.dimension))
    }

    async fn create(&self, spec: &IndexSpec) -> Result<(), IndexError> {
        info!(
            index = %self.name,
            dimension = spec.dimension,
            metric = %spec.metric,
            cloud = %self.cloud,
            region = %self.region,
            "Creating Pinecone index"
        );
        let url = format!("{}/indexes", self.control_url);
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&create_body(&self.name, spec, &self.cloud, &self.region))
            .send()
            .await?;

        // 409: created concurrently by another loader; fine.
        if !response.status().is_success() && response.status() != StatusCode::CONFLICT {
            return Err(Self::error_from(response).await);
        }
        self.wait_until_ready().await
    }

    async fn upsert(&self, records: &[IndexRecord]) -> Result<usize, IndexError> {
        if records.is_empty() {
            return Ok(0);
        }
        let url = format!("{}/vectors/upsert", self.host().await?);
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&upsert_body(records))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let resp: UpsertResponse = response.json().await?;
        Ok(resp.upserted_count)
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>, IndexError> {
        let url = format!("{}/query", self.host().await?);
        let body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
            "includeValues": false,
        });
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let resp: QueryResponse = response.json().await?;
        Ok(into_matches(resp))
    }
}
