use std::cell::RefCell;
use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::PersonaError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Reads profiled keys: tries {PROFILE}_{KEY} first, falls back to {KEY}.
/// Empty values count as unset. Values that fail to parse are remembered
/// so `validate` can reject them instead of running on the default.
struct EnvReader<'a> {
    profile: &'a str,
    lookup: &'a dyn Fn(&str) -> Option<String>,
    unparsed: RefCell<Vec<String>>,
}

impl EnvReader<'_> {
    fn opt(&self, key: &str) -> Option<String> {
        let get = |k: &str| (self.lookup)(k).filter(|s| !s.trim().is_empty());
        if !self.profile.is_empty() {
            if let Some(v) = get(&format!("{}_{}", self.profile, key)) {
                return Some(v);
            }
        }
        get(key)
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.opt(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.opt(key) else {
            return default;
        };
        match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                self.unparsed.borrow_mut().push(format!("{key}={}", raw.trim()));
                default
            }
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub chunking: ChunkingConfig,
    pub pinecone: PineconeConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub persona: PersonaConfig,
    /// `KEY=value` pairs whose value could not be parsed, in read order.
    #[serde(skip)]
    pub unparsed: Vec<String>,
}

/// Which command is about to run; decides which credentials must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// `persona load`: index + embedding credentials.
    Load,
    /// `persona serve`: index + embedding + language model credentials.
    Serve,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `PERSONA_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = process_env("PERSONA_PROFILE").unwrap_or_default();
        Self::from_lookup(&profile, &process_env)
    }

    /// Build config for a named profile from an arbitrary key lookup.
    pub fn from_lookup(profile: &str, lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let p = profile.trim().to_uppercase();
        let r = EnvReader {
            profile: &p,
            lookup,
            unparsed: RefCell::new(Vec::new()),
        };
        let mut config = Self {
            profile: p.clone(),
            server: ServerConfig::read(&r),
            storage: StorageConfig::read(&r),
            chunking: ChunkingConfig::read(&r),
            pinecone: PineconeConfig::read(&r),
            embedding: EmbeddingConfig::read(&r),
            llm: LlmConfig::read(&r),
            retrieval: RetrievalConfig::read(&r),
            persona: PersonaConfig::read(&r),
            unparsed: Vec::new(),
        };
        config.unparsed = r.unparsed.into_inner();
        config
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Keys that must be set before running the given command, in a stable order.
    pub fn missing(&self, requirement: Requirement) -> Vec<String> {
        let mut missing = Vec::new();
        if self.pinecone.api_key.is_none() {
            missing.push("PINECONE_API_KEY".to_string());
        }
        if self.pinecone.index.is_none() {
            missing.push("PINECONE_INDEX".to_string());
        }

        let mut providers = vec![self.embedding.provider.as_str()];
        if requirement == Requirement::Serve {
            providers.push(self.llm.provider.as_str());
        }
        if providers.contains(&"gemini") && self.llm.google_api_key.is_none() {
            missing.push("GOOGLE_API_KEY".to_string());
        }
        if providers.contains(&"openai") && self.llm.openai_api_key.is_none() {
            missing.push("OPENAI_API_KEY".to_string());
        }
        missing
    }

    /// Fail fast with the full list of missing keys and any invalid values.
    pub fn require(&self, requirement: Requirement) -> Result<(), PersonaError> {
        let missing = self.missing(requirement);
        if !missing.is_empty() {
            return Err(PersonaError::MissingConfig(missing));
        }
        self.validate()
    }

    /// Sanity checks that do not depend on credentials.
    pub fn validate(&self) -> Result<(), PersonaError> {
        if !self.unparsed.is_empty() {
            return Err(PersonaError::InvalidConfig(format!(
                "unparseable values: {}",
                self.unparsed.join(", ")
            )));
        }
        if self.chunking.chunk_size == 0 {
            return Err(PersonaError::InvalidConfig("CHUNK_SIZE must be > 0".into()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(PersonaError::InvalidConfig(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.embedding.dimensions == 0 {
            return Err(PersonaError::InvalidConfig("EMBEDDING_DIMENSIONS must be > 0".into()));
        }
        if self.retrieval.top_k == 0 {
            return Err(PersonaError::InvalidConfig("RETRIEVAL_TOP_K must be > 0".into()));
        }
        for (key, provider) in [
            ("EMBEDDING_PROVIDER", &self.embedding.provider),
            ("LLM_PROVIDER", &self.llm.provider),
        ] {
            if !matches!(provider.as_str(), "gemini" | "openai") {
                return Err(PersonaError::InvalidConfig(format!(
                    "{key} must be 'gemini' or 'openai', got '{provider}'"
                )));
            }
        }
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:     {}:{} (cors: {})", self.server.host, self.server.port, self.server.cors_origin);
        tracing::info!("  storage:    data_dir={}", self.storage.data_dir.display());
        tracing::info!("  chunking:   size={}, overlap={}", self.chunking.chunk_size, self.chunking.chunk_overlap);
        tracing::info!("  pinecone:   index={}", self.pinecone.index.as_deref().unwrap_or("(none)"));
        tracing::info!("  embedding:  provider={}, model={}, dims={}", self.embedding.provider, self.embedding.model, self.embedding.dimensions);
        tracing::info!("  llm:        provider={}, temperature={}", self.llm.provider, self.llm.temperature);
        tracing::info!("  persona:    {}", self.persona.name);
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "pinecone": {
                "index": self.pinecone.index,
                "configured": self.pinecone.is_configured(),
            },
            "embedding": {
                "provider": self.embedding.provider,
                "model": self.embedding.model,
                "dimensions": self.embedding.dimensions,
                "configured": self.llm.has_key_for(&self.embedding.provider),
            },
            "llm": {
                "provider": self.llm.provider,
                "model": self.llm.model_name(),
                "configured": self.llm.has_key_for(&self.llm.provider),
            },
            "retrieval": { "top_k": self.retrieval.top_k },
            "persona": self.persona.name,
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin; `*` permits any.
    pub cors_origin: String,
}

impl ServerConfig {
    fn read(r: &EnvReader) -> Self {
        Self {
            host: r.or("HOST", "0.0.0.0"),
            port: r.parsed("PORT", 8000),
            cors_origin: r.or("CORS_ORIGIN", "http://localhost:3000"),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub profile_file: String,
    pub chunks_file: String,
}

impl StorageConfig {
    fn read(r: &EnvReader) -> Self {
        Self {
            data_dir: PathBuf::from(r.or("DATA_DIR", "data")),
            profile_file: r.or("PROFILE_FILE", "Portfoliodata.json"),
            chunks_file: r.or("CHUNKS_FILE", "processed_chunks.json"),
        }
    }

    pub fn profile_path(&self) -> PathBuf {
        self.data_dir.join(&self.profile_file)
    }

    pub fn chunks_path(&self) -> PathBuf {
        self.data_dir.join(&self.chunks_file)
    }
}

// ── Chunking ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters of trailing context carried into the next chunk.
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    fn read(r: &EnvReader) -> Self {
        Self {
            chunk_size: r.parsed("CHUNK_SIZE", 1000),
            chunk_overlap: r.parsed("CHUNK_OVERLAP", 200),
        }
    }
}

// ── Pinecone ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PineconeConfig {
    pub api_key: Option<String>,
    pub index: Option<String>,
    pub cloud: String,
    pub region: String,
    pub metric: String,
    pub control_url: String,
}

impl PineconeConfig {
    fn read(r: &EnvReader) -> Self {
        Self {
            api_key: r.opt("PINECONE_API_KEY"),
            index: r.opt("PINECONE_INDEX"),
            cloud: r.or("PINECONE_CLOUD", "aws"),
            region: r.or("PINECONE_REGION", "us-east-1"),
            metric: r.or("INDEX_METRIC", "cosine"),
            control_url: r.or("PINECONE_CONTROL_URL", "https://api.pinecone.io"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.index.is_some()
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "gemini", "openai"
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
    pub batch_size: usize,
}

impl EmbeddingConfig {
    fn read(r: &EnvReader) -> Self {
        Self {
            provider: r.or("EMBEDDING_PROVIDER", "gemini").to_lowercase(),
            model: r.or("EMBEDDING_MODEL", "text-embedding-004"),
            dimensions: r.parsed("EMBEDDING_DIMENSIONS", 768),
            batch_size: r.parsed("EMBEDDING_BATCH_SIZE", 64),
        }
    }
}

// ── LLM (Gemini / OpenAI) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "gemini", "openai"
    pub provider: String,
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn read(r: &EnvReader) -> Self {
        Self {
            provider: r.or("LLM_PROVIDER", "gemini").to_lowercase(),
            google_api_key: r.opt("GOOGLE_API_KEY"),
            gemini_model: r.or("GEMINI_MODEL", "gemini-2.0-flash-lite-001"),
            openai_api_key: r.opt("OPENAI_API_KEY"),
            openai_model: r.or("OPENAI_MODEL", "gpt-4o-mini"),
            openai_base_url: r.or("OPENAI_BASE_URL", "https://api.openai.com"),
            temperature: r.parsed("LLM_TEMPERATURE", 0.7),
            max_tokens: r.parsed("LLM_MAX_TOKENS", 1024),
        }
    }

    /// Whether the credential for `provider` (gemini/openai) is present.
    pub fn has_key_for(&self, provider: &str) -> bool {
        match provider {
            "gemini" => self.google_api_key.is_some(),
            "openai" => self.openai_api_key.is_some(),
            _ => false,
        }
    }

    pub fn model_name(&self) -> &str {
        match self.provider.as_str() {
            "openai" => &self.openai_model,
            _ => &self.gemini_model,
        }
    }
}

// ── Retrieval ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl RetrievalConfig {
    fn read(r: &EnvReader) -> Self {
        Self {
            top_k: r.parsed("RETRIEVAL_TOP_K", 5),
        }
    }
}

// ── Persona ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// The person the model speaks as.
    pub name: String,
}

impl PersonaConfig {
    fn read(r: &EnvReader) -> Self {
        Self {
            name: r.or("PERSONA_NAME", "Alex Morgan"),
        }
    }
}
