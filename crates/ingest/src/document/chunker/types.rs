//! Chunk configuration.

use persona_core::config::ChunkingConfig;

/// Separators tried in order: paragraph, line, word, character.
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Configuration for the chunking engine. Sizes are in characters.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Maximum characters per chunk (default: 1000).
    pub chunk_size: usize,
    /// Characters of trailing context kept between adjacent chunks (default: 200).
    pub chunk_overlap: usize,
    /// Separators in priority order. An empty string splits into characters.
    pub separators: Vec<String>,
}

impl ChunkConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

impl From<&ChunkingConfig> for ChunkConfig {
    fn from(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }
}
