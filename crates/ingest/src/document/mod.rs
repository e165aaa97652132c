//! Profile documents: chunking and the on-disk chunk artifact.

pub mod chunker;

use std::path::Path;

use persona_core::{PersonaError, ProfileRecord};
use tracing::{info, warn};

pub use chunker::{split_text, ChunkConfig};

/// Lazily chunk every rendered section of `profile`.
///
/// Sections are split one at a time as the iterator advances. Calling this
/// again restarts from the first section and yields the same sequence.
pub fn profile_chunks<'a>(
    profile: &'a ProfileRecord,
    config: &'a ChunkConfig,
) -> impl Iterator<Item = String> + 'a {
    profile
        .documents()
        .into_iter()
        .flat_map(move |doc| split_text(&doc, config))
}

/// Load the profile at `path` and chunk it.
///
/// A missing or malformed file is logged and yields no chunks.
pub fn chunk_profile_file(path: &Path, config: &ChunkConfig) -> Vec<String> {
    let profile = match ProfileRecord::load(path) {
        Ok(profile) => profile,
        Err(PersonaError::Io(e)) => {
            warn!(path = %path.display(), error = %e, "Profile file not readable, no chunks produced");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Profile file malformed, no chunks produced");
            return Vec::new();
        }
    };

    let chunks: Vec<String> = profile_chunks(&profile, config).collect();
    info!(path = %path.display(), chunks = chunks.len(), "Profile chunked");
    chunks
}

/// Write chunks as a pretty-printed JSON array, creating parent directories.
pub fn write_chunks(path: &Path, chunks: &[String]) -> Result<(), PersonaError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(chunks)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), chunks = chunks.len(), "Chunks written");
    Ok(())
}

/// Read a chunk file written by [`write_chunks`].
///
/// An absent file or an empty list is an error: there is nothing to load.
pub fn read_chunks(path: &Path) -> Result<Vec<String>, PersonaError> {
    if !path.exists() {
        return Err(PersonaError::Other(format!(
            "Chunk file {} not found; run `persona chunk` first",
            path.display()
        )));
    }
    let raw = std::fs::read_to_string(path)?;
    let chunks: Vec<String> = serde_json::from_str(&raw)?;
    if chunks.is_empty() {
        return Err(PersonaError::Other(format!(
            "Chunk file {} is empty; run `persona chunk` first",
            path.display()
        )));
    }
    Ok(chunks)
}
