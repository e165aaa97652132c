//! Recursive splitting strategy.

use super::helpers::{char_len, merge_splits, split_on};
use super::types::ChunkConfig;

/// Split `text` into chunks of at most `config.chunk_size` characters.
///
/// Output is trimmed, never empty, and deterministic for a given input and
/// configuration. Empty or whitespace-only input yields no chunks.
pub fn split_text(text: &str, config: &ChunkConfig) -> Vec<String> {
    split_recursive(text, &config.separators, config)
}

fn split_recursive(text: &str, separators: &[String], config: &ChunkConfig) -> Vec<String> {
    // Pick the first separator present in the text; the empty separator
    // always matches.
    let mut separator = "";
    let mut remaining: &[String] = &[];
    for (i, candidate) in separators.iter().enumerate() {
        if candidate.is_empty() {
            break;
        }
        if text.contains(candidate.as_str()) {
            separator = candidate;
            remaining = &separators[i + 1..];
            break;
        }
    }

    let mut chunks = Vec::new();
    let mut small: Vec<&str> = Vec::new();

    for piece in split_on(text, separator) {
        if char_len(piece) < config.chunk_size {
            small.push(piece);
            continue;
        }

        if !small.is_empty() {
            chunks.extend(merge_splits(&small, separator, config));
            small.clear();
        }

        if remaining.is_empty() {
            let trimmed = piece.trim();
            if !trimmed.is_empty() {
                chunks.push(trimmed.to_string());
            }
        } else {
            chunks.extend(split_recursive(piece, remaining, config));
        }
    }

    if !small.is_empty() {
        chunks.extend(merge_splits(&small, separator, config));
    }
    chunks
}
