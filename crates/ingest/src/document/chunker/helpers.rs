//! Splitting and merging utilities used by the recursive strategy.

use std::collections::VecDeque;

use super::types::ChunkConfig;

/// Length in characters, not bytes.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split `text` on `separator`, dropping empty pieces. An empty separator
/// yields one piece per character.
pub(crate) fn split_on<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }
    text.split(separator).filter(|s| !s.is_empty()).collect()
}

/// Join pieces with `separator` and trim. Returns `None` for blank output.
fn join_trimmed(pieces: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = pieces.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Greedily merge pieces (each shorter than `chunk_size`) into chunks of at
/// most `chunk_size` characters. When a chunk is emitted, pieces are dropped
/// from its front until at most `chunk_overlap` characters remain; those
/// carry over as the start of the next chunk.
pub(crate) fn merge_splits(splits: &[&str], separator: &str, config: &ChunkConfig) -> Vec<String> {
    let sep_len = char_len(separator);
    let mut chunks = Vec::new();
    let mut current: VecDeque<&str> = VecDeque::new();
    let mut total = 0usize;

    for &piece in splits {
        let len = char_len(piece);
        let joiner = if current.is_empty() { 0 } else { sep_len };

        if total + len + joiner > config.chunk_size && !current.is_empty() {
            if let Some(chunk) = join_trimmed(&current, separator) {
                chunks.push(chunk);
            }
            // Shrink to the overlap window, and further if the next piece
            // still would not fit.
            while total > config.chunk_overlap
                || (total > 0
                    && total + len + if current.is_empty() { 0 } else { sep_len } > config.chunk_size)
            {
                let had_more = current.len() > 1;
                let Some(first) = current.pop_front() else {
                    break;
                };
                total -= char_len(first) + if had_more { sep_len } else { 0 };
            }
        }

        current.push_back(piece);
        total += len + if current.len() > 1 { sep_len } else { 0 };
    }

    if let Some(chunk) = join_trimmed(&current, separator) {
        chunks.push(chunk);
    }
    chunks
}
