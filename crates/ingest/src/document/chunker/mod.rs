//! Recursive character chunking.
//!
//! Splits text on the first separator that occurs in it (paragraph, line,
//! word, then single characters), merges the pieces back up to the size
//! limit, and carries a bounded tail of each emitted chunk into the next one.

mod helpers;
mod strategies;
mod types;

pub use strategies::split_text;
pub use types::{ChunkConfig, DEFAULT_SEPARATORS};
