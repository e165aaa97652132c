pub mod memory;
pub mod pinecone;
pub mod traits;

pub use memory::InMemoryIndex;
pub use pinecone::PineconeIndex;
pub use traits::{IndexError, IndexMatch, IndexRecord, IndexSpec, VectorIndex};
