//! Ingestion side of the persona backend: profile chunking, embedding, and
//! loading chunks into the similarity index the chat workflow reads from.

pub mod document;
pub mod embedding;
pub mod index;
pub mod loader;

pub use loader::{IndexLoader, LoadError, LoadReport};
