//! Retrieval over the geotechnical knowledge base.
//!
//! # Architecture
//!
//! - [`DocumentStore`]: the fixed, ordered corpus (built in or loaded from a directory)
//! - [`Embedder`]: text to vector, either [`HashingEmbedder`] or [`ProviderEmbedder`]
//! - [`VectorIndex`]: one normalised vector per document, exact cosine top-k search
//!
//! Documents are indexed whole; there is no chunking. The index is built
//! once and never mutated, so a single instance can serve concurrent
//! queries.

mod corpus;
mod embedder;
mod index;
mod types;

pub use corpus::DocumentStore;
pub use embedder::{from_config, Embedder, EmbedderError, HashingEmbedder, ProviderEmbedder};
pub use index::VectorIndex;
pub use types::{Document, Embedding, SearchResult};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("Embedder error: {0}")]
    Embedder(#[from] EmbedderError),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Failed to read documents: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid corpus: {0}")]
    Corpus(String),
}

pub type Result<T> = std::result::Result<T, RagError>;
