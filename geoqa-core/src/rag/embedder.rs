//! Embedding generation.
//!
//! Two interchangeable embedding functions back the vector index:
//! [`HashingEmbedder`], which needs nothing but the text, and
//! [`ProviderEmbedder`], which calls the provider's embedding model.

use crate::config::EmbedderConfig;
use crate::provider::{Provider, ProviderError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during embedding generation.
#[derive(Debug, Error)]
pub enum EmbedderError {
    /// The provider API returned an error.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider returned an empty vector.
    #[error("No embeddings returned")]
    NoEmbeddings,
}

/// Result type for embedding operations.
pub type Result<T> = std::result::Result<T, EmbedderError>;

/// Deterministic text to fixed-length vector function.
///
/// The same embedder must be used for documents at build time and for
/// queries at search time.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Output dimension, if known before the first call.
    fn dimensions(&self) -> Option<usize>;

    fn name(&self) -> &str;
}

/// Builds the embedder selected in config.
pub fn from_config(config: &EmbedderConfig, provider: Arc<dyn Provider>) -> Arc<dyn Embedder> {
    match config {
        EmbedderConfig::Hashing { dimensions } => Arc::new(HashingEmbedder::new(*dimensions)),
        EmbedderConfig::Provider { model } => Arc::new(ProviderEmbedder::new(provider, model.clone())),
    }
}

/// Generates vector embeddings through a provider's embedding model.
///
/// # Supported Models
///
/// Common Ollama embedding models:
/// - `nomic-embed-text` - 768-dimensional embeddings, good general purpose
/// - `mxbai-embed-large` - 1024-dimensional embeddings, higher quality
/// - `all-minilm` - 384-dimensional, small and fast
#[derive(Clone)]
pub struct ProviderEmbedder {
    provider: Arc<dyn Provider>,
    model: String,
}

impl ProviderEmbedder {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

impl Embedder for ProviderEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.provider.embed(text, &self.model)?;
        if embedding.is_empty() {
            return Err(EmbedderError::NoEmbeddings);
        }
        Ok(embedding)
    }

    fn dimensions(&self) -> Option<usize> {
        None
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Feature-hashing term-frequency embeddings.
///
/// Lowercased alphanumeric terms of two or more characters are hashed into
/// a fixed number of buckets with FNV-1a and weighted by term frequency times
/// a length-based stand-in for IDF. Lexical rather than semantic, but always
/// available and fully deterministic.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(term: &str, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h % dims as u64) as usize
    }

    fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|s| s.chars().count() >= 2)
            .map(str::to_lowercase)
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut tf: HashMap<String, f32> = HashMap::new();
        let mut total = 0usize;
        for token in Self::tokenize(text) {
            *tf.entry(token).or_default() += 1.0;
            total += 1;
        }

        let mut vector = vec![0.0f32; self.dimensions];
        if total == 0 {
            return Ok(vector);
        }

        for (term, count) in &tf {
            let freq = count / total as f32;
            let idf = 1.0 + (term.chars().count() as f32).ln();
            vector[Self::bucket(term, self.dimensions)] += freq * idf;
        }

        Ok(vector)
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dimensions)
    }

    fn name(&self) -> &str {
        "hashing"
    }
}
