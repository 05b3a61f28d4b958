//! Text generation provider abstraction layer.
//!
//! This module defines the interface the agent uses to reach a generation
//! backend for free-text answers and, optionally, embeddings.

mod types;
pub mod ollama;

// Re-export common types
pub use types::{
    EmbedRequest, EmbedResponse, GenerateRequest, Provider, ProviderError, Result,
};

// Re-export provider implementations
pub use ollama::OllamaProvider;
