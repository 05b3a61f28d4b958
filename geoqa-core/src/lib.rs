//! geoqa-core - Question answering engine for geotechnical engineering
//!
//! Provides the components behind a technical Q&A agent:
//! - Retrieval over a small document corpus (hashing or provider embeddings)
//! - Keyword routing to deterministic calculators
//! - Generation fallback through a provider (Ollama)
//! - Per-question execution traces, request metrics and an evaluation suite
//!
//! ## Primary API
//!
//! Build an [`Agent`] with [`Agent::from_config`] and call
//! [`Agent::process`].

pub mod agent;
pub mod config;
pub mod evaluation;
pub mod metrics;
pub mod provider;
pub mod rag;

pub use agent::{Agent, AgentError, AgentResponse, Citation, Router, StepDetail, TraceStep};
pub use config::{AgentConfig, Config, ConfigError, EmbedderConfig, LlmConfig, RagConfig};
pub use evaluation::{EvalCase, EvaluationReport, Evaluator};
pub use metrics::{MetricsSnapshot, QueryMetrics};
pub use provider::{GenerateRequest, OllamaProvider, Provider, ProviderError};
pub use rag::{Document, DocumentStore, Embedder, RagError, SearchResult, VectorIndex};
