//! Question answering orchestration.
//!
//! The [`Agent`] answers one question in five ordered phases:
//!
//! ```text
//! question → Router (candidate tools)
//!          → VectorIndex::search (citations, prompt context)
//!          → extract + execute each candidate tool
//!          → provider generation, when no tool answered
//!          → compose answer, trace and timings
//! ```
//!
//! Tools and the generation backend report failures as answer text, and
//! anything else that goes wrong is folded into a degraded
//! [`AgentResponse`]. [`Agent::process`] itself never fails.

mod response;
mod router;
pub mod trace;

pub use response::{AgentResponse, Citation};
pub use router::Router;
pub use trace::{StepDetail, TraceStep};

use crate::config::{AgentConfig, Config};
use crate::provider::{GenerateRequest, Provider};
use crate::rag::{self, DocumentStore, RagError, SearchResult, VectorIndex};
use geoqa_tools::ToolRegistry;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use trace::{elapsed_ms, round2, Trace};

const NO_ANSWER: &str = "I couldn't find specific information to answer your question. \
    Please provide more details or check if your question relates to settlement calculations, \
    bearing capacity analysis, or CPT/liquefaction analysis.";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Failed to load documents: {0}")]
    Corpus(#[source] RagError),

    #[error("Failed to build index: {0}")]
    Index(#[source] RagError),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RagError),
}

pub type Result<T> = std::result::Result<T, AgentError>;

/// Answers technical questions with retrieval, calculators and a
/// generation fallback.
///
/// Holds only shared, read-only state, so one agent can serve concurrent
/// callers.
///
/// # Examples
///
/// ```no_run
/// use geoqa_core::{Agent, Config, OllamaProvider};
/// use std::sync::Arc;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::load_or_default();
/// let provider = Arc::new(OllamaProvider::new(&config.llm)?);
/// let agent = Agent::from_config(&config, provider, geoqa_std::default_registry())?;
///
/// let response = agent.ask("Calculate settlement for load = 100 and Young's modulus = 20000");
/// println!("{}", response.answer);
/// # Ok(())
/// # }
/// ```
pub struct Agent {
    index: Arc<VectorIndex>,
    provider: Arc<dyn Provider>,
    registry: ToolRegistry,
    router: Router,
    model: String,
    temperature: f64,
    top_k: usize,
    settings: AgentConfig,
}

impl Agent {
    /// Creates an agent over an already built index.
    pub fn new(
        config: &Config,
        index: Arc<VectorIndex>,
        provider: Arc<dyn Provider>,
        registry: ToolRegistry,
    ) -> Self {
        let router = Router::new(&registry, &config.agent.triggers);
        for name in config.agent.triggers.keys() {
            if registry.get(name).is_none() {
                warn!(tool_name = %name, "Trigger override for unknown tool ignored");
            }
        }

        Self {
            index,
            provider,
            registry,
            router,
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            top_k: config.rag.top_k,
            settings: config.agent.clone(),
        }
    }

    /// Loads the corpus and builds the index described by `config`.
    ///
    /// Uses `rag.documents_dir` when set, the built-in corpus otherwise.
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn Provider>,
        registry: ToolRegistry,
    ) -> Result<Self> {
        let store = match &config.rag.documents_dir {
            Some(dir) => DocumentStore::from_dir(Path::new(dir)).map_err(AgentError::Corpus)?,
            None => DocumentStore::builtin(),
        };
        let embedder = rag::from_config(&config.rag.embedder, Arc::clone(&provider));
        let index = VectorIndex::build(&store, embedder).map_err(AgentError::Index)?;

        Ok(Self::new(config, Arc::new(index), provider, registry))
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Answers a question without extra context.
    pub fn ask(&self, question: &str) -> AgentResponse {
        self.process(question, "")
    }

    /// Answers a question. `context` is only consulted for parameter
    /// extraction.
    ///
    /// Never fails: errors become a response whose answer describes the
    /// failure, with the trace recorded up to that point.
    pub fn process(&self, question: &str, context: &str) -> AgentResponse {
        let started = Instant::now();
        let mut trace = Trace::default();
        info!(question_len = question.len(), "Processing question");

        match self.run(question, context, started, &mut trace) {
            Ok(response) => {
                info!(
                    tools_used = ?response.tools_used,
                    citations = response.citations.len(),
                    duration_ms = response.total_duration_ms,
                    "Question answered"
                );
                response
            }
            Err(e) => {
                error!(error = %e, "Agent processing failed");
                AgentResponse {
                    answer: format!("An error occurred while processing your question: {}", e),
                    citations: Vec::new(),
                    tools_used: Vec::new(),
                    retrieval_used: false,
                    trace: trace.into_steps(),
                    total_duration_ms: round2(elapsed_ms(started)),
                }
            }
        }
    }

    fn run(
        &self,
        question: &str,
        context: &str,
        started: Instant,
        trace: &mut Trace,
    ) -> Result<AgentResponse> {
        let candidates = self.router.candidates(question);

        let retrieval_start = Instant::now();
        let results = self.index.search(question, self.top_k)?;
        trace.record(
            trace::RETRIEVAL,
            retrieval_start,
            StepDetail::Retrieval {
                results_count: results.len(),
                top_score: results.first().map_or(0.0, |r| r.score),
            },
        );

        let citations: Vec<Citation> = results
            .iter()
            .take(self.settings.citation_count)
            .map(|r| Citation {
                source: r.document.filename.clone(),
                title: r.document.title.clone(),
                score: r.score,
            })
            .collect();

        let mut segments = Vec::new();
        let mut tools_used = Vec::new();

        for tool in self.registry.all() {
            if !candidates.contains(&tool.name()) {
                continue;
            }

            let tool_start = Instant::now();
            let Some(input) = tool.extract(question, context) else {
                debug!(tool_name = %tool.name(), "Parameters missing");
                segments.push(tool.usage_hint().to_string());
                continue;
            };

            match tool.execute(input) {
                Ok(result) => {
                    info!(tool_name = %tool.name(), value = result.value(), "Tool executed");
                    segments.push(result.summary());
                    tools_used.push(tool.name().to_string());
                    trace.record(
                        tool.trace_step(),
                        tool_start,
                        StepDetail::Tool {
                            inputs: result.inputs(),
                            result: result.value(),
                        },
                    );
                }
                Err(e) => {
                    warn!(tool_name = %tool.name(), error = %e, "Tool rejected input");
                    segments.push(format!("Error in {} calculation: {}", tool.label(), e));
                }
            }
        }

        if segments.is_empty() || (!results.is_empty() && tools_used.is_empty()) {
            let generation_start = Instant::now();
            let generated = self.generate(question, &results);
            trace.record(trace::GENERATION, generation_start, StepDetail::Empty {});
            if !generated.is_empty() {
                segments.push(generated);
            }
        }

        let answer = if segments.is_empty() {
            NO_ANSWER.to_string()
        } else {
            segments.join(&self.settings.separator)
        };

        let total = elapsed_ms(started);
        let residual = (round2(total) - trace.total_ms()).max(0.0);
        trace.push(trace::FINAL_ANSWER, residual, StepDetail::Empty {});

        Ok(AgentResponse {
            answer,
            citations,
            tools_used,
            retrieval_used: true,
            trace: std::mem::take(trace).into_steps(),
            total_duration_ms: round2(total),
        })
    }

    /// One generation call. Failures come back as answer text.
    fn generate(&self, question: &str, results: &[SearchResult]) -> String {
        let prompt = build_prompt(question, results, self.settings.excerpt_chars);
        let request = GenerateRequest::new(&self.model, prompt).with_temperature(self.temperature);

        debug!(provider = self.provider.name(), model = %self.model, "Calling generation backend");
        match self.provider.generate(request) {
            Ok(text) => text,
            Err(e) => {
                error!(provider = self.provider.name(), error = %e, "Generation failed");
                format!("Error calling {}: {}", self.provider.name(), e)
            }
        }
    }
}

fn build_prompt(question: &str, results: &[SearchResult], excerpt_chars: usize) -> String {
    let context = results
        .iter()
        .map(|r| format!("{}: {}", r.document.title, r.document.excerpt(excerpt_chars)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Question: {}\nContext from knowledge base:\n{}\n\nProvide a concise and accurate answer based on the context and question.",
        question, context
    )
}
