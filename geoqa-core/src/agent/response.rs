use super::trace::TraceStep;
use serde::Serialize;

/// A retrieved document reported alongside the answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    /// Document filename
    pub source: String,
    pub title: String,
    pub score: f32,
}

/// Everything produced by one `process` call.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResponse {
    pub answer: String,
    pub citations: Vec<Citation>,
    /// Names of the tools that produced a result, in execution order
    pub tools_used: Vec<String>,
    pub retrieval_used: bool,
    pub trace: Vec<TraceStep>,
    pub total_duration_ms: f64,
}

impl AgentResponse {
    /// First trace step with the given name.
    pub fn step(&self, name: &str) -> Option<&TraceStep> {
        self.trace.iter().find(|s| s.step == name)
    }

    pub fn used_tool(&self, name: &str) -> bool {
        self.tools_used.iter().any(|t| t == name)
    }
}
