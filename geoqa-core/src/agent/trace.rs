//! Per-question execution trace.

use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

pub const RETRIEVAL: &str = "retrieval";
pub const GENERATION: &str = "ollama_generation";
pub const FINAL_ANSWER: &str = "final_answer_generation";

/// One timed phase of a `process` call.
///
/// Serialises flat: `{"step": "retrieval", "duration_ms": 1.2, "results_count": 3, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStep {
    pub step: String,
    pub duration_ms: f64,
    #[serde(flatten)]
    pub detail: StepDetail,
}

/// Step-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepDetail {
    Retrieval { results_count: usize, top_score: f32 },
    Tool { inputs: Value, result: f64 },
    Empty {},
}

/// Append-only list of steps.
#[derive(Debug, Default, Clone)]
pub(crate) struct Trace {
    steps: Vec<TraceStep>,
}

impl Trace {
    pub fn record(&mut self, step: impl Into<String>, started: Instant, detail: StepDetail) {
        self.push(step, elapsed_ms(started), detail);
    }

    pub fn push(&mut self, step: impl Into<String>, duration_ms: f64, detail: StepDetail) {
        self.steps.push(TraceStep {
            step: step.into(),
            duration_ms: round2(duration_ms),
            detail,
        });
    }

    /// Sum of the durations recorded so far.
    pub fn total_ms(&self) -> f64 {
        self.steps.iter().map(|s| s.duration_ms).sum()
    }

    pub fn into_steps(self) -> Vec<TraceStep> {
        self.steps
    }
}

pub(crate) fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_serializes_flat() {
        let step = TraceStep {
            step: RETRIEVAL.into(),
            duration_ms: 1.5,
            detail: StepDetail::Retrieval {
                results_count: 3,
                top_score: 0.5,
            },
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"step": "retrieval", "duration_ms": 1.5, "results_count": 3, "top_score": 0.5})
        );
    }

    #[test]
    fn test_tool_and_empty_detail() {
        let tool = TraceStep {
            step: "settlement_tool".into(),
            duration_ms: 0.1,
            detail: StepDetail::Tool {
                inputs: serde_json::json!({"load": 100.0}),
                result: 0.005,
            },
        };
        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["inputs"]["load"], 100.0);
        assert_eq!(json["result"], 0.005);

        let empty = TraceStep {
            step: GENERATION.into(),
            duration_ms: 2.0,
            detail: StepDetail::Empty {},
        };
        assert_eq!(
            serde_json::to_value(&empty).unwrap(),
            serde_json::json!({"step": "ollama_generation", "duration_ms": 2.0})
        );
    }

    #[test]
    fn test_push_rounds_and_sums() {
        let mut trace = Trace::default();
        trace.push(RETRIEVAL, 1.234, StepDetail::Empty {});
        trace.push(GENERATION, 2.0, StepDetail::Empty {});
        assert!((trace.total_ms() - 3.23).abs() < 1e-9);
        let steps = trace.into_steps();
        assert_eq!(steps[0].duration_ms, 1.23);
    }
}
