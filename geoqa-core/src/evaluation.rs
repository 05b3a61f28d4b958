//! Offline quality checks for retrieval and answers.
//!
//! Runs a fixed question set through the index and the agent and reports
//! hit@k, keyword coverage of the answers and how often the expected tool
//! fired.

use crate::agent::Agent;
use crate::metrics::QueryMetrics;
use crate::rag::{RagError, VectorIndex};
use serde::Serialize;
use tracing::{debug, info};

/// Fraction of expected keywords an answer must exceed to count as a match.
pub const KEYWORD_THRESHOLD: f64 = 0.5;

/// One benchmark question.
#[derive(Debug, Clone, Serialize)]
pub struct EvalCase {
    pub question: String,
    /// Filenames of which at least one should appear in the top k results.
    /// Empty for calculation questions, which are skipped by retrieval scoring.
    pub expected_sources: Vec<String>,
    pub expected_keywords: Vec<String>,
    pub expected_tool: Option<String>,
}

impl EvalCase {
    fn new(question: &str, sources: &[&str], keywords: &[&str], tool: Option<&str>) -> Self {
        Self {
            question: question.to_string(),
            expected_sources: sources.iter().map(|s| s.to_string()).collect(),
            expected_keywords: keywords.iter().map(|k| k.to_string()).collect(),
            expected_tool: tool.map(str::to_string),
        }
    }
}

/// The standard question set over the built-in corpus.
pub fn default_cases() -> Vec<EvalCase> {
    vec![
        EvalCase::new(
            "What is CPT analysis used for in settlement calculations?",
            &["cpt_analysis_basics.md", "cpt_correlations.md"],
            &["cone penetration test", "tip resistance", "settlement", "modulus"],
            None,
        ),
        EvalCase::new(
            "How is liquefaction potential assessed using CPT data?",
            &["liquefaction_analysis.md"],
            &["liquefaction", "cyclic resistance", "factor of safety", "cpt"],
            None,
        ),
        EvalCase::new(
            "Calculate settlement for load = 150 and Young's modulus = 30000",
            &[],
            &["settlement", "0.005", "calculation"],
            Some("settlement_calculator"),
        ),
        EvalCase::new(
            "What are the main features of Settle3 software?",
            &["settle3_help_overview.md"],
            &["settle3", "settlement analysis", "3d", "multi-layer"],
            None,
        ),
        EvalCase::new(
            "Calculate bearing capacity for B = 2, gamma = 18, Df = 1.5, friction angle = 35",
            &[],
            &["bearing capacity", "ultimate", "terzaghi"],
            Some("bearing_capacity_calculator"),
        ),
        EvalCase::new(
            "How do you correlate CPT data to soil strength parameters?",
            &["cpt_correlations.md"],
            &["correlations", "undrained shear strength", "friction angle"],
            None,
        ),
        EvalCase::new(
            "What is the difference between immediate and consolidation settlement?",
            &["settlement_calculation_methods.md"],
            &["immediate settlement", "consolidation", "primary", "secondary"],
            None,
        ),
        EvalCase::new(
            "What are bearing capacity factors Nq and Nr?",
            &["bearing_capacity_fundamentals.md"],
            &["bearing capacity factors", "terzaghi", "friction angle", "nq", "nr"],
            None,
        ),
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrievalDetail {
    pub question: String,
    pub expected: Vec<String>,
    pub retrieved: Vec<String>,
    pub hit: bool,
    pub top_score: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrievalReport {
    pub k: usize,
    pub hit_at_k: f64,
    pub avg_confidence: f64,
    pub total_evaluated: usize,
    pub details: Vec<RetrievalDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerDetail {
    pub question: String,
    pub expected_keywords: Vec<String>,
    pub keyword_score: f64,
    pub tools_used: Vec<String>,
    pub answer_length: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerReport {
    pub keyword_match_rate: f64,
    pub tool_accuracy: f64,
    pub total_evaluated: usize,
    pub details: Vec<AnswerDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    pub hit_at_k: f64,
    pub keyword_match_rate: f64,
    pub tool_accuracy: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub retrieval: RetrievalReport,
    pub answers: AnswerReport,
    pub summary: EvaluationSummary,
}

/// Runs [`EvalCase`]s against an agent and its index.
pub struct Evaluator<'a> {
    agent: &'a Agent,
    cases: Vec<EvalCase>,
    metrics: Option<&'a QueryMetrics>,
}

impl<'a> Evaluator<'a> {
    pub fn new(agent: &'a Agent) -> Self {
        Self {
            agent,
            cases: default_cases(),
            metrics: None,
        }
    }

    pub fn with_cases(mut self, cases: Vec<EvalCase>) -> Self {
        self.cases = cases;
        self
    }

    /// Records every answered question into `metrics`.
    pub fn with_metrics(mut self, metrics: &'a QueryMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn cases(&self) -> &[EvalCase] {
        &self.cases
    }

    pub fn evaluate_retrieval(&self, k: usize) -> Result<RetrievalReport, RagError> {
        retrieval_report(self.agent.index(), &self.cases, k)
    }

    pub fn evaluate_answers(&self) -> AnswerReport {
        let mut keyword_matches = 0usize;
        let mut tool_hits = 0usize;
        let mut tool_questions = 0usize;
        let mut details = Vec::with_capacity(self.cases.len());

        for case in &self.cases {
            let response = self.agent.ask(&case.question);
            if let Some(metrics) = self.metrics {
                metrics.record_response(&response);
            }

            let keyword_score = keyword_score(&response.answer, &case.expected_keywords);
            if keyword_score > KEYWORD_THRESHOLD {
                keyword_matches += 1;
            }

            if let Some(tool) = &case.expected_tool {
                tool_questions += 1;
                if response.used_tool(tool) {
                    tool_hits += 1;
                }
            }

            debug!(question = %case.question, keyword_score, "Evaluated answer");
            details.push(AnswerDetail {
                question: case.question.clone(),
                expected_keywords: case.expected_keywords.clone(),
                keyword_score,
                tools_used: response.tools_used,
                answer_length: response.answer.chars().count(),
            });
        }

        AnswerReport {
            keyword_match_rate: ratio(keyword_matches, self.cases.len()),
            tool_accuracy: ratio(tool_hits, tool_questions),
            total_evaluated: self.cases.len(),
            details,
        }
    }

    pub fn run(&self, k: usize) -> Result<EvaluationReport, RagError> {
        let retrieval = self.evaluate_retrieval(k)?;
        let answers = self.evaluate_answers();

        info!(
            hit_at_k = retrieval.hit_at_k,
            keyword_match_rate = answers.keyword_match_rate,
            tool_accuracy = answers.tool_accuracy,
            "Evaluation complete"
        );

        Ok(EvaluationReport {
            summary: EvaluationSummary {
                hit_at_k: retrieval.hit_at_k,
                keyword_match_rate: answers.keyword_match_rate,
                tool_accuracy: answers.tool_accuracy,
            },
            retrieval,
            answers,
        })
    }
}

fn retrieval_report(index: &VectorIndex, cases: &[EvalCase], k: usize) -> Result<RetrievalReport, RagError> {
    let mut hits = 0usize;
    let mut top_scores = Vec::new();
    let mut details = Vec::new();

    for case in cases.iter().filter(|c| !c.expected_sources.is_empty()) {
        let results = index.search(&case.question, k)?;
        let retrieved: Vec<String> = results.iter().map(|r| r.document.filename.clone()).collect();
        let hit = case.expected_sources.iter().any(|s| retrieved.contains(s));
        if hit {
            hits += 1;
        }

        let top_score = results.first().map_or(0.0, |r| r.score);
        if !results.is_empty() {
            top_scores.push(f64::from(top_score));
        }

        details.push(RetrievalDetail {
            question: case.question.clone(),
            expected: case.expected_sources.clone(),
            retrieved,
            hit,
            top_score,
        });
    }

    let avg_confidence = if top_scores.is_empty() {
        0.0
    } else {
        top_scores.iter().sum::<f64>() / top_scores.len() as f64
    };

    Ok(RetrievalReport {
        k,
        hit_at_k: ratio(hits, details.len()),
        avg_confidence,
        total_evaluated: details.len(),
        details,
    })
}

/// Fraction of keywords found, case-insensitively, in the answer.
pub fn keyword_score(answer: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let answer = answer.to_lowercase();
    let matches = keywords
        .iter()
        .filter(|k| answer.contains(&k.to_lowercase()))
        .count();
    ratio(matches, keywords.len())
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::provider::{GenerateRequest, Provider, ProviderError};
    use std::sync::Arc;

    struct EchoProvider;

    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        fn generate(&self, request: GenerateRequest) -> crate::provider::Result<String> {
            // The prompt carries the retrieved excerpts, which is enough for keyword checks.
            Ok(request.prompt)
        }

        fn embed(&self, _text: &str, _model: &str) -> crate::provider::Result<Vec<f32>> {
            Err(ProviderError::Other("unsupported".into()))
        }
    }

    fn agent() -> Agent {
        Agent::from_config(&Config::default(), Arc::new(EchoProvider), geoqa_std::default_registry()).unwrap()
    }

    #[test]
    fn test_default_cases() {
        let cases = default_cases();
        assert_eq!(cases.len(), 8);
        assert_eq!(cases.iter().filter(|c| c.expected_tool.is_some()).count(), 2);
        assert_eq!(cases.iter().filter(|c| !c.expected_sources.is_empty()).count(), 6);
    }

    #[test]
    fn test_keyword_score() {
        let keywords = vec!["Settlement".to_string(), "0.005".to_string(), "terzaghi".to_string()];
        assert_eq!(keyword_score("settlement of 0.005 m", &keywords), 2.0 / 3.0);
        assert_eq!(keyword_score("anything", &[]), 0.0);
    }

    #[test]
    fn test_retrieval_report() {
        let agent = agent();
        let report = Evaluator::new(&agent).evaluate_retrieval(3).unwrap();

        assert_eq!(report.total_evaluated, 6);
        assert_eq!(report.hit_at_k, 1.0);
        assert!(report.avg_confidence > 0.0);
        for detail in &report.details {
            assert!(detail.retrieved.len() <= 3);
            assert_eq!(detail.hit, detail.expected.iter().any(|e| detail.retrieved.contains(e)));
        }
    }

    #[test]
    fn test_answers_and_tool_accuracy() {
        let agent = agent();
        let metrics = QueryMetrics::new();
        let report = Evaluator::new(&agent).with_metrics(&metrics).evaluate_answers();

        assert_eq!(report.total_evaluated, 8);
        assert_eq!(report.tool_accuracy, 1.0);
        assert!(report.keyword_match_rate >= 2.0 / 8.0);
        assert_eq!(report.details[2].keyword_score, 1.0);
        assert_eq!(metrics.snapshot().total_requests, 8);
        assert_eq!(metrics.snapshot().tool_calls, 2);
    }

    #[test]
    fn test_run_report_serializes() {
        let agent = agent();
        let cases = default_cases().into_iter().take(3).collect();
        let report = Evaluator::new(&agent).with_cases(cases).run(2).unwrap();

        assert_eq!(report.retrieval.k, 2);
        assert_eq!(report.answers.total_evaluated, 3);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["summary"]["tool_accuracy"].is_number());
    }
}
