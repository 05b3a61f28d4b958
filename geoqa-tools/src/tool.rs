use crate::result::ToolResult;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    /// A calculator input violates a domain constraint.
    #[error("{0}")]
    InvalidParameter(String),

    /// The JSON input does not match the tool's parameter schema.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

pub type Result<T> = std::result::Result<T, ToolError>;

/// Core trait that every deterministic tool implements.
///
/// A tool owns three things the agent needs to dispatch to it without
/// tool-specific code: the trigger keywords that make it a candidate for a
/// question, the extraction of its parameters from free text, and the
/// calculation itself.
pub trait Tool: Send + Sync {
    /// Stable identifier reported in `tools_used`.
    fn name(&self) -> &str;

    /// Short noun used in user-facing messages ("settlement", "bearing capacity").
    fn label(&self) -> &str;

    fn description(&self) -> &str;

    /// Trace step name recorded when the tool runs.
    fn trace_step(&self) -> &str;

    /// Default trigger substrings. Matching is case-insensitive.
    fn keywords(&self) -> &[&str];

    /// JSON schema of the parameters accepted by [`Tool::execute`].
    fn parameter_schema(&self) -> Value;

    /// Sentence telling the user which parameters to supply when extraction
    /// comes back empty.
    fn usage_hint(&self) -> &str;

    /// Pulls every required parameter out of the question and optional
    /// context. Returns `None` unless all of them were found.
    fn extract(&self, question: &str, context: &str) -> Option<Value>;

    /// Runs the tool. The input should match the parameter schema.
    fn execute(&self, input: Value) -> Result<ToolResult>;
}

/// Deserializes a tool's JSON input into its typed parameter struct.
pub fn parse_input<T: serde::de::DeserializeOwned>(input: Value) -> Result<T> {
    serde_json::from_value(input)
        .map_err(|e| ToolError::InvalidInput(format!("Invalid parameters: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::SettlementInputs;

    #[test]
    fn parse_input_accepts_matching_object() {
        let input = serde_json::json!({"load": 100.0, "youngs_modulus": 25000.0});
        let params: SettlementInputs = parse_input(input).unwrap();
        assert_eq!(params.load, 100.0);
        assert_eq!(params.youngs_modulus, 25000.0);
    }

    #[test]
    fn parse_input_rejects_missing_field() {
        let input = serde_json::json!({"load": 100.0});
        let err = parse_input::<SettlementInputs>(input).unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[test]
    fn invalid_parameter_displays_reason_only() {
        let err = ToolError::InvalidParameter("modulus must be positive".into());
        assert_eq!(err.to_string(), "modulus must be positive");
    }
}
