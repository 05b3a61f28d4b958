use crate::extract;
use geoqa_tools::{parse_input, Result, SettlementInputs, SettlementResult, Tool, ToolError, ToolResult};
use serde_json::Value;
use tracing::warn;

const KEYWORDS: &[&str] = &[
    "settlement",
    "immediate settlement",
    "elastic settlement",
    "load",
    "young",
    "modulus",
    "settlement = load",
    "calculate settlement",
    "settlement calculation",
];

/// Immediate settlement: `settlement = load / Young's modulus`.
///
/// Units are whatever the caller uses; the result is load units divided by
/// modulus units.
#[derive(Debug, Default, Clone, Copy)]
pub struct SettlementCalculator;

impl SettlementCalculator {
    pub const FORMULA: &'static str = "settlement = load / Young's_modulus";
    pub const UNITS: &'static str = "same as load units / modulus units";

    pub fn new() -> Self {
        Self
    }

    pub fn calculate(&self, load: f64, youngs_modulus: f64) -> Result<SettlementResult> {
        if load.is_infinite() || youngs_modulus.is_infinite() {
            warn!(load, youngs_modulus, "Rejected settlement input");
            return Err(ToolError::InvalidParameter("load and modulus must be finite".into()));
        }
        if !(youngs_modulus > 0.0) {
            warn!(youngs_modulus, "Rejected settlement input");
            return Err(ToolError::InvalidParameter("modulus must be positive".into()));
        }
        if !(load >= 0.0) {
            warn!(load, "Rejected settlement input");
            return Err(ToolError::InvalidParameter("load cannot be negative".into()));
        }

        Ok(SettlementResult {
            settlement: load / youngs_modulus,
            units: Self::UNITS,
            formula: Self::FORMULA,
            inputs: SettlementInputs {
                load,
                youngs_modulus,
            },
        })
    }
}

impl Tool for SettlementCalculator {
    fn name(&self) -> &str {
        "settlement_calculator"
    }

    fn label(&self) -> &str {
        "settlement"
    }

    fn description(&self) -> &str {
        "Immediate settlement from applied load and Young's modulus of the soil"
    }

    fn trace_step(&self) -> &str {
        "settlement_tool"
    }

    fn keywords(&self) -> &[&str] {
        KEYWORDS
    }

    fn parameter_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "required": ["load", "youngs_modulus"],
            "properties": {
                "load": {
                    "type": "number",
                    "description": "Applied load, non-negative"
                },
                "youngs_modulus": {
                    "type": "number",
                    "description": "Young's modulus of the soil, positive"
                }
            }
        })
    }

    fn usage_hint(&self) -> &str {
        "To calculate settlement, please provide both load and Young's modulus values. \
         Format: 'Calculate settlement for load = X and Young's modulus = Y'"
    }

    fn extract(&self, question: &str, context: &str) -> Option<Value> {
        extract::settlement_params(question, context).and_then(|p| serde_json::to_value(p).ok())
    }

    fn execute(&self, input: Value) -> Result<ToolResult> {
        let params: SettlementInputs = parse_input(input)?;
        self.calculate(params.load, params.youngs_modulus)
            .map(ToolResult::Settlement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_settlement_calculation() {
        let result = SettlementCalculator.calculate(100.0, 25000.0).unwrap();
        assert!((result.settlement - 100.0 / 25000.0).abs() < 1e-12);
        assert_eq!(result.inputs.load, 100.0);
        assert_eq!(result.inputs.youngs_modulus, 25000.0);
        assert_eq!(result.formula, SettlementCalculator::FORMULA);
    }

    #[test]
    fn test_ratio_holds_across_inputs() {
        for (load, modulus) in [(0.0, 1.0), (1.0, 3.0), (150.0, 30000.0), (1e6, 0.5)] {
            let result = SettlementCalculator.calculate(load, modulus).unwrap();
            assert!((result.settlement - load / modulus).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_load_is_zero_settlement() {
        let result = SettlementCalculator.calculate(0.0, 25000.0).unwrap();
        assert_eq!(result.settlement, 0.0);
    }

    #[test]
    fn test_invalid_inputs() {
        let err = SettlementCalculator.calculate(100.0, 0.0).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameter(ref m) if m == "modulus must be positive"));

        let err = SettlementCalculator.calculate(-50.0, 25000.0).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameter(ref m) if m == "load cannot be negative"));

        assert!(SettlementCalculator.calculate(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_infinite_inputs_are_rejected() {
        for (load, modulus) in [(f64::INFINITY, 25000.0), (100.0, f64::INFINITY)] {
            let err = SettlementCalculator.calculate(load, modulus).unwrap_err();
            assert!(matches!(err, ToolError::InvalidParameter(ref m) if m == "load and modulus must be finite"));
        }
    }

    #[test]
    fn test_extract_then_execute() {
        let tool = SettlementCalculator;
        let input = tool
            .extract("Calculate settlement for load = 150 and Young's modulus = 30000", "")
            .unwrap();
        let result = tool.execute(input).unwrap();
        assert!((result.value() - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_execute_rejects_bad_json() {
        let err = SettlementCalculator
            .execute(serde_json::json!({"load": "heavy"}))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
