//! Terzaghi ultimate bearing capacity for shallow footings on cohesionless soil.

use crate::extract;
use geoqa_tools::{
    parse_input, BearingCapacityInputs, BearingCapacityResult, BearingFactors, CapacityBreakdown,
    Result, Tool, ToolError, ToolResult,
};
use serde_json::Value;
use tracing::warn;

const KEYWORDS: &[&str] = &[
    "bearing capacity",
    "ultimate bearing",
    "terzaghi",
    "qu",
    "q_ult",
    "bearing",
    "footing",
    "foundation capacity",
    "nq",
    "nr",
    "friction angle",
];

/// Friction angle in degrees mapped to (Nq, Nr). Sorted by angle.
const FACTOR_TABLE: &[(f64, f64, f64)] = &[
    (0.0, 1.0, 0.0),
    (5.0, 1.6, 0.1),
    (10.0, 2.5, 0.4),
    (15.0, 3.9, 1.2),
    (20.0, 6.4, 2.9),
    (25.0, 10.7, 6.8),
    (30.0, 18.4, 15.1),
    (32.0, 23.2, 20.8),
    (34.0, 29.4, 28.8),
    (35.0, 33.3, 33.9),
    (36.0, 37.8, 40.1),
    (38.0, 48.9, 56.3),
    (40.0, 64.2, 79.5),
    (42.0, 85.4, 113.0),
    (45.0, 134.9, 200.8),
];

pub const MAX_FRICTION_ANGLE: f64 = 45.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Bearing capacity factors for a friction angle.
///
/// Angles outside the table are clamped to the first or last row, and NaN
/// maps to the first row. Between rows both factors are interpolated linearly.
pub fn interpolate_factors(friction_angle: f64) -> BearingFactors {
    let (first, last) = (FACTOR_TABLE[0], FACTOR_TABLE[FACTOR_TABLE.len() - 1]);

    if friction_angle.is_nan() || friction_angle <= first.0 {
        return BearingFactors { nq: first.1, nr: first.2 };
    }
    if friction_angle >= last.0 {
        return BearingFactors { nq: last.1, nr: last.2 };
    }

    for pair in FACTOR_TABLE.windows(2) {
        let (lower, upper) = (pair[0], pair[1]);
        // Half-open bracket, so a breakpoint hits t == 0 and returns its row exactly.
        if friction_angle < upper.0 {
            let t = (friction_angle - lower.0) / (upper.0 - lower.0);
            return BearingFactors {
                nq: lower.1 + t * (upper.1 - lower.1),
                nr: lower.2 + t * (upper.2 - lower.2),
            };
        }
    }

    BearingFactors { nq: last.1, nr: last.2 }
}

/// `q_ult = γ·Df·Nq + 0.5·γ·B·Nr`
#[derive(Debug, Default, Clone, Copy)]
pub struct TerzaghiBearingCapacity;

impl TerzaghiBearingCapacity {
    pub const FORMULA: &'static str = "q_ult = γ*Df*Nq + 0.5*γ*B*Nr";
    pub const UNITS: &'static str = "kN/m² (assuming gamma in kN/m³)";

    pub fn new() -> Self {
        Self
    }

    pub fn calculate(
        &self,
        b: f64,
        gamma: f64,
        df: f64,
        friction_angle: f64,
    ) -> Result<BearingCapacityResult> {
        if [b, gamma, df].iter().any(|x| !(*x > 0.0) || x.is_infinite()) {
            warn!(b, gamma, df, "Rejected bearing capacity input");
            return Err(ToolError::InvalidParameter(
                "B, gamma, and Df must be positive and finite".into(),
            ));
        }
        if !(0.0..=MAX_FRICTION_ANGLE).contains(&friction_angle) {
            warn!(friction_angle, "Rejected bearing capacity input");
            return Err(ToolError::InvalidParameter(
                "friction angle must be between 0 and 45 degrees".into(),
            ));
        }

        let factors = interpolate_factors(friction_angle);
        let depth_term = gamma * df * factors.nq;
        let width_term = 0.5 * gamma * b * factors.nr;
        let q_ult = depth_term + width_term;

        Ok(BearingCapacityResult {
            ultimate_bearing_capacity: q_ult,
            units: Self::UNITS,
            formula: Self::FORMULA,
            inputs: BearingCapacityInputs {
                b,
                gamma,
                df,
                friction_angle,
            },
            factors: BearingFactors {
                nq: round2(factors.nq),
                nr: round2(factors.nr),
            },
            breakdown: CapacityBreakdown {
                depth_term: round2(depth_term),
                width_term: round2(width_term),
                total: round2(q_ult),
            },
        })
    }
}

impl Tool for TerzaghiBearingCapacity {
    fn name(&self) -> &str {
        "bearing_capacity_calculator"
    }

    fn label(&self) -> &str {
        "bearing capacity"
    }

    fn description(&self) -> &str {
        "Terzaghi ultimate bearing capacity of a shallow footing on cohesionless soil"
    }

    fn trace_step(&self) -> &str {
        "bearing_capacity_tool"
    }

    fn keywords(&self) -> &[&str] {
        KEYWORDS
    }

    fn parameter_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "required": ["B", "gamma", "Df", "friction_angle"],
            "properties": {
                "B": {
                    "type": "number",
                    "description": "Footing width or diameter (m)"
                },
                "gamma": {
                    "type": "number",
                    "description": "Unit weight of soil (kN/m³)"
                },
                "Df": {
                    "type": "number",
                    "description": "Footing depth (m)"
                },
                "friction_angle": {
                    "type": "number",
                    "description": "Soil friction angle in degrees, 0 to 45"
                }
            }
        })
    }

    fn usage_hint(&self) -> &str {
        "To calculate bearing capacity, please provide: B (footing width), \
         gamma (unit weight), Df (footing depth), and friction angle. \
         Format: 'Calculate bearing capacity for B = X, gamma = Y, Df = Z, friction angle = A'"
    }

    fn extract(&self, question: &str, context: &str) -> Option<Value> {
        extract::bearing_capacity_params(question, context)
            .and_then(|p| serde_json::to_value(p).ok())
    }

    fn execute(&self, input: Value) -> Result<ToolResult> {
        let p: BearingCapacityInputs = parse_input(input)?;
        self.calculate(p.b, p.gamma, p.df, p.friction_angle)
            .map(ToolResult::BearingCapacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_bearing_capacity_calculation() {
        let result = TerzaghiBearingCapacity.calculate(2.0, 18.0, 1.5, 30.0).unwrap();

        let expected = 18.0 * 1.5 * 18.4 + 0.5 * 18.0 * 2.0 * 15.1;
        assert!(close(result.ultimate_bearing_capacity, expected));
        assert!((result.ultimate_bearing_capacity - 768.6).abs() < 1e-6);
        assert_eq!(result.factors.nq, 18.4);
        assert_eq!(result.factors.nr, 15.1);
        assert_eq!(result.breakdown.depth_term, 496.8);
        assert_eq!(result.breakdown.width_term, 271.8);
        assert_eq!(result.breakdown.total, 768.6);
    }

    #[test]
    fn test_breakpoints_are_exact() {
        for &(angle, nq, nr) in FACTOR_TABLE {
            let factors = interpolate_factors(angle);
            assert_eq!(factors.nq, nq, "Nq at {angle}");
            assert_eq!(factors.nr, nr, "Nr at {angle}");
        }
    }

    #[test]
    fn test_interpolation_between_rows() {
        let factors = interpolate_factors(32.5);
        assert!(factors.nq > 23.2 && factors.nq < 29.4);
        assert!(factors.nr > 20.8 && factors.nr < 28.8);
        assert!(close(factors.nq, 23.2 + 0.25 * (29.4 - 23.2)));

        let midpoint = interpolate_factors(33.0);
        assert!(close(midpoint.nq, (23.2 + 29.4) / 2.0));
        assert!(close(midpoint.nr, (20.8 + 28.8) / 2.0));
    }

    #[test]
    fn test_clamps_at_table_ends() {
        let low = interpolate_factors(-3.0);
        assert_eq!((low.nq, low.nr), (1.0, 0.0));
        let high = interpolate_factors(60.0);
        assert_eq!((high.nq, high.nr), (134.9, 200.8));
    }

    #[test]
    fn test_nan_angle_maps_to_first_row() {
        let factors = interpolate_factors(f64::NAN);
        assert_eq!((factors.nq, factors.nr), (1.0, 0.0));
    }

    #[test]
    fn test_interpolated_capacity_is_positive() {
        let result = TerzaghiBearingCapacity.calculate(1.0, 20.0, 1.0, 32.5).unwrap();
        assert!(result.ultimate_bearing_capacity > 0.0);
    }

    #[test]
    fn test_invalid_inputs() {
        let err = TerzaghiBearingCapacity.calculate(0.0, 18.0, 1.5, 30.0).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameter(_)));

        let err = TerzaghiBearingCapacity.calculate(2.0, 18.0, 1.5, 50.0).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameter(ref m) if m.contains("between 0 and 45")));

        assert!(TerzaghiBearingCapacity.calculate(2.0, -1.0, 1.5, 30.0).is_err());
        assert!(TerzaghiBearingCapacity.calculate(2.0, 18.0, 0.0, 30.0).is_err());
        assert!(TerzaghiBearingCapacity.calculate(2.0, 18.0, 1.5, -0.1).is_err());
        assert!(TerzaghiBearingCapacity.calculate(2.0, 18.0, 1.5, f64::NAN).is_err());
    }

    #[test]
    fn test_infinite_dimensions_are_rejected() {
        for (b, gamma, df) in [(f64::INFINITY, 18.0, 1.5), (2.0, f64::INFINITY, 1.5), (2.0, 18.0, f64::INFINITY)] {
            let err = TerzaghiBearingCapacity.calculate(b, gamma, df, 30.0).unwrap_err();
            assert!(matches!(err, ToolError::InvalidParameter(ref m) if m.ends_with("must be positive and finite")));
        }
    }

    #[test]
    fn test_angle_bounds_are_inclusive() {
        assert!(TerzaghiBearingCapacity.calculate(1.0, 1.0, 1.0, 0.0).is_ok());
        assert!(TerzaghiBearingCapacity.calculate(1.0, 1.0, 1.0, 45.0).is_ok());
    }

    #[test]
    fn test_execute_from_extracted_text() {
        let tool = TerzaghiBearingCapacity;
        let input = tool
            .extract(
                "Calculate bearing capacity for B = 2, gamma = 18, Df = 1.5, friction angle = 30",
                "",
            )
            .unwrap();
        let result = tool.execute(input).unwrap();
        assert!((result.value() - 768.6).abs() < 1e-6);
    }
}
