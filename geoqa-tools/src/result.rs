//! Typed results produced by tool invocations.
//!
//! [`ToolResult`] is a closed sum type, so composing answers from tool output
//! is checked exhaustively by `match`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters of the immediate settlement calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettlementInputs {
    pub load: f64,
    pub youngs_modulus: f64,
}

/// Parameters of the Terzaghi bearing capacity calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingCapacityInputs {
    #[serde(rename = "B")]
    pub b: f64,
    pub gamma: f64,
    #[serde(rename = "Df")]
    pub df: f64,
    pub friction_angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementResult {
    pub settlement: f64,
    pub units: &'static str,
    pub formula: &'static str,
    pub inputs: SettlementInputs,
}

/// Bearing capacity factors for one friction angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BearingFactors {
    #[serde(rename = "Nq")]
    pub nq: f64,
    #[serde(rename = "Nr")]
    pub nr: f64,
}

/// Partial terms of the capacity equation, rounded for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapacityBreakdown {
    pub depth_term: f64,
    pub width_term: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BearingCapacityResult {
    /// Unrounded total, for numerical comparisons.
    pub ultimate_bearing_capacity: f64,
    pub units: &'static str,
    pub formula: &'static str,
    pub inputs: BearingCapacityInputs,
    /// Factors rounded to two decimals.
    pub factors: BearingFactors,
    #[serde(rename = "calculation_breakdown")]
    pub breakdown: CapacityBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolResult {
    Settlement(SettlementResult),
    BearingCapacity(BearingCapacityResult),
}

impl ToolResult {
    /// The headline number of the calculation.
    pub fn value(&self) -> f64 {
        match self {
            ToolResult::Settlement(r) => r.settlement,
            ToolResult::BearingCapacity(r) => r.ultimate_bearing_capacity,
        }
    }

    /// Inputs as JSON, for trace metadata.
    pub fn inputs(&self) -> Value {
        let inputs = match self {
            ToolResult::Settlement(r) => serde_json::to_value(r.inputs),
            ToolResult::BearingCapacity(r) => serde_json::to_value(r.inputs),
        };
        inputs.unwrap_or_default()
    }

    pub fn formula(&self) -> &'static str {
        match self {
            ToolResult::Settlement(r) => r.formula,
            ToolResult::BearingCapacity(r) => r.formula,
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            ToolResult::Settlement(r) => r.units,
            ToolResult::BearingCapacity(r) => r.units,
        }
    }

    /// Human-readable sentence used as an answer segment.
    pub fn summary(&self) -> String {
        match self {
            ToolResult::Settlement(r) => format!(
                "Settlement calculation: {:.4} {}. Formula used: {}",
                r.settlement, r.units, r.formula
            ),
            ToolResult::BearingCapacity(r) => format!(
                "Ultimate bearing capacity: {:.2} {}. Factors used: Nq = {}, Nr = {}",
                r.ultimate_bearing_capacity, r.units, r.factors.nq, r.factors.nr
            ),
        }
    }
}
