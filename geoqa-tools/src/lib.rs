//! geoqa-tools - the tool API of geoqa
//!
//! Tools are deterministic calculators the agent dispatches to when a
//! question matches their trigger keywords.

mod registry;
mod result;
mod tool;

pub use registry::ToolRegistry;
pub use result::{
    BearingCapacityInputs, BearingCapacityResult, BearingFactors, CapacityBreakdown,
    SettlementInputs, SettlementResult, ToolResult,
};
pub use tool::{parse_input, Result, Tool, ToolError};
