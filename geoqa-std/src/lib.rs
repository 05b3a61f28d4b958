//! Standard tools for geoqa
//!
//! The standard library is the set of geotechnical calculators the agent
//! ships with:
//! - Immediate settlement (`settlement_calculator`)
//! - Terzaghi bearing capacity (`bearing_capacity_calculator`)
//!
//! Both are pure and stateless, and extract their parameters from question
//! text through [`extract`].

mod bearing;
pub mod extract;
mod settlement;

pub use bearing::{interpolate_factors, TerzaghiBearingCapacity, MAX_FRICTION_ANGLE};
pub use settlement::SettlementCalculator;

use geoqa_tools::ToolRegistry;
use std::sync::Arc;

/// Registry with the standard tools, settlement first.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SettlementCalculator::new()));
    registry.register(Arc::new(TerzaghiBearingCapacity::new()));
    registry
}
