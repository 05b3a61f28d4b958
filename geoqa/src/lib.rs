//! geoqa - Question answering for geotechnical engineering
//!
//! This is the convenience wrapper crate that re-exports geoqa components
//! with optional feature flags for easy usage.
//!
//! # Quick Start
//!
//! ```toml
//! [dependencies]
//! geoqa = "0.1"  # Includes core + standard calculators by default
//! ```
//!
//! # Features
//!
//! - `std` (default): Include the settlement and bearing capacity calculators

// Re-export core
pub use geoqa_core::*;
pub use geoqa_tools;

// Re-export std tools if feature is enabled
#[cfg(feature = "std")]
pub use geoqa_std;

/// Prelude module for convenient imports
pub mod prelude {
    pub use geoqa_core::*;
    pub use geoqa_tools::{Tool, ToolError, ToolRegistry, ToolResult};

    #[cfg(feature = "std")]
    pub use geoqa_std::{default_registry, SettlementCalculator, TerzaghiBearingCapacity};
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_builds_registry() {
        let registry: ToolRegistry = default_registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("bearing_capacity_calculator").is_some());
    }
}
