//! Shared utilities: scenario validation and fixed-precision formatting.

pub mod format;
pub mod validation;

pub use format::fixed;
pub use validation::validate_scenario_shape;
