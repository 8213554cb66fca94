//! Scenario topology module.
//!
//! This module contains the geometric side of scenario synthesis: cell
//! site layout, terminal placement, traffic class assignment, nearest-cell
//! attachment and the offered traffic plan.

pub mod types;
pub mod layout;
pub mod distribution;
pub mod attachment;
pub mod demand;

// Re-export key types and functions for easier access
pub use types::{CellSite, DensityClass, PlacedTerminal, TrafficClass, Vec3};
pub use layout::{create_cell_layout, effective_isd, is_supported_site_count};
pub use distribution::{distribute_terminals, TerminalPlacement};
pub use attachment::{classify_terminals, nearest_cell, Attachment};
pub use demand::{plan_traffic, TrafficPlan, TrafficProfile};
