//! Post-run scoring and reporting for cellsim scenarios.
//!
//! This module turns the engine's final flow snapshot and the aggregated
//! telemetry into per-flow, per-cell and system-wide reports.

pub mod types;
pub mod scoring;
pub mod summary;
pub mod report;

pub use types::*;
pub use scoring::{clamp_score, FlowMetrics};
pub use summary::build_reports;
pub use report::{generate_json_report, print_summary, write_reports, ReportPaths};
