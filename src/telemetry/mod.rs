//! Telemetry aggregation.
//!
//! The simulation engine pushes per-terminal channel-quality samples and
//! handover events into a [`TelemetrySink`]. The [`Aggregator`] is the
//! sink used for scoring: it keeps running statistics per terminal, a
//! bounded SINR window per terminal, process-wide handover counters and
//! the terminal-to-cell attachment table.

pub mod history;
pub mod sink;
pub mod aggregator;

pub use history::{SinrHistory, SINR_HISTORY_CAPACITY};
pub use sink::{CellId, Imsi, TelemetrySink};
pub use aggregator::{Aggregator, ChannelMetrics, HandoverCounters, ServingCell};
