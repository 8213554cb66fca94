//! Simulation engine seam.
//!
//! Radio propagation, scheduling, mobility and the event loop itself live
//! in an external simulation engine. This module defines what the scenario
//! pipeline needs from such an engine:
//!
//! - accept the synthesized site and terminal positions and report the
//!   identity and address it assigned each terminal
//! - run to completion, delivering telemetry to a [`TelemetrySink`]
//! - expose the final per-flow statistics
//!
//! [`ReplayEngine`] implements the interface by replaying a recorded trace.

pub mod types;
pub mod replay;

use crate::telemetry::TelemetrySink;
use crate::topology::{CellSite, PlacedTerminal};

pub use types::{AddressTable, FlowRecord, TerminalBinding};
pub use replay::{ReplayEngine, Trace, TraceEvent};

/// Errors raised by a simulation engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Engine knows {engine} terminals but the scenario has {scenario}")]
    TerminalCountMismatch { engine: usize, scenario: usize },

    #[error("Engine was run before the scenario was installed")]
    NotInstalled,

    #[error("Failed to read trace {path}: {source}")]
    TraceIo {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse trace {path}: {source}")]
    TraceFormat {
        path: String,
        source: serde_json::Error,
    },
}

/// An external simulation engine driven by the scenario pipeline
pub trait SimulationEngine {
    /// Installs sites and terminals.
    ///
    /// Returns one binding per terminal, in the order of `terminals`.
    fn install(
        &mut self,
        sites: &[CellSite],
        terminals: &[PlacedTerminal],
    ) -> Result<Vec<TerminalBinding>, EngineError>;

    /// Runs the simulation to completion. Telemetry is delivered to `sink`
    /// synchronously, in event order.
    fn run(&mut self, sink: &mut dyn TelemetrySink) -> Result<(), EngineError>;

    /// Final per-flow statistics, valid once `run` has returned
    fn flow_snapshot(&self) -> Vec<FlowRecord>;
}
