//! Trace replay engine.
//!
//! Replays a recorded engine run: the identities the engine assigned,
//! every telemetry event in the order it was emitted, and the final flow
//! snapshot. Traces are JSON:
//!
//! ```json
//! {
//!   "terminals": [{ "imsi": 1, "address": "7.0.0.2" }],
//!   "events": [
//!     { "event": "sinr", "imsi": 1, "sinr": 125.3 },
//!     { "event": "rsrp", "imsi": 1, "cell": 1, "value": -84.2 },
//!     { "event": "handover_start", "imsi": 1, "source": 1, "target": 2 }
//!   ],
//!   "flows": [ ... ]
//! }
//! ```

use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::types::{FlowRecord, TerminalBinding};
use super::{EngineError, SimulationEngine};
use crate::telemetry::{CellId, Imsi, TelemetrySink};
use crate::topology::{CellSite, PlacedTerminal};

/// A single recorded telemetry event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Channel-quality sample, SINR as a linear ratio
    Sinr { imsi: Imsi, sinr: f64 },
    Rsrp { imsi: Imsi, cell: CellId, value: f64 },
    Rsrq { imsi: Imsi, cell: CellId, value: f64 },
    HandoverStart { imsi: Imsi, source: CellId, target: CellId },
    HandoverSuccess { imsi: Imsi, source: CellId, target: CellId },
    HandoverFailure { imsi: Imsi, source: CellId, target: CellId },
}

impl TraceEvent {
    /// Delivers this event to the matching sink callback
    pub fn dispatch(&self, sink: &mut dyn TelemetrySink) {
        match *self {
            TraceEvent::Sinr { imsi, sinr } => sink.on_channel_sample(imsi, sinr),
            TraceEvent::Rsrp { imsi, cell, value } => sink.on_rsrp(imsi, cell, value),
            TraceEvent::Rsrq { imsi, cell, value } => sink.on_rsrq(imsi, cell, value),
            TraceEvent::HandoverStart { imsi, source, target } => {
                sink.on_handover_start(imsi, source, target)
            }
            TraceEvent::HandoverSuccess { imsi, source, target } => {
                sink.on_handover_success(imsi, source, target)
            }
            TraceEvent::HandoverFailure { imsi, source, target } => {
                sink.on_handover_failure(imsi, source, target)
            }
        }
    }
}

/// A recorded engine run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Bindings in terminal index order
    pub terminals: Vec<TerminalBinding>,
    #[serde(default)]
    pub events: Vec<TraceEvent>,
    #[serde(default)]
    pub flows: Vec<FlowRecord>,
}

/// Engine that replays a [`Trace`]
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    trace: Trace,
    installed: bool,
}

impl ReplayEngine {
    pub fn new(trace: Trace) -> Self {
        Self {
            trace,
            installed: false,
        }
    }

    /// Loads a JSON trace from disk
    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        let content = fs::read_to_string(path).map_err(|source| EngineError::TraceIo {
            path: path.display().to_string(),
            source,
        })?;
        let trace: Trace = serde_json::from_str(&content).map_err(|source| EngineError::TraceFormat {
            path: path.display().to_string(),
            source,
        })?;
        info!(
            "Loaded trace {}: {} terminals, {} events, {} flows",
            path.display(),
            trace.terminals.len(),
            trace.events.len(),
            trace.flows.len()
        );
        Ok(Self::new(trace))
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }
}

impl SimulationEngine for ReplayEngine {
    fn install(
        &mut self,
        sites: &[CellSite],
        terminals: &[PlacedTerminal],
    ) -> Result<Vec<TerminalBinding>, EngineError> {
        if self.trace.terminals.len() != terminals.len() {
            return Err(EngineError::TerminalCountMismatch {
                engine: self.trace.terminals.len(),
                scenario: terminals.len(),
            });
        }
        debug!(
            "Replay engine installed {} sites and {} terminals",
            sites.len(),
            terminals.len()
        );
        self.installed = true;
        Ok(self.trace.terminals.clone())
    }

    fn run(&mut self, sink: &mut dyn TelemetrySink) -> Result<(), EngineError> {
        if !self.installed {
            return Err(EngineError::NotInstalled);
        }
        for event in &self.trace.events {
            event.dispatch(sink);
        }
        debug!("Replayed {} events", self.trace.events.len());
        Ok(())
    }

    fn flow_snapshot(&self) -> Vec<FlowRecord> {
        self.trace.flows.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::Aggregator;
    use crate::topology::{TrafficClass, Vec3};
    use std::io::Write;
    use std::net::Ipv4Addr;
    use tempfile::NamedTempFile;

    fn terminals(n: usize) -> Vec<PlacedTerminal> {
        (0..n)
            .map(|index| PlacedTerminal {
                index,
                position: Vec3::default(),
                class: TrafficClass::Embb,
            })
            .collect()
    }

    #[test]
    fn test_parse_trace_json() {
        let json = r#"{
            "terminals": [{ "imsi": 1, "address": "7.0.0.2" }],
            "events": [
                { "event": "sinr", "imsi": 1, "sinr": 100.0 },
                { "event": "rsrq", "imsi": 1, "cell": 1, "value": -11.0 },
                { "event": "handover_failure", "imsi": 1, "source": 1, "target": 2 }
            ]
        }"#;
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", json).unwrap();

        let engine = ReplayEngine::from_path(file.path()).unwrap();
        let trace = engine.trace();
        assert_eq!(trace.terminals[0].address, Ipv4Addr::new(7, 0, 0, 2));
        assert_eq!(trace.events.len(), 3);
        assert_eq!(
            trace.events[2],
            TraceEvent::HandoverFailure { imsi: 1, source: 1, target: 2 }
        );
        assert!(trace.flows.is_empty());
    }

    #[test]
    fn test_malformed_trace_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = ReplayEngine::from_path(file.path()).unwrap_err();
        assert!(matches!(err, EngineError::TraceFormat { .. }));
    }

    #[test]
    fn test_install_checks_terminal_count() {
        let trace = Trace {
            terminals: vec![TerminalBinding { imsi: 1, address: Ipv4Addr::new(7, 0, 0, 2) }],
            ..Trace::default()
        };
        let mut engine = ReplayEngine::new(trace);
        let err = engine.install(&[], &terminals(2)).unwrap_err();
        assert!(matches!(err, EngineError::TerminalCountMismatch { engine: 1, scenario: 2 }));

        let mut agg = Aggregator::new();
        assert!(matches!(engine.run(&mut agg), Err(EngineError::NotInstalled)));

        let bindings = engine.install(&[], &terminals(1)).unwrap();
        assert_eq!(bindings[0].imsi, 1);
    }

    #[test]
    fn test_run_dispatches_in_order() {
        let trace = Trace {
            terminals: vec![TerminalBinding { imsi: 9, address: Ipv4Addr::new(7, 0, 0, 2) }],
            events: vec![
                TraceEvent::Sinr { imsi: 9, sinr: 10.0 },
                TraceEvent::Sinr { imsi: 9, sinr: 1000.0 },
                TraceEvent::HandoverStart { imsi: 9, source: 1, target: 2 },
                TraceEvent::HandoverSuccess { imsi: 9, source: 1, target: 2 },
            ],
            flows: Vec::new(),
        };
        let mut engine = ReplayEngine::new(trace);
        engine.install(&[], &terminals(1)).unwrap();

        let mut agg = Aggregator::new();
        engine.run(&mut agg).unwrap();

        let history: Vec<f64> = agg.sinr_history(9).unwrap().iter().copied().collect();
        assert_eq!(history.len(), 2);
        assert!((history[0] - 10.0).abs() < 1e-12);
        assert!((history[1] - 30.0).abs() < 1e-12);
        assert_eq!(agg.handovers().attempts, 1);
        assert_eq!(agg.handovers().successes, 1);
    }
}
