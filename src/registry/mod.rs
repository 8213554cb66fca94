//! # Registry Generation Module
//!
//! This module writes the JSON files that describe a scenario to the
//! outside world: the placed geometry handed to a simulation engine, and
//! the terminal registry produced once the engine has assigned identities.
//!
//! ## Registry Types
//!
//! **Scenario Layout** (`scenario_layout.json`):
//! - Density class, inter-site distance and propagation model
//! - Cell site positions
//! - Terminal positions and traffic classes
//! - The offered traffic plan
//!
//! **Terminal Registry** (`terminal_registry.json`):
//! - Engine-assigned identity and address of every terminal
//! - Traffic class, serving cell and distance to it
//! - Terminal position
//!
//! ## Example Registry Structure
//!
//! ```json
//! {
//!   "terminals": [
//!     {
//!       "imsi": 1,
//!       "address": "7.0.0.2",
//!       "class": "Embb",
//!       "serving_cell": 0,
//!       "distance": 87.4,
//!       "position": { "x": 61.2, "y": -58.0, "z": 1.5 }
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::TerminalBinding;
use crate::telemetry::{Aggregator, Imsi};
use crate::topology::{CellSite, DensityClass, PlacedTerminal, TrafficClass, TrafficPlan, Vec3};

pub const LAYOUT_FILE: &str = "scenario_layout.json";
pub const TERMINAL_REGISTRY_FILE: &str = "terminal_registry.json";

/// Geometry and offered load of a synthesized scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioLayout {
    pub density: DensityClass,
    pub isd: f64,
    pub effective_isd: f64,
    pub propagation_model: String,
    pub seed: u64,
    pub sites: Vec<CellSite>,
    pub terminals: Vec<PlacedTerminal>,
    /// Terminals placed uniformly because no cell allocation reached them
    pub fallback_terminals: usize,
    pub traffic: TrafficPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalInfo {
    pub imsi: Imsi,
    pub address: Ipv4Addr,
    pub class: TrafficClass,
    pub serving_cell: Option<u32>,
    pub distance: Option<f64>,
    pub position: Vec3,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerminalRegistry {
    pub terminals: Vec<TerminalInfo>,
}

impl TerminalRegistry {
    /// Join engine bindings with placed terminals and recorded attachments.
    ///
    /// Bindings are matched to terminals by position in the list.
    pub fn build(
        terminals: &[PlacedTerminal],
        bindings: &[TerminalBinding],
        aggregator: &Aggregator,
    ) -> Self {
        let terminals = terminals
            .iter()
            .zip(bindings)
            .map(|(terminal, binding)| {
                let serving = aggregator.serving_cell(binding.imsi);
                TerminalInfo {
                    imsi: binding.imsi,
                    address: binding.address,
                    class: terminal.class,
                    serving_cell: serving.map(|s| s.cell_id),
                    distance: serving.map(|s| s.distance),
                    position: terminal.position,
                }
            })
            .collect();
        Self { terminals }
    }
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Registry written to {}", path.display());
    Ok(())
}

pub fn write_scenario_layout(layout: &ScenarioLayout, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;
    let path = output_dir.join(LAYOUT_FILE);
    write_json(layout, &path)?;
    Ok(path)
}

pub fn write_terminal_registry(registry: &TerminalRegistry, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;
    let path = output_dir.join(TERMINAL_REGISTRY_FILE);
    write_json(registry, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn terminal(index: usize, class: TrafficClass) -> PlacedTerminal {
        PlacedTerminal {
            index,
            position: Vec3::new(index as f64 * 10.0, 0.0, 1.5),
            class,
        }
    }

    #[test]
    fn test_registry_joins_bindings_and_attachments() {
        let terminals = vec![terminal(0, TrafficClass::Embb), terminal(1, TrafficClass::Urllc)];
        let bindings = vec![
            TerminalBinding { imsi: 1, address: Ipv4Addr::new(7, 0, 0, 2) },
            TerminalBinding { imsi: 2, address: Ipv4Addr::new(7, 0, 0, 3) },
        ];
        let mut aggregator = Aggregator::new();
        aggregator.record_attachment(1, 0, 26.0);

        let registry = TerminalRegistry::build(&terminals, &bindings, &aggregator);
        assert_eq!(registry.terminals.len(), 2);
        assert_eq!(registry.terminals[0].serving_cell, Some(0));
        assert_eq!(registry.terminals[0].class, TrafficClass::Embb);
        assert_eq!(registry.terminals[1].serving_cell, None);
        assert_eq!(registry.terminals[1].position.x, 10.0);
    }

    #[test]
    fn test_registry_written_as_json() {
        let dir = TempDir::new().unwrap();
        let registry = TerminalRegistry {
            terminals: vec![TerminalInfo {
                imsi: 5,
                address: Ipv4Addr::new(7, 0, 0, 6),
                class: TrafficClass::Urllc,
                serving_cell: Some(2),
                distance: Some(41.5),
                position: Vec3::new(1.0, 2.0, 1.5),
            }],
        };

        let path = write_terminal_registry(&registry, dir.path()).unwrap();
        assert!(path.ends_with(TERMINAL_REGISTRY_FILE));
        let parsed: TerminalRegistry =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, registry);
    }
}
