//! Scenario orchestrator.
//!
//! This module coordinates a run end to end: geometry and demand
//! synthesis, installation into a simulation engine, nearest-cell
//! attachment, telemetry aggregation, scoring and report output.

use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::analysis::{build_reports, print_summary, write_reports, ReportPaths, Reports};
use crate::config::Config;
use crate::engine::{AddressTable, SimulationEngine, TerminalBinding};
use crate::registry::{write_scenario_layout, write_terminal_registry, ScenarioLayout, TerminalRegistry};
use crate::telemetry::Aggregator;
use crate::topology::{
    classify_terminals, create_cell_layout, distribute_terminals, effective_isd, nearest_cell,
    plan_traffic, CellSite, DensityClass, PlacedTerminal, TrafficPlan,
};

/// A synthesized scenario, ready to hand to an engine
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub density: DensityClass,
    pub sites: Vec<CellSite>,
    pub terminals: Vec<PlacedTerminal>,
    /// Terminals placed uniformly over the area
    pub fallback_terminals: usize,
    pub traffic: TrafficPlan,
}

impl Scenario {
    pub fn layout(&self, config: &Config) -> ScenarioLayout {
        ScenarioLayout {
            density: self.density,
            isd: config.scenario.isd,
            effective_isd: effective_isd(config.scenario.isd, self.density),
            propagation_model: self.density.propagation_model().to_string(),
            seed: config.general.seed,
            sites: self.sites.clone(),
            terminals: self.terminals.clone(),
            fallback_terminals: self.fallback_terminals,
            traffic: self.traffic.clone(),
        }
    }
}

/// Synthesize sites, terminals and traffic for a validated configuration.
///
/// A single random stream seeded from `general.seed` drives placement and
/// then application start times, so equal configurations give equal
/// scenarios.
pub fn build_scenario(config: &Config) -> Scenario {
    let density = config.density();
    let scenario = &config.scenario;
    let mut rng = StdRng::seed_from_u64(config.general.seed);

    let sites = create_cell_layout(
        scenario.num_cells,
        scenario.isd,
        config.radio.gnb_height,
        density,
    );

    let placement = distribute_terminals(
        scenario.num_ues as usize,
        &sites,
        density,
        scenario.isd,
        config.radio.ue_height,
        &mut rng,
    );
    if placement.fallback > 0 {
        info!(
            "{} terminal(s) placed uniformly outside the per-cell pass",
            placement.fallback
        );
    }
    debug!("Terminals per cell: {:?}", placement.per_cell);

    let terminals = classify_terminals(&placement.positions, scenario.embb_ratio);
    let traffic = plan_traffic(
        &terminals,
        density,
        config.traffic.embb_port,
        config.traffic.urllc_port,
        config.general.app_start_time,
        config.general.sim_time,
        &mut rng,
    );

    info!(
        "Synthesized {} scenario: {} sites, {} terminals",
        density.label(),
        sites.len(),
        terminals.len()
    );

    Scenario {
        density,
        sites,
        terminals,
        fallback_terminals: placement.fallback,
        traffic,
    }
}

/// Attach every bound terminal to its nearest site
pub fn attach_terminals(
    aggregator: &mut Aggregator,
    scenario: &Scenario,
    bindings: &[TerminalBinding],
) {
    for (terminal, binding) in scenario.terminals.iter().zip(bindings) {
        match nearest_cell(&terminal.position, &scenario.sites) {
            Some(attachment) => {
                aggregator.record_attachment(binding.imsi, attachment.cell_id, attachment.distance)
            }
            None => warn!("No site to attach IMSI {} to", binding.imsi),
        }
    }
}

/// State left behind by a completed engine run
#[derive(Debug, Clone)]
pub struct ScoredRun {
    pub bindings: Vec<TerminalBinding>,
    pub aggregator: Aggregator,
    pub reports: Reports,
}

/// Install the scenario, run the engine and score its results.
///
/// Performs no file I/O.
pub fn execute<E: SimulationEngine + ?Sized>(
    config: &Config,
    scenario: &Scenario,
    engine: &mut E,
) -> Result<ScoredRun> {
    let bindings = engine
        .install(&scenario.sites, &scenario.terminals)
        .wrap_err("Failed to install scenario into the simulation engine")?;

    let mut aggregator = Aggregator::new();
    attach_terminals(&mut aggregator, scenario, &bindings);

    engine
        .run(&mut aggregator)
        .wrap_err("Simulation engine run failed")?;
    info!(
        "Run complete: channel data for {} terminal(s), {} handover attempt(s)",
        aggregator.tracked_terminals(),
        aggregator.handovers().attempts
    );

    let flows = engine.flow_snapshot();
    let addresses = AddressTable::from_bindings(&bindings);
    let reports = build_reports(config, &aggregator, &flows, &addresses);

    Ok(ScoredRun {
        bindings,
        aggregator,
        reports,
    })
}

/// Paths produced by [`run_scenario`]
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub reports: ReportPaths,
    pub registry: PathBuf,
}

/// Synthesize, run, score and write every report into `output_dir`
pub fn run_scenario<E: SimulationEngine + ?Sized>(
    config: &Config,
    engine: &mut E,
    output_dir: &Path,
) -> Result<RunOutput> {
    let scenario = build_scenario(config);
    let run = execute(config, &scenario, engine)?;

    let registry = TerminalRegistry::build(&scenario.terminals, &run.bindings, &run.aggregator);
    let registry_path = write_terminal_registry(&registry, output_dir)?;
    let report_paths = write_reports(&run.reports, config, output_dir)?;

    print_summary(&run.reports, &report_paths);

    Ok(RunOutput {
        reports: report_paths,
        registry: registry_path,
    })
}

/// Synthesize the scenario and write its layout for an external engine
pub fn generate_layout(config: &Config, output_dir: &Path) -> Result<PathBuf> {
    let scenario = build_scenario(config);
    write_scenario_layout(&scenario.layout(config), output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ReplayEngine, Trace};
    use std::net::Ipv4Addr;

    fn trace_for(terminals: usize) -> Trace {
        Trace {
            terminals: (0..terminals)
                .map(|i| TerminalBinding {
                    imsi: i as u64 + 1,
                    address: Ipv4Addr::new(7, 0, 0, i as u8 + 2),
                })
                .collect(),
            ..Trace::default()
        }
    }

    #[test]
    fn test_build_scenario_is_deterministic() {
        let mut config = Config::default();
        config.scenario.num_cells = 3;
        config.scenario.dense = true;

        let a = build_scenario(&config);
        let b = build_scenario(&config);
        assert_eq!(a, b);
        assert_eq!(a.sites.len(), 3);
        assert_eq!(a.terminals.len(), 30);
        assert_eq!(a.traffic.applications.len(), 30);

        config.general.seed = 2;
        assert_ne!(build_scenario(&config).terminals, a.terminals);
    }

    #[test]
    fn test_every_terminal_attached_to_nearest_site() {
        let mut config = Config::default();
        config.scenario.num_cells = 5;
        let scenario = build_scenario(&config);
        let mut engine = ReplayEngine::new(trace_for(30));

        let run = execute(&config, &scenario, &mut engine).unwrap();
        let attached: usize = (0..5).map(|c| run.aggregator.terminals_in_cell(c)).sum();
        assert_eq!(attached, 30);

        for (terminal, binding) in scenario.terminals.iter().zip(&run.bindings) {
            let serving = run.aggregator.serving_cell(binding.imsi).unwrap();
            for site in &scenario.sites {
                assert!(serving.distance <= terminal.position.distance_to(&site.position) + 1e-9);
            }
        }
    }

    #[test]
    fn test_engine_terminal_mismatch_is_an_error() {
        let config = Config::default();
        let scenario = build_scenario(&config);
        let mut engine = ReplayEngine::new(trace_for(3));
        assert!(execute(&config, &scenario, &mut engine).is_err());
    }

    #[test]
    fn test_layout_echoes_scenario() {
        let mut config = Config::default();
        config.scenario.dense = true;
        let scenario = build_scenario(&config);
        let layout = scenario.layout(&config);
        assert_eq!(layout.sites.len(), 1);
        assert_eq!(layout.terminals.len(), 30);
        assert_eq!(layout.propagation_model, "UMa");
        assert!((layout.effective_isd - 140.0).abs() < 1e-9);
    }
}
