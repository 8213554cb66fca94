use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use cellsim::config_loader::{self, ScenarioOverrides};
use cellsim::engine::ReplayEngine;
use cellsim::orchestrator;

/// Multi-cell 5G scenario synthesis and performance scoring
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synthesize a scenario and write its layout for an external engine
    Layout(ScenarioArgs),

    /// Replay an engine trace against a scenario and write the reports
    Run {
        /// Recorded engine trace (JSON)
        #[arg(short, long)]
        trace: PathBuf,

        #[command(flatten)]
        scenario: ScenarioArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct ScenarioArgs {
    /// Path to the scenario configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for reports and registries
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of cell sites
    #[arg(long)]
    num_cells: Option<u32>,

    /// Number of terminals
    #[arg(long)]
    num_ues: Option<u32>,

    /// Fraction of eMBB terminals
    #[arg(long)]
    embb_ratio: Option<f64>,

    /// Inter-site distance in metres
    #[arg(long)]
    isd: Option<f64>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Dense urban scenario
    #[arg(long)]
    dense: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

impl ScenarioArgs {
    fn overrides(&self) -> ScenarioOverrides {
        ScenarioOverrides {
            num_cells: self.num_cells,
            num_ues: self.num_ues,
            embb_ratio: self.embb_ratio,
            isd: self.isd,
            seed: self.seed,
            dense: self.dense.then_some(true),
            output_dir: self.output.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();
    let scenario_args = match &args.command {
        Command::Layout(scenario) => scenario,
        Command::Run { scenario, .. } => scenario,
    };

    // The configured level is the default; RUST_LOG still wins
    let mut config = config_loader::load_or_default(scenario_args.config.as_deref())?;
    let level = scenario_args
        .log_level
        .clone()
        .unwrap_or_else(|| config.general.log_level.clone());
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    config_loader::apply_overrides(&mut config, &scenario_args.overrides())?;
    let output_dir = config.general.output_dir.clone();
    info!("Output directory: {:?}", output_dir);

    match &args.command {
        Command::Layout(_) => {
            let path = orchestrator::generate_layout(&config, &output_dir)?;
            info!("Scenario layout written to {:?}", path);
        }
        Command::Run { trace, .. } => {
            let mut engine = ReplayEngine::from_path(trace)?;
            let output = orchestrator::run_scenario(&config, &mut engine, &output_dir)?;
            info!("Terminal registry written to {:?}", output.registry);
        }
    }

    Ok(())
}
