use crate::config::Config;
use crate::utils::validation::validate_scenario_shape;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// Load the configuration file if one was given, otherwise start from defaults
pub fn load_or_default(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => load_config(path),
        None => {
            info!("No configuration file given, using the reference scenario");
            Ok(Config::default())
        }
    }
}

/// CLI arguments that override YAML settings
#[derive(Debug, Clone, Default)]
pub struct ScenarioOverrides {
    pub num_cells: Option<u32>,
    pub num_ues: Option<u32>,
    pub embb_ratio: Option<f64>,
    pub isd: Option<f64>,
    pub seed: Option<u64>,
    pub dense: Option<bool>,
    pub output_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Apply CLI overrides to a configuration and re-validate it
pub fn apply_overrides(config: &mut Config, overrides: &ScenarioOverrides) -> Result<()> {
    if let Some(num_cells) = overrides.num_cells {
        info!("Overriding num_cells: {} -> {}", config.scenario.num_cells, num_cells);
        config.scenario.num_cells = num_cells;
    }
    if let Some(num_ues) = overrides.num_ues {
        info!("Overriding num_ues: {} -> {}", config.scenario.num_ues, num_ues);
        config.scenario.num_ues = num_ues;
    }
    if let Some(ratio) = overrides.embb_ratio {
        config.scenario.embb_ratio = ratio;
    }
    if let Some(isd) = overrides.isd {
        config.scenario.isd = isd;
    }
    if let Some(seed) = overrides.seed {
        config.general.seed = seed;
    }
    if let Some(dense) = overrides.dense {
        config.scenario.dense = dense;
    }
    if let Some(dir) = &overrides.output_dir {
        config.general.output_dir = dir.clone();
    }
    if let Some(level) = &overrides.log_level {
        config.general.log_level = level.clone();
    }

    config.validate()?;
    validate_scenario_shape(config);

    Ok(())
}
