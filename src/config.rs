use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::topology::DensityClass;

/// Top-level configuration structure that mirrors the YAML configuration.
///
/// Every section and field has a default, so an empty document describes
/// the reference scenario: one sparse suburban cell, 30 terminals, 60% eMBB.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub scenario: ScenarioConfig,
    pub radio: RadioConfig,
    pub traffic: TrafficConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let general = &self.general;
        if general.sim_time.is_zero() {
            return Err(ValidationError::InvalidGeneral(
                "sim_time must be greater than zero".to_string(),
            ));
        }
        if general.app_start_time >= general.sim_time {
            return Err(ValidationError::InvalidGeneral(format!(
                "app_start_time ({:?}) must be before sim_time ({:?})",
                general.app_start_time, general.sim_time
            )));
        }

        let scenario = &self.scenario;
        if scenario.num_cells == 0 {
            return Err(ValidationError::InvalidScenario(
                "num_cells must be at least 1".to_string(),
            ));
        }
        if scenario.num_ues == 0 {
            return Err(ValidationError::InvalidScenario(
                "num_ues must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&scenario.embb_ratio) {
            return Err(ValidationError::InvalidScenario(format!(
                "embb_ratio must be within [0, 1], got {}",
                scenario.embb_ratio
            )));
        }
        if !(scenario.isd.is_finite() && scenario.isd > 0.0) {
            return Err(ValidationError::InvalidScenario(format!(
                "isd must be a positive distance, got {}",
                scenario.isd
            )));
        }

        if self.traffic.embb_port == self.traffic.urllc_port {
            return Err(ValidationError::InvalidTraffic(format!(
                "embb_port and urllc_port must differ (both {})",
                self.traffic.embb_port
            )));
        }

        Ok(())
    }

    pub fn density(&self) -> DensityClass {
        DensityClass::from_dense_flag(self.scenario.dense)
    }
}

/// Run-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Simulation end time (e.g. "15s", "2min")
    #[serde(with = "humantime_serde")]
    pub sim_time: Duration,
    /// Base start time of the traffic applications
    #[serde(with = "humantime_serde")]
    pub app_start_time: Duration,
    /// Seed of the placement and start-time random stream
    pub seed: u64,
    /// Directory the reports are written to
    pub output_dir: PathBuf,
    pub log_level: String,
}

/// Scenario shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Number of cell sites; 1, 3, 5, 7 and 9 have dedicated layouts
    pub num_cells: u32,
    /// Total number of terminals
    pub num_ues: u32,
    /// Fraction of terminals carrying eMBB traffic
    pub embb_ratio: f64,
    /// Inter-site distance in metres
    pub isd: f64,
    /// Dense urban (true) or sparse suburban (false)
    pub dense: bool,
}

/// Radio parameters handed to the engine and echoed in the reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    pub gnb_tx_power_dbm: f64,
    pub ue_tx_power_dbm: f64,
    pub gnb_height: f64,
    pub ue_height: f64,
    pub scheduler: String,
    pub handover_algorithm: String,
    pub numerology: u8,
    pub frequency_hz: f64,
    /// Channel bandwidth, also the reference for spectral efficiency
    pub bandwidth_hz: f64,
}

/// Application ports; the destination port identifies the traffic class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    pub embb_port: u16,
    pub urllc_port: u16,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid scenario configuration: {0}")]
    InvalidScenario(String),
    #[error("Invalid traffic configuration: {0}")]
    InvalidTraffic(String),
}

/// Default implementations
impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            sim_time: Duration::from_secs(15),
            app_start_time: Duration::from_secs(5),
            seed: 1,
            output_dir: PathBuf::from("./results"),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            num_cells: 1,
            num_ues: 30,
            embb_ratio: 0.6,
            isd: 200.0,
            dense: false,
        }
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            gnb_tx_power_dbm: 46.0,
            ue_tx_power_dbm: 26.0,
            gnb_height: 25.0,
            ue_height: 1.5,
            scheduler: "TdmaQos".to_string(),
            handover_algorithm: "A2A4".to_string(),
            numerology: 2,
            frequency_hz: 3.5e9,
            bandwidth_hz: 100e6,
        }
    }
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            embb_port: 7000,
            urllc_port: 7001,
        }
    }
}
