//! Offered traffic per terminal class.
//!
//! eMBB terminals share a scenario-wide budget evenly, with each share
//! clamped to a floor and ceiling so that queues stay bounded. URLLC
//! terminals send small packets at a fixed interval.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::types::{DensityClass, PlacedTerminal, TrafficClass};

const DENSE_EMBB_BUDGET_BPS: f64 = 300e6;
const SPARSE_EMBB_BUDGET_BPS: f64 = 200e6;
const EMBB_MIN_RATE_BPS: f64 = 5e6;
const EMBB_MAX_RATE_BPS: f64 = 20e6;
const EMBB_DEFAULT_RATE_BPS: u64 = 10_000_000;
const EMBB_PACKET_SIZE: u32 = 1400;
const URLLC_PACKET_SIZE: u32 = 100;

/// Upper bound of the uniform start-time offset applied to each application
pub const APP_START_JITTER: Duration = Duration::from_millis(500);

/// Traffic profile of one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum TrafficProfile {
    /// Always-on constant bit rate source
    OnOff { rate_bps: u64, packet_size: u32 },
    /// Fixed-interval packet source with no packet limit
    Periodic { interval_us: u64, packet_size: u32 },
}

/// Application attached to one terminal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub terminal: usize,
    pub class: TrafficClass,
    pub port: u16,
    /// Start time in seconds
    pub start: f64,
    /// Stop time in seconds
    pub stop: f64,
}

/// Offered load for the whole scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficPlan {
    pub embb: TrafficProfile,
    pub urllc: TrafficProfile,
    pub applications: Vec<Application>,
}

/// Per-terminal eMBB rate for `embb_terminals` terminals sharing the
/// scenario budget.
pub fn embb_rate_bps(embb_terminals: usize, density: DensityClass) -> u64 {
    if embb_terminals == 0 {
        return EMBB_DEFAULT_RATE_BPS;
    }
    let budget = match density {
        DensityClass::DenseUrban => DENSE_EMBB_BUDGET_BPS,
        DensityClass::SparseSuburban => SPARSE_EMBB_BUDGET_BPS,
    };
    let share = budget / embb_terminals as f64;
    share.clamp(EMBB_MIN_RATE_BPS, EMBB_MAX_RATE_BPS) as u64
}

/// URLLC packet interval
pub fn urllc_interval(density: DensityClass) -> Duration {
    match density {
        DensityClass::DenseUrban => Duration::from_micros(500),
        DensityClass::SparseSuburban => Duration::from_millis(1),
    }
}

/// Builds the traffic plan for the classified terminals.
///
/// Each terminal gets one application on its class port. Start times are
/// `app_start` plus a uniform offset in `[0, 500 ms)`, drawn from `rng` in
/// terminal order; every application stops at `sim_time`.
pub fn plan_traffic<R: Rng + ?Sized>(
    terminals: &[PlacedTerminal],
    density: DensityClass,
    embb_port: u16,
    urllc_port: u16,
    app_start: Duration,
    sim_time: Duration,
    rng: &mut R,
) -> TrafficPlan {
    let embb_terminals = terminals.iter().filter(|t| t.class == TrafficClass::Embb).count();
    let jitter = APP_START_JITTER.as_secs_f64();

    let applications = terminals
        .iter()
        .map(|t| Application {
            terminal: t.index,
            class: t.class,
            port: match t.class {
                TrafficClass::Embb => embb_port,
                TrafficClass::Urllc => urllc_port,
            },
            start: app_start.as_secs_f64() + rng.gen_range(0.0..jitter),
            stop: sim_time.as_secs_f64(),
        })
        .collect();

    TrafficPlan {
        embb: TrafficProfile::OnOff {
            rate_bps: embb_rate_bps(embb_terminals, density),
            packet_size: EMBB_PACKET_SIZE,
        },
        urllc: TrafficProfile::Periodic {
            interval_us: urllc_interval(density).as_micros() as u64,
            packet_size: URLLC_PACKET_SIZE,
        },
        applications,
    }
}
