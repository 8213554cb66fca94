//! Report data types produced by the scoring pass.

use std::net::Ipv4Addr;

use serde::Serialize;

use crate::telemetry::Imsi;
use crate::topology::TrafficClass;

/// One scored flow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowReport {
    pub flow_id: u32,
    pub class: TrafficClass,
    pub imsi: Imsi,
    pub serving_cell: u32,
    /// Distance to the serving site in metres
    pub distance: f64,
    pub destination: Ipv4Addr,
    pub avg_sinr_db: f64,
    pub min_sinr_db: f64,
    pub max_sinr_db: f64,
    pub sinr_std_dev_db: f64,
    pub avg_rsrp_dbm: f64,
    pub avg_rsrq_db: f64,
    pub tx_packets: u64,
    pub rx_packets: u64,
    pub lost_packets: u64,
    pub loss_ratio_pct: f64,
    pub throughput_mbps: f64,
    pub mean_delay_ms: f64,
    pub mean_jitter_ms: f64,
    pub qoe_score: f64,
    pub reliability_score: f64,
    pub numerology: u8,
}

/// Running totals of the flows served by one cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellSummary {
    pub total_throughput_mbps: f64,
    pub tx_packets: u64,
    pub rx_packets: u64,
    pub lost_packets: u64,
    /// Sum of per-flow average SINR, one term per flow
    pub sinr_sum_db: f64,
    pub delay_sum_ms: f64,
    pub jitter_sum_ms: f64,
    pub flows: u32,
}

impl CellSummary {
    pub fn add_flow(&mut self, flow: &FlowReport) {
        self.total_throughput_mbps += flow.throughput_mbps;
        self.tx_packets += flow.tx_packets;
        self.rx_packets += flow.rx_packets;
        self.lost_packets += flow.lost_packets;
        self.sinr_sum_db += flow.avg_sinr_db;
        self.delay_sum_ms += flow.mean_delay_ms;
        self.jitter_sum_ms += flow.mean_jitter_ms;
        self.flows += 1;
    }

    pub fn loss_ratio_pct(&self) -> f64 {
        if self.tx_packets > 0 {
            100.0 * self.lost_packets as f64 / self.tx_packets as f64
        } else {
            0.0
        }
    }

    pub fn avg_sinr_db(&self) -> f64 {
        self.per_flow(self.sinr_sum_db)
    }

    pub fn avg_delay_ms(&self) -> f64 {
        self.per_flow(self.delay_sum_ms)
    }

    pub fn avg_jitter_ms(&self) -> f64 {
        self.per_flow(self.jitter_sum_ms)
    }

    fn per_flow(&self, sum: f64) -> f64 {
        if self.flows > 0 {
            sum / self.flows as f64
        } else {
            0.0
        }
    }
}

/// One row of the cell report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellReport {
    pub cell_id: u32,
    /// Terminals attached to the cell, whether or not they carried a flow
    pub terminals: usize,
    pub flows: u32,
    pub total_throughput_mbps: f64,
    /// bps/Hz over the reference bandwidth
    pub spectral_efficiency: f64,
    pub tx_packets: u64,
    pub rx_packets: u64,
    pub lost_packets: u64,
    pub loss_ratio_pct: f64,
    pub avg_sinr_db: f64,
    pub avg_delay_ms: f64,
    pub avg_jitter_ms: f64,
    pub qoe_score: f64,
    pub reliability_score: f64,
    pub load_balance_pct: f64,
}

/// System-wide results plus the scenario echo
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemReport {
    pub total_throughput_mbps: f64,
    pub avg_throughput_per_cell_mbps: f64,
    pub avg_throughput_per_ue_mbps: f64,
    pub avg_urllc_delay_ms: f64,
    pub avg_embb_delay_ms: f64,
    pub handover_attempts: u64,
    pub handover_successes: u64,
    pub handover_failures: u64,
    pub handover_success_rate_pct: f64,
    /// bps/Hz per cell
    pub spectral_efficiency: f64,
    /// Terminals per square kilometre
    pub ue_density_per_km2: f64,
    pub scored_flows: usize,
    pub skipped_flows: usize,
    pub scenario: ScenarioEcho,
}

/// Configuration values repeated in the system report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioEcho {
    pub scenario_type: String,
    pub num_cells: u32,
    pub num_ues: u32,
    pub embb_ratio: f64,
    pub isd: f64,
    pub sim_time_s: f64,
    pub app_start_time_s: f64,
    pub seed: u64,
    pub numerology: u8,
    pub ue_tx_power_dbm: f64,
    pub propagation_model: String,
}

/// The three reports of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reports {
    pub flows: Vec<FlowReport>,
    pub cells: Vec<CellReport>,
    pub system: SystemReport,
}
