//! Per-flow and per-cell metrics and the heuristic scores built on them.
//!
//! Every score starts at 100 and is scaled down by each threshold it
//! misses, then clamped to [0, 100].

use crate::engine::FlowRecord;
use crate::telemetry::ChannelMetrics;
use crate::topology::TrafficClass;

const PERFECT_SCORE: f64 = 100.0;

/// eMBB targets
const EMBB_TARGET_THROUGHPUT_MBPS: f64 = 25.0;
const EMBB_MAX_DELAY_MS: f64 = 20.0;
const EMBB_MAX_LOSS_PCT: f64 = 1.0;

/// URLLC targets
const URLLC_MAX_DELAY_MS: f64 = 5.0;
const URLLC_MAX_LOSS_PCT: f64 = 0.1;
const URLLC_MAX_JITTER_MS: f64 = 2.0;

/// Channel stability targets
const MAX_SINR_RANGE_DB: f64 = 20.0;
const MIN_FLOW_SINR_DB: f64 = 10.0;

/// Cell targets
const CELL_MAX_DELAY_MS: f64 = 10.0;
const CELL_MAX_LOSS_PCT: f64 = 1.0;
const CELL_TARGET_SINR_DB: f64 = 15.0;
const CELL_RELIABILITY_LOSS_WEIGHT: f64 = 10.0;
const CELL_RELIABILITY_MIN_SINR_DB: f64 = 10.0;

/// Limits a score to [0, 100]; NaN maps to 0
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, PERFECT_SCORE)
    }
}

/// Transport metrics derived from one flow record
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlowMetrics {
    pub lost_packets: u64,
    pub loss_ratio_pct: f64,
    pub throughput_mbps: f64,
    pub mean_delay_ms: f64,
    pub mean_jitter_ms: f64,
}

impl FlowMetrics {
    pub fn from_record(record: &FlowRecord) -> Self {
        let lost_packets = record.tx_packets.saturating_sub(record.rx_packets);

        let loss_ratio_pct = if record.tx_packets > 0 {
            100.0 * lost_packets as f64 / record.tx_packets as f64
        } else {
            0.0
        };

        let active = record.time_last_rx - record.time_first_tx;
        let throughput_mbps = if record.rx_packets > 0 && active > 0.0 {
            record.rx_bytes as f64 * 8.0 / (active * 1e6)
        } else {
            0.0
        };

        let mean_delay_ms = if record.rx_packets > 0 {
            record.delay_sum / record.rx_packets as f64 * 1000.0
        } else {
            0.0
        };

        // Jitter is accumulated between consecutive received packets
        let mean_jitter_ms = if record.rx_packets > 1 {
            record.jitter_sum / (record.rx_packets - 1) as f64 * 1000.0
        } else {
            0.0
        };

        Self {
            lost_packets,
            loss_ratio_pct,
            throughput_mbps,
            mean_delay_ms,
            mean_jitter_ms,
        }
    }
}

/// Quality-of-experience score of a flow against its class targets
pub fn flow_qoe_score(class: TrafficClass, metrics: &FlowMetrics) -> f64 {
    let mut score = PERFECT_SCORE;
    match class {
        TrafficClass::Embb => {
            if metrics.throughput_mbps < EMBB_TARGET_THROUGHPUT_MBPS {
                score *= metrics.throughput_mbps / EMBB_TARGET_THROUGHPUT_MBPS;
            }
            if metrics.mean_delay_ms > EMBB_MAX_DELAY_MS {
                score *= EMBB_MAX_DELAY_MS / metrics.mean_delay_ms;
            }
            if metrics.loss_ratio_pct > EMBB_MAX_LOSS_PCT {
                score *= EMBB_MAX_LOSS_PCT / metrics.loss_ratio_pct;
            }
        }
        TrafficClass::Urllc => {
            if metrics.mean_delay_ms > URLLC_MAX_DELAY_MS {
                score *= URLLC_MAX_DELAY_MS / metrics.mean_delay_ms;
            }
            if metrics.loss_ratio_pct > URLLC_MAX_LOSS_PCT {
                score *= URLLC_MAX_LOSS_PCT / metrics.loss_ratio_pct;
            }
            if metrics.mean_jitter_ms > URLLC_MAX_JITTER_MS {
                score *= URLLC_MAX_JITTER_MS / metrics.mean_jitter_ms;
            }
        }
    }
    clamp_score(score)
}

/// Channel reliability of a terminal.
///
/// A terminal with no SINR samples keeps the full score.
pub fn flow_reliability_score(channel: &ChannelMetrics) -> f64 {
    let mut score = PERFECT_SCORE;
    if channel.has_samples() {
        let range = channel.max_sinr_db() - channel.min_sinr_db();
        if range > MAX_SINR_RANGE_DB {
            score *= MAX_SINR_RANGE_DB / range;
        }
        let avg = channel.avg_sinr_db();
        if avg < MIN_FLOW_SINR_DB {
            score *= avg / MIN_FLOW_SINR_DB;
        }
    }
    clamp_score(score)
}

pub fn cell_qoe_score(avg_delay_ms: f64, loss_ratio_pct: f64, avg_sinr_db: f64) -> f64 {
    let mut score = PERFECT_SCORE;
    if avg_delay_ms > CELL_MAX_DELAY_MS {
        score *= CELL_MAX_DELAY_MS / avg_delay_ms;
    }
    if loss_ratio_pct > CELL_MAX_LOSS_PCT {
        score *= CELL_MAX_LOSS_PCT / loss_ratio_pct;
    }
    if avg_sinr_db < CELL_TARGET_SINR_DB {
        score *= avg_sinr_db / CELL_TARGET_SINR_DB;
    }
    clamp_score(score)
}

pub fn cell_reliability_score(loss_ratio_pct: f64, avg_sinr_db: f64) -> f64 {
    let mut score = PERFECT_SCORE - loss_ratio_pct * CELL_RELIABILITY_LOSS_WEIGHT;
    if avg_sinr_db < CELL_RELIABILITY_MIN_SINR_DB {
        score *= avg_sinr_db / CELL_RELIABILITY_MIN_SINR_DB;
    }
    clamp_score(score)
}

/// Cell throughput as a percentage of the busiest cell's
pub fn load_balance_pct(throughput_mbps: f64, max_throughput_mbps: f64) -> f64 {
    if max_throughput_mbps > 0.0 {
        throughput_mbps / max_throughput_mbps * 100.0
    } else {
        0.0
    }
}

/// Throughput in bps/Hz over `bandwidth_hz`
pub fn spectral_efficiency(throughput_mbps: f64, bandwidth_hz: f64) -> f64 {
    if bandwidth_hz > 0.0 {
        throughput_mbps * 1e6 / bandwidth_hz
    } else {
        0.0
    }
}
