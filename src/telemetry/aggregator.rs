//! Keyed telemetry accumulators.
//!
//! One `Aggregator` owns every table that the simulation engine's trace
//! callbacks update during a run. Records are created on first use and
//! never removed, so the tables are bounded by the number of terminals.
//! After the run the aggregator is only read.

use std::collections::HashMap;

use log::trace;

use super::history::{SinrHistory, SINR_HISTORY_CAPACITY};
use super::sink::{CellId, Imsi, TelemetrySink};

/// Running channel-quality statistics for one terminal
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMetrics {
    pub sum_sinr_db: f64,
    pub sum_rsrp_dbm: f64,
    pub sum_rsrq_db: f64,
    /// Number of valid SINR samples
    pub samples: u64,
    min_sinr_db: f64,
    max_sinr_db: f64,
}

impl Default for ChannelMetrics {
    fn default() -> Self {
        Self {
            sum_sinr_db: 0.0,
            sum_rsrp_dbm: 0.0,
            sum_rsrq_db: 0.0,
            samples: 0,
            min_sinr_db: f64::INFINITY,
            max_sinr_db: f64::NEG_INFINITY,
        }
    }
}

impl ChannelMetrics {
    fn record_sinr(&mut self, sinr_db: f64) {
        self.sum_sinr_db += sinr_db;
        self.samples += 1;
        self.min_sinr_db = self.min_sinr_db.min(sinr_db);
        self.max_sinr_db = self.max_sinr_db.max(sinr_db);
    }

    pub fn has_samples(&self) -> bool {
        self.samples > 0
    }

    /// Mean SINR over every sample seen, 0 without samples
    pub fn avg_sinr_db(&self) -> f64 {
        self.per_sample(self.sum_sinr_db)
    }

    /// Lowest SINR seen, 0 without samples
    pub fn min_sinr_db(&self) -> f64 {
        if self.has_samples() {
            self.min_sinr_db
        } else {
            0.0
        }
    }

    /// Highest SINR seen, 0 without samples
    pub fn max_sinr_db(&self) -> f64 {
        if self.has_samples() {
            self.max_sinr_db
        } else {
            0.0
        }
    }

    /// RSRP sum over the SINR sample count.
    ///
    /// RSRP reports are not counted separately, so this is an approximation.
    pub fn avg_rsrp_dbm(&self) -> f64 {
        self.per_sample(self.sum_rsrp_dbm)
    }

    /// RSRQ sum over the SINR sample count, same approximation as RSRP
    pub fn avg_rsrq_db(&self) -> f64 {
        self.per_sample(self.sum_rsrq_db)
    }

    fn per_sample(&self, sum: f64) -> f64 {
        if self.samples > 0 {
            sum / self.samples as f64
        } else {
            0.0
        }
    }
}

/// Process-wide handover event counters. Never decremented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandoverCounters {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
}

impl HandoverCounters {
    /// Successful handovers as a percentage of attempts, 0 without attempts
    pub fn success_rate(&self) -> f64 {
        if self.attempts > 0 {
            100.0 * self.successes as f64 / self.attempts as f64
        } else {
            0.0
        }
    }
}

/// Serving cell of a terminal, recorded once after attachment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServingCell {
    pub cell_id: u32,
    pub distance: f64,
}

/// Accumulates channel-quality, mobility and attachment state for one run
#[derive(Debug, Clone)]
pub struct Aggregator {
    channel: HashMap<Imsi, ChannelMetrics>,
    history: HashMap<Imsi, SinrHistory>,
    serving: HashMap<Imsi, ServingCell>,
    cell_terminals: HashMap<u32, usize>,
    handovers: HandoverCounters,
    history_capacity: usize,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self::with_history_capacity(SINR_HISTORY_CAPACITY)
    }

    pub fn with_history_capacity(history_capacity: usize) -> Self {
        Self {
            channel: HashMap::new(),
            history: HashMap::new(),
            serving: HashMap::new(),
            cell_terminals: HashMap::new(),
            handovers: HandoverCounters::default(),
            history_capacity,
        }
    }

    /// Records the serving cell of a terminal.
    ///
    /// Re-recording the same terminal moves it to the new cell.
    pub fn record_attachment(&mut self, imsi: Imsi, cell_id: u32, distance: f64) {
        if let Some(previous) = self.serving.insert(imsi, ServingCell { cell_id, distance }) {
            if let Some(count) = self.cell_terminals.get_mut(&previous.cell_id) {
                *count = count.saturating_sub(1);
            }
        }
        *self.cell_terminals.entry(cell_id).or_insert(0) += 1;
    }

    pub fn serving_cell(&self, imsi: Imsi) -> Option<ServingCell> {
        self.serving.get(&imsi).copied()
    }

    /// Number of terminals attached to `cell_id`
    pub fn terminals_in_cell(&self, cell_id: u32) -> usize {
        self.cell_terminals.get(&cell_id).copied().unwrap_or(0)
    }

    pub fn channel_metrics(&self, imsi: Imsi) -> Option<&ChannelMetrics> {
        self.channel.get(&imsi)
    }

    pub fn sinr_history(&self, imsi: Imsi) -> Option<&SinrHistory> {
        self.history.get(&imsi)
    }

    pub fn handovers(&self) -> HandoverCounters {
        self.handovers
    }

    /// Number of terminals with channel records
    pub fn tracked_terminals(&self) -> usize {
        self.channel.len()
    }
}

impl TelemetrySink for Aggregator {
    fn on_channel_sample(&mut self, imsi: Imsi, sinr_linear: f64) {
        // Non-positive ratios have no dB value
        if sinr_linear <= 0.0 || !sinr_linear.is_finite() {
            return;
        }
        let sinr_db = 10.0 * sinr_linear.log10();

        self.channel.entry(imsi).or_default().record_sinr(sinr_db);
        let capacity = self.history_capacity;
        self.history
            .entry(imsi)
            .or_insert_with(|| SinrHistory::with_capacity(capacity))
            .push(sinr_db);
    }

    fn on_rsrp(&mut self, imsi: Imsi, _cell: CellId, rsrp_dbm: f64) {
        self.channel.entry(imsi).or_default().sum_rsrp_dbm += rsrp_dbm;
    }

    fn on_rsrq(&mut self, imsi: Imsi, _cell: CellId, rsrq_db: f64) {
        self.channel.entry(imsi).or_default().sum_rsrq_db += rsrq_db;
    }

    fn on_handover_start(&mut self, imsi: Imsi, source: CellId, target: CellId) {
        trace!("Handover start: IMSI {} cell {} -> {}", imsi, source, target);
        self.handovers.attempts += 1;
    }

    fn on_handover_success(&mut self, _imsi: Imsi, _source: CellId, _target: CellId) {
        self.handovers.successes += 1;
    }

    fn on_handover_failure(&mut self, imsi: Imsi, source: CellId, target: CellId) {
        trace!("Handover failure: IMSI {} cell {} -> {}", imsi, source, target);
        self.handovers.failures += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_sinr_converted_to_db() {
        let mut agg = Aggregator::new();
        agg.on_channel_sample(1, 100.0);
        let metrics = agg.channel_metrics(1).unwrap();
        assert_eq!(metrics.samples, 1);
        assert_eq!(metrics.sum_sinr_db, 20.0);
        assert_eq!(metrics.min_sinr_db(), 20.0);
        assert_eq!(metrics.max_sinr_db(), 20.0);
        assert_eq!(agg.sinr_history(1).unwrap().len(), 1);
    }

    #[test]
    fn test_non_positive_sinr_ignored() {
        let mut agg = Aggregator::new();
        agg.on_channel_sample(1, 10.0);
        agg.on_channel_sample(1, 0.0);
        agg.on_channel_sample(1, -3.0);
        agg.on_channel_sample(2, 0.0);

        assert_eq!(agg.channel_metrics(1).unwrap().samples, 1);
        assert_eq!(agg.sinr_history(1).unwrap().len(), 1);
        assert!(agg.channel_metrics(2).is_none());
        assert!(agg.sinr_history(2).is_none());
    }

    #[test]
    fn test_min_max_bracket_samples() {
        let mut agg = Aggregator::new();
        for linear in [2.0, 1000.0, 0.5, 31.6] {
            agg.on_channel_sample(7, linear);
        }
        let metrics = agg.channel_metrics(7).unwrap();
        assert_eq!(metrics.samples, 4);
        assert!((metrics.min_sinr_db() - 10.0 * 0.5f64.log10()).abs() < 1e-12);
        assert!((metrics.max_sinr_db() - 30.0).abs() < 1e-12);
        for s in agg.sinr_history(7).unwrap().iter() {
            assert!(*s >= metrics.min_sinr_db() && *s <= metrics.max_sinr_db());
        }
    }

    #[test]
    fn test_history_bounded() {
        let mut agg = Aggregator::new();
        for _ in 0..1001 {
            agg.on_channel_sample(3, 10.0);
        }
        assert_eq!(agg.sinr_history(3).unwrap().len(), 1000);
        assert_eq!(agg.channel_metrics(3).unwrap().samples, 1001);
    }

    #[test]
    fn test_rsrp_rsrq_averaged_over_sinr_samples() {
        let mut agg = Aggregator::new();
        agg.on_rsrp(1, 1, -80.0);
        agg.on_rsrp(1, 1, -90.0);
        agg.on_rsrq(1, 1, -10.0);
        let metrics = agg.channel_metrics(1).unwrap();
        assert_eq!(metrics.avg_rsrp_dbm(), 0.0);

        agg.on_channel_sample(1, 10.0);
        agg.on_channel_sample(1, 10.0);
        let metrics = agg.channel_metrics(1).unwrap();
        assert_eq!(metrics.avg_rsrp_dbm(), -85.0);
        assert_eq!(metrics.avg_rsrq_db(), -5.0);
    }

    #[test]
    fn test_handover_counters() {
        let mut agg = Aggregator::new();
        for _ in 0..10 {
            agg.on_handover_start(1, 1, 2);
        }
        for _ in 0..7 {
            agg.on_handover_success(1, 1, 2);
        }
        for _ in 0..3 {
            agg.on_handover_failure(1, 1, 2);
        }
        let counters = agg.handovers();
        assert_eq!(counters.attempts, 10);
        assert_eq!(counters.successes, 7);
        assert_eq!(counters.failures, 3);
        assert!((counters.success_rate() - 70.0).abs() < 1e-12);
        assert_eq!(HandoverCounters::default().success_rate(), 0.0);
    }

    #[test]
    fn test_attachment_counts() {
        let mut agg = Aggregator::new();
        agg.record_attachment(1, 0, 12.5);
        agg.record_attachment(2, 0, 40.0);
        agg.record_attachment(3, 2, 8.0);
        assert_eq!(agg.terminals_in_cell(0), 2);
        assert_eq!(agg.terminals_in_cell(1), 0);
        assert_eq!(agg.serving_cell(3), Some(ServingCell { cell_id: 2, distance: 8.0 }));

        agg.record_attachment(2, 2, 30.0);
        assert_eq!(agg.terminals_in_cell(0), 1);
        assert_eq!(agg.terminals_in_cell(2), 2);
    }
}
