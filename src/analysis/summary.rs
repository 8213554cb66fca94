//! The reporting pass.
//!
//! Runs once over the engine's final flow snapshot and the aggregator's
//! tables. Both inputs are only read, so running the pass twice over the
//! same state yields identical reports.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use log::debug;

use super::scoring::{
    cell_qoe_score, cell_reliability_score, flow_qoe_score, flow_reliability_score,
    load_balance_pct, spectral_efficiency, FlowMetrics,
};
use super::types::{CellReport, CellSummary, FlowReport, Reports, ScenarioEcho, SystemReport};
use crate::config::Config;
use crate::engine::{AddressTable, FlowRecord};
use crate::telemetry::{Aggregator, ChannelMetrics};
use crate::topology::TrafficClass;

/// Coverage radius of one cell as a multiple of the inter-site distance,
/// used for the terminal density estimate
const COVERAGE_RADIUS_FACTOR: f64 = 1.2;

/// Why a flow was left out of the reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SkippedFlows {
    unclassified: usize,
    unresolved: usize,
}

impl SkippedFlows {
    fn total(&self) -> usize {
        self.unclassified + self.unresolved
    }
}

/// Traffic class of a flow from its destination port
fn classify_flow(config: &Config, destination_port: u16) -> Option<TrafficClass> {
    if destination_port == config.traffic.embb_port {
        Some(TrafficClass::Embb)
    } else if destination_port == config.traffic.urllc_port {
        Some(TrafficClass::Urllc)
    } else {
        None
    }
}

/// Score every flow and build the flow, cell and system reports.
///
/// Flows are visited in flow id order. A flow whose port matches neither
/// class, or whose destination has no attached terminal, is skipped.
pub fn build_reports(
    config: &Config,
    aggregator: &Aggregator,
    flows: &[FlowRecord],
    addresses: &AddressTable,
) -> Reports {
    let mut ordered: Vec<&FlowRecord> = flows.iter().collect();
    ordered.sort_by_key(|flow| flow.flow_id);

    let no_samples = ChannelMetrics::default();
    let mut skipped = SkippedFlows::default();
    let mut flow_reports = Vec::with_capacity(ordered.len());

    for record in ordered {
        let Some(class) = classify_flow(config, record.destination_port) else {
            skipped.unclassified += 1;
            continue;
        };
        let Some((imsi, serving)) = addresses
            .lookup(&record.destination_address)
            .and_then(|imsi| aggregator.serving_cell(imsi).map(|cell| (imsi, cell)))
        else {
            skipped.unresolved += 1;
            continue;
        };

        let channel = aggregator.channel_metrics(imsi).unwrap_or(&no_samples);
        let sinr_std_dev_db = aggregator
            .sinr_history(imsi)
            .map(|history| history.std_dev())
            .unwrap_or(0.0);
        let metrics = FlowMetrics::from_record(record);

        flow_reports.push(FlowReport {
            flow_id: record.flow_id,
            class,
            imsi,
            serving_cell: serving.cell_id,
            distance: serving.distance,
            destination: record.destination_address,
            avg_sinr_db: channel.avg_sinr_db(),
            min_sinr_db: channel.min_sinr_db(),
            max_sinr_db: channel.max_sinr_db(),
            sinr_std_dev_db,
            avg_rsrp_dbm: channel.avg_rsrp_dbm(),
            avg_rsrq_db: channel.avg_rsrq_db(),
            tx_packets: record.tx_packets,
            rx_packets: record.rx_packets,
            lost_packets: metrics.lost_packets,
            loss_ratio_pct: metrics.loss_ratio_pct,
            throughput_mbps: metrics.throughput_mbps,
            mean_delay_ms: metrics.mean_delay_ms,
            mean_jitter_ms: metrics.mean_jitter_ms,
            qoe_score: flow_qoe_score(class, &metrics),
            reliability_score: flow_reliability_score(channel),
            numerology: config.radio.numerology,
        });
    }

    if skipped.total() > 0 {
        debug!(
            "Skipped {} flow(s): {} on unknown ports, {} without a terminal",
            skipped.total(),
            skipped.unclassified,
            skipped.unresolved
        );
    }

    let cells = build_cell_reports(config, aggregator, &flow_reports);
    let system = build_system_report(config, aggregator, &flow_reports, skipped);

    Reports {
        flows: flow_reports,
        cells,
        system,
    }
}

fn build_cell_reports(
    config: &Config,
    aggregator: &Aggregator,
    flows: &[FlowReport],
) -> Vec<CellReport> {
    let mut summaries: BTreeMap<u32, CellSummary> = BTreeMap::new();
    for flow in flows {
        summaries.entry(flow.serving_cell).or_default().add_flow(flow);
    }

    let max_throughput = summaries
        .values()
        .map(|summary| summary.total_throughput_mbps)
        .fold(0.0, f64::max);

    let empty = CellSummary::default();
    (0..config.scenario.num_cells)
        .map(|cell_id| {
            let summary = summaries.get(&cell_id).unwrap_or(&empty);
            let loss_ratio_pct = summary.loss_ratio_pct();
            let avg_sinr_db = summary.avg_sinr_db();
            let avg_delay_ms = summary.avg_delay_ms();

            CellReport {
                cell_id,
                terminals: aggregator.terminals_in_cell(cell_id),
                flows: summary.flows,
                total_throughput_mbps: summary.total_throughput_mbps,
                spectral_efficiency: spectral_efficiency(
                    summary.total_throughput_mbps,
                    config.radio.bandwidth_hz,
                ),
                tx_packets: summary.tx_packets,
                rx_packets: summary.rx_packets,
                lost_packets: summary.lost_packets,
                loss_ratio_pct,
                avg_sinr_db,
                avg_delay_ms,
                avg_jitter_ms: summary.avg_jitter_ms(),
                qoe_score: cell_qoe_score(avg_delay_ms, loss_ratio_pct, avg_sinr_db),
                reliability_score: cell_reliability_score(loss_ratio_pct, avg_sinr_db),
                load_balance_pct: load_balance_pct(summary.total_throughput_mbps, max_throughput),
            }
        })
        .collect()
}

fn mean(sum: f64, count: usize) -> f64 {
    if count > 0 {
        sum / count as f64
    } else {
        0.0
    }
}

fn build_system_report(
    config: &Config,
    aggregator: &Aggregator,
    flows: &[FlowReport],
    skipped: SkippedFlows,
) -> SystemReport {
    let scenario = &config.scenario;
    let num_cells = scenario.num_cells as f64;

    let total_throughput_mbps: f64 = flows.iter().map(|flow| flow.throughput_mbps).sum();

    let class_delay = |class: TrafficClass| {
        let delays: Vec<f64> = flows
            .iter()
            .filter(|flow| flow.class == class)
            .map(|flow| flow.mean_delay_ms)
            .collect();
        mean(delays.iter().sum(), delays.len())
    };

    let handovers = aggregator.handovers();

    let coverage_area_m2 = PI * (COVERAGE_RADIUS_FACTOR * scenario.isd).powi(2) * num_cells;
    let ue_density_per_km2 = if coverage_area_m2 > 0.0 {
        scenario.num_ues as f64 / (coverage_area_m2 * 1e-6)
    } else {
        0.0
    };

    let density = config.density();
    SystemReport {
        total_throughput_mbps,
        avg_throughput_per_cell_mbps: mean(total_throughput_mbps, scenario.num_cells as usize),
        avg_throughput_per_ue_mbps: mean(total_throughput_mbps, scenario.num_ues as usize),
        avg_urllc_delay_ms: class_delay(TrafficClass::Urllc),
        avg_embb_delay_ms: class_delay(TrafficClass::Embb),
        handover_attempts: handovers.attempts,
        handover_successes: handovers.successes,
        handover_failures: handovers.failures,
        handover_success_rate_pct: handovers.success_rate(),
        spectral_efficiency: spectral_efficiency(
            total_throughput_mbps,
            config.radio.bandwidth_hz * num_cells,
        ),
        ue_density_per_km2,
        scored_flows: flows.len(),
        skipped_flows: skipped.total(),
        scenario: ScenarioEcho {
            scenario_type: density.label().to_string(),
            num_cells: scenario.num_cells,
            num_ues: scenario.num_ues,
            embb_ratio: scenario.embb_ratio,
            isd: scenario.isd,
            sim_time_s: config.general.sim_time.as_secs_f64(),
            app_start_time_s: config.general.app_start_time.as_secs_f64(),
            seed: config.general.seed,
            numerology: config.radio.numerology,
            ue_tx_power_dbm: config.radio.ue_tx_power_dbm,
            propagation_model: density.propagation_model().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TerminalBinding;
    use crate::telemetry::TelemetrySink;
    use std::net::Ipv4Addr;

    fn address(imsi: u64) -> Ipv4Addr {
        Ipv4Addr::new(7, 0, 0, imsi as u8 + 1)
    }

    fn flow(flow_id: u32, imsi: u64, port: u16) -> FlowRecord {
        FlowRecord {
            flow_id,
            source_address: Ipv4Addr::new(1, 0, 0, 2),
            destination_address: address(imsi),
            source_port: 49153,
            destination_port: port,
            protocol: 17,
            tx_packets: 1000,
            rx_packets: 990,
            tx_bytes: 1_400_000,
            rx_bytes: 1_386_000,
            delay_sum: 5.0,
            jitter_sum: 0.5,
            time_first_tx: 5.0,
            time_last_rx: 15.0,
        }
    }

    /// Two cells, terminals 1 and 2 on cell 0, terminal 3 on cell 1
    fn fixture() -> (Config, Aggregator, AddressTable) {
        let mut config = Config::default();
        config.scenario.num_cells = 2;
        config.scenario.num_ues = 3;

        let mut aggregator = Aggregator::new();
        let bindings: Vec<TerminalBinding> = (1..=3)
            .map(|imsi| TerminalBinding { imsi, address: address(imsi) })
            .collect();
        aggregator.record_attachment(1, 0, 20.0);
        aggregator.record_attachment(2, 0, 35.0);
        aggregator.record_attachment(3, 1, 50.0);
        for imsi in 1..=3 {
            aggregator.on_channel_sample(imsi, 100.0);
        }
        (config, aggregator, AddressTable::from_bindings(&bindings))
    }

    #[test]
    fn test_flows_joined_to_terminals_and_cells() {
        let (config, aggregator, addresses) = fixture();
        let flows = vec![flow(3, 3, 7001), flow(1, 1, 7000), flow(2, 2, 7000)];

        let reports = build_reports(&config, &aggregator, &flows, &addresses);
        let ids: Vec<u32> = reports.flows.iter().map(|f| f.flow_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let urllc = &reports.flows[2];
        assert_eq!(urllc.class, TrafficClass::Urllc);
        assert_eq!(urllc.imsi, 3);
        assert_eq!(urllc.serving_cell, 1);
        assert_eq!(urllc.distance, 50.0);
        assert_eq!(urllc.avg_sinr_db, 20.0);

        assert_eq!(reports.cells.len(), 2);
        assert_eq!(reports.cells[0].terminals, 2);
        assert_eq!(reports.cells[0].flows, 2);
        assert_eq!(reports.cells[0].tx_packets, 2000);
        assert_eq!(reports.cells[0].lost_packets, 20);
        assert_eq!(reports.cells[1].flows, 1);
        assert_eq!(reports.system.scored_flows, 3);
        assert_eq!(reports.system.skipped_flows, 0);
    }

    #[test]
    fn test_unknown_port_and_address_skipped() {
        let (config, aggregator, addresses) = fixture();
        let flows = vec![flow(1, 1, 7000), flow(2, 2, 9999), flow(3, 42, 7000)];

        let reports = build_reports(&config, &aggregator, &flows, &addresses);
        assert_eq!(reports.flows.len(), 1);
        assert_eq!(reports.system.skipped_flows, 2);
        assert_eq!(reports.cells[0].flows, 1);
    }

    #[test]
    fn test_load_balance_relative_to_busiest_cell() {
        let (config, aggregator, addresses) = fixture();
        let flows = vec![flow(1, 1, 7000), flow(2, 2, 7000), flow(3, 3, 7000)];

        let reports = build_reports(&config, &aggregator, &flows, &addresses);
        assert!((reports.cells[0].load_balance_pct - 100.0).abs() < 1e-9);
        assert!((reports.cells[1].load_balance_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_snapshot_yields_zeroed_reports() {
        let (config, aggregator, addresses) = fixture();
        let reports = build_reports(&config, &aggregator, &[], &addresses);

        assert!(reports.flows.is_empty());
        assert_eq!(reports.cells.len(), 2);
        for cell in &reports.cells {
            assert_eq!(cell.total_throughput_mbps, 0.0);
            assert_eq!(cell.load_balance_pct, 0.0);
            assert_eq!(cell.qoe_score, 0.0);
        }
        assert_eq!(reports.system.total_throughput_mbps, 0.0);
        assert_eq!(reports.system.avg_embb_delay_ms, 0.0);
        assert_eq!(reports.system.handover_success_rate_pct, 0.0);
    }

    #[test]
    fn test_system_metrics() {
        let (mut config, mut aggregator, addresses) = fixture();
        config.scenario.isd = 1000.0;
        for _ in 0..4 {
            aggregator.on_handover_start(1, 1, 2);
        }
        aggregator.on_handover_success(1, 1, 2);
        let flows = vec![flow(1, 1, 7000), flow(2, 2, 7001), flow(3, 3, 7001)];

        let system = build_reports(&config, &aggregator, &flows, &addresses).system;
        assert!((system.total_throughput_mbps - 3.0 * 1.1088).abs() < 1e-9);
        assert!((system.avg_throughput_per_cell_mbps - 1.5 * 1.1088).abs() < 1e-9);
        assert!((system.avg_throughput_per_ue_mbps - 1.1088).abs() < 1e-9);
        assert!((system.avg_urllc_delay_ms - 5.050505).abs() < 1e-5);
        assert_eq!(system.handover_attempts, 4);
        assert_eq!(system.handover_success_rate_pct, 25.0);

        // 3 UEs over two 1.2 km radius discs
        let expected_density = 3.0 / (2.0 * PI * 1.44);
        assert!((system.ue_density_per_km2 - expected_density).abs() < 1e-9);
        assert_eq!(system.scenario.scenario_type, "sparse");
        assert_eq!(system.scenario.propagation_model, "RMa");
    }
}
