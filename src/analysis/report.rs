//! Report rendering and output.
//!
//! Generates the three CSV reports, the scenario echo, a JSON summary and
//! the console summary printed after a run.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use serde::Serialize;

use super::types::*;
use crate::config::Config;
use crate::telemetry::Imsi;
use crate::utils::fixed;

const FLOW_HEADER: &str = "FlowId,TrafficType,UeImsi,ServingCell,Distance(m),DstAddr,\
AvgSinr(dB),MinSinr(dB),MaxSinr(dB),SinrStdDev(dB),\
TxPackets,RxPackets,LostPackets,PacketLossRatio(%),\
Throughput(Mbps),MeanDelay(ms),MeanJitter(ms),\
QoEScore,ReliabilityScore,Numerology";

const CELL_HEADER: &str = "CellId,NumUEs,TotalThroughput(Mbps),SpectralEfficiency(bps/Hz),\
TxPackets,RxPackets,LostPackets,PacketLossRatio(%),\
AvgSINR(dB),AvgDelay(ms),AvgJitter(ms),\
CellQoEScore,CellReliability(%),LoadBalance(%)";

const SYSTEM_HEADER: &str = "Metric,Value,Unit";

/// Paths of the files written for one run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPaths {
    pub flows: PathBuf,
    pub cells: PathBuf,
    pub system: PathBuf,
    pub scenario: PathBuf,
    pub summary: PathBuf,
}

impl ReportPaths {
    pub fn new(output_dir: &Path, num_cells: u32) -> Self {
        Self {
            flows: output_dir.join(format!("flow_stats_{}cell.csv", num_cells)),
            cells: output_dir.join(format!("cell_stats_{}cell.csv", num_cells)),
            system: output_dir.join(format!("system_stats_{}cell.csv", num_cells)),
            scenario: output_dir.join(format!("simulation_config_{}cell.txt", num_cells)),
            summary: output_dir.join("analysis_summary.json"),
        }
    }
}

pub fn render_flow_csv(flows: &[FlowReport]) -> String {
    let mut out = String::new();
    out.push_str(FLOW_HEADER);
    out.push('\n');
    for flow in flows {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            flow.flow_id,
            flow.class,
            flow.imsi,
            flow.serving_cell,
            fixed(flow.distance, 2),
            flow.destination,
            fixed(flow.avg_sinr_db, 2),
            fixed(flow.min_sinr_db, 2),
            fixed(flow.max_sinr_db, 2),
            fixed(flow.sinr_std_dev_db, 2),
            flow.tx_packets,
            flow.rx_packets,
            flow.lost_packets,
            fixed(flow.loss_ratio_pct, 4),
            fixed(flow.throughput_mbps, 3),
            fixed(flow.mean_delay_ms, 3),
            fixed(flow.mean_jitter_ms, 3),
            fixed(flow.qoe_score, 1),
            fixed(flow.reliability_score, 1),
            flow.numerology,
        );
    }
    out
}

pub fn render_cell_csv(cells: &[CellReport]) -> String {
    let mut out = String::new();
    out.push_str(CELL_HEADER);
    out.push('\n');
    for cell in cells {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            cell.cell_id,
            cell.terminals,
            fixed(cell.total_throughput_mbps, 3),
            fixed(cell.spectral_efficiency, 2),
            cell.tx_packets,
            cell.rx_packets,
            cell.lost_packets,
            fixed(cell.loss_ratio_pct, 4),
            fixed(cell.avg_sinr_db, 2),
            fixed(cell.avg_delay_ms, 3),
            fixed(cell.avg_jitter_ms, 3),
            fixed(cell.qoe_score, 1),
            fixed(cell.reliability_score, 1),
            fixed(cell.load_balance_pct, 1),
        );
    }
    out
}

/// Subcarrier spacing in kHz for a numerology index
fn subcarrier_spacing_khz(numerology: u8) -> u32 {
    15u32 << numerology.min(6)
}

pub fn render_system_csv(system: &SystemReport) -> String {
    let scenario = &system.scenario;
    let rows: Vec<(&str, String, String)> = vec![
        ("TotalSystemThroughput", fixed(system.total_throughput_mbps, 3), "Mbps".into()),
        ("AvgThroughputPerCell", fixed(system.avg_throughput_per_cell_mbps, 3), "Mbps".into()),
        ("AvgThroughputPerUE", fixed(system.avg_throughput_per_ue_mbps, 3), "Mbps".into()),
        ("AvgURLLCDelay", fixed(system.avg_urllc_delay_ms, 3), "ms".into()),
        ("AvgEmbbDelay", fixed(system.avg_embb_delay_ms, 3), "ms".into()),
        ("HandoverAttempts", system.handover_attempts.to_string(), "count".into()),
        ("HandoverSuccess", system.handover_successes.to_string(), "count".into()),
        ("HandoverFailures", system.handover_failures.to_string(), "count".into()),
        ("HandoverSuccessRate", fixed(system.handover_success_rate_pct, 2), "%".into()),
        ("SystemSpectralEfficiency", fixed(system.spectral_efficiency, 3), "bps/Hz/cell".into()),
        ("UserDensity", fixed(system.ue_density_per_km2, 1), "UE/km2".into()),
        ("ScenarioType", scenario.scenario_type.clone(), "type".into()),
        ("NumCells", scenario.num_cells.to_string(), "count".into()),
        ("NumUEs", scenario.num_ues.to_string(), "count".into()),
        ("EmbbRatio", fixed(scenario.embb_ratio, 2), "ratio".into()),
        ("InterSiteDistance", fixed(scenario.isd, 1), "m".into()),
        ("SimulationTime", fixed(scenario.sim_time_s, 1), "s".into()),
        ("AppStartTime", fixed(scenario.app_start_time_s, 1), "s".into()),
        ("RngSeed", scenario.seed.to_string(), "seed".into()),
        (
            "Numerology",
            scenario.numerology.to_string(),
            format!("{}kHz_SCS", subcarrier_spacing_khz(scenario.numerology)),
        ),
        ("UeTxPower", fixed(scenario.ue_tx_power_dbm, 1), "dBm".into()),
        ("PropagationModel", scenario.propagation_model.clone(), "type".into()),
    ];

    let mut out = String::new();
    out.push_str(SYSTEM_HEADER);
    out.push('\n');
    for (metric, value, unit) in rows {
        let _ = writeln!(out, "{},{},{}", metric, value, unit);
    }
    out
}

/// Human-readable echo of the scenario configuration
pub fn render_scenario_echo(config: &Config) -> String {
    let scenario = &config.scenario;
    let radio = &config.radio;
    let mut lines: Vec<String> = Vec::new();

    lines.push("=".repeat(60));
    lines.push("                 CELLSIM SCENARIO CONFIGURATION".to_string());
    lines.push("=".repeat(60));
    lines.push(String::new());
    lines.push(format!("Cells: {}", scenario.num_cells));
    lines.push(format!("Terminals: {}", scenario.num_ues));
    lines.push(format!("eMBB ratio: {}", fixed(scenario.embb_ratio, 2)));
    lines.push(format!("URLLC ratio: {}", fixed(1.0 - scenario.embb_ratio, 2)));
    lines.push(format!("Scenario: {}", config.density().description()));
    lines.push(format!("Inter-site distance: {} m", fixed(scenario.isd, 1)));
    lines.push(format!("gNB height: {} m", fixed(radio.gnb_height, 1)));
    lines.push(format!("UE height: {} m", fixed(radio.ue_height, 1)));
    lines.push(format!("gNB Tx power: {} dBm", fixed(radio.gnb_tx_power_dbm, 1)));
    lines.push(format!("UE Tx power: {} dBm", fixed(radio.ue_tx_power_dbm, 1)));
    lines.push(format!(
        "Numerology: {} ({} kHz SCS)",
        radio.numerology,
        subcarrier_spacing_khz(radio.numerology)
    ));
    lines.push(format!("Frequency: {} GHz", fixed(radio.frequency_hz / 1e9, 2)));
    lines.push(format!("Bandwidth: {} MHz", fixed(radio.bandwidth_hz / 1e6, 1)));
    lines.push(format!("Propagation model: {}", config.density().propagation_model()));
    lines.push(format!("Scheduler: {}", radio.scheduler));
    lines.push(format!("Handover algorithm: {}", radio.handover_algorithm));
    lines.push(format!(
        "Simulation time: {} s",
        fixed(config.general.sim_time.as_secs_f64(), 1)
    ));
    lines.push(format!(
        "Application start: {} s",
        fixed(config.general.app_start_time.as_secs_f64(), 1)
    ));
    lines.push(format!("Ports: eMBB {}, URLLC {}", config.traffic.embb_port, config.traffic.urllc_port));
    lines.push(format!("RNG seed: {}", config.general.seed));
    lines.push(String::new());

    lines.join("\n")
}

/// Mean received power and quality of one terminal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerminalSignal {
    pub imsi: Imsi,
    pub avg_rsrp_dbm: f64,
    pub avg_rsrq_db: f64,
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    #[serde(flatten)]
    reports: &'a Reports,
    terminal_signal: Vec<TerminalSignal>,
}

/// Generate JSON report
pub fn generate_json_report(reports: &Reports, output_path: &Path) -> Result<()> {
    let mut terminal_signal: Vec<TerminalSignal> = reports
        .flows
        .iter()
        .map(|flow| TerminalSignal {
            imsi: flow.imsi,
            avg_rsrp_dbm: flow.avg_rsrp_dbm,
            avg_rsrq_db: flow.avg_rsrq_db,
        })
        .collect();
    terminal_signal.sort_by_key(|signal| signal.imsi);
    terminal_signal.dedup_by_key(|signal| signal.imsi);

    let summary = JsonSummary {
        reports,
        terminal_signal,
    };
    let json = serde_json::to_string_pretty(&summary)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

fn write_report(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    log::info!("Report written to {}", path.display());
    Ok(())
}

/// Write every report of a run into `output_dir`, one file at a time
pub fn write_reports(reports: &Reports, config: &Config, output_dir: &Path) -> Result<ReportPaths> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let paths = ReportPaths::new(output_dir, config.scenario.num_cells);
    write_report(&paths.flows, &render_flow_csv(&reports.flows))?;
    write_report(&paths.cells, &render_cell_csv(&reports.cells))?;
    write_report(&paths.system, &render_system_csv(&reports.system))?;
    write_report(&paths.scenario, &render_scenario_echo(config))?;
    generate_json_report(reports, &paths.summary)?;

    Ok(paths)
}

/// Print the end-of-run summary to stdout
pub fn print_summary(reports: &Reports, paths: &ReportPaths) {
    let system = &reports.system;
    let scenario = &system.scenario;

    println!();
    println!("{}", "=".repeat(60));
    println!("                 CELLSIM RUN COMPLETE");
    println!("{}", "=".repeat(60));
    println!("Scenario: {} cells, {}", scenario.num_cells, scenario.scenario_type);
    println!("Flows scored: {} ({} skipped)", system.scored_flows, system.skipped_flows);
    println!("Total throughput: {} Mbps", fixed(system.total_throughput_mbps, 2));
    println!("Mean throughput per UE: {} Mbps", fixed(system.avg_throughput_per_ue_mbps, 2));
    println!("Mean eMBB delay: {} ms", fixed(system.avg_embb_delay_ms, 3));
    println!("Mean URLLC delay: {} ms", fixed(system.avg_urllc_delay_ms, 3));
    println!("Spectral efficiency: {} bps/Hz/cell", fixed(system.spectral_efficiency, 3));
    println!("Handover success rate: {}%", fixed(system.handover_success_rate_pct, 1));
    println!();
    println!("Generated files:");
    for path in [&paths.flows, &paths.cells, &paths.system, &paths.scenario, &paths.summary] {
        println!("  {}", path.display());
    }
    println!("{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::build_reports;
    use crate::engine::AddressTable;
    use crate::telemetry::Aggregator;
    use crate::topology::TrafficClass;
    use std::net::Ipv4Addr;
    use tempfile::TempDir;

    fn sample_flow() -> FlowReport {
        FlowReport {
            flow_id: 4,
            class: TrafficClass::Embb,
            imsi: 12,
            serving_cell: 1,
            distance: 87.456,
            destination: Ipv4Addr::new(7, 0, 0, 13),
            avg_sinr_db: 18.0,
            min_sinr_db: 4.5,
            max_sinr_db: 27.25,
            sinr_std_dev_db: 3.14159,
            avg_rsrp_dbm: -85.0,
            avg_rsrq_db: -10.5,
            tx_packets: 1000,
            rx_packets: 990,
            lost_packets: 10,
            loss_ratio_pct: 1.0,
            throughput_mbps: 10.0,
            mean_delay_ms: 5.050505,
            mean_jitter_ms: 0.25,
            qoe_score: 40.0,
            reliability_score: 88.0,
            numerology: 2,
        }
    }

    fn sample_reports() -> Reports {
        let config = Config::default();
        let aggregator = Aggregator::new();
        let mut reports = build_reports(&config, &aggregator, &[], &AddressTable::default());
        reports.flows.push(sample_flow());
        reports
    }

    #[test]
    fn test_flow_csv_row() {
        let csv = render_flow_csv(&[sample_flow()]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(FLOW_HEADER));
        assert_eq!(
            lines.next(),
            Some("4,eMBB,12,1,87.46,7.0.0.13,18.00,4.50,27.25,3.14,1000,990,10,1.0000,10.000,5.051,0.250,40.0,88.0,2")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_header_column_counts_match_rows() {
        let reports = sample_reports();
        let flows = render_flow_csv(&reports.flows);
        let cells = render_cell_csv(&reports.cells);
        let system = render_system_csv(&reports.system);

        for csv in [&flows, &cells, &system] {
            let mut lines = csv.lines();
            let columns = lines.next().map(|h| h.split(',').count()).unwrap_or(0);
            for line in lines {
                assert_eq!(line.split(',').count(), columns, "{}", line);
            }
        }
    }

    #[test]
    fn test_system_csv_echoes_scenario() {
        let csv = render_system_csv(&sample_reports().system);
        assert!(csv.starts_with("Metric,Value,Unit\n"));
        assert!(csv.contains("ScenarioType,sparse,type\n"));
        assert!(csv.contains("InterSiteDistance,200.0,m\n"));
        assert!(csv.contains("Numerology,2,60kHz_SCS\n"));
        assert!(csv.contains("PropagationModel,RMa,type\n"));
        assert!(csv.contains("HandoverSuccessRate,0.00,%\n"));
    }

    #[test]
    fn test_write_reports() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let reports = sample_reports();

        let paths = write_reports(&reports, &config, dir.path()).unwrap();
        assert!(paths.flows.ends_with("flow_stats_1cell.csv"));
        assert!(paths.scenario.ends_with("simulation_config_1cell.txt"));

        let echo = fs::read_to_string(&paths.scenario).unwrap();
        assert!(echo.contains("Scenario: Sparse suburban"));
        assert!(echo.contains("RNG seed: 1"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths.summary).unwrap()).unwrap();
        assert_eq!(json["flows"][0]["flow_id"], 4);
        assert_eq!(json["terminal_signal"][0]["avg_rsrp_dbm"], -85.0);
        assert_eq!(json["system"]["scenario"]["num_cells"], 1);
    }
}
