//! Scenario consistency checks.
//!
//! These checks never reject a configuration (that is `Config::validate`'s
//! job). They flag combinations that are legal but will behave in a way a
//! user may not expect, and log each finding.

use crate::config::Config;
use crate::topology::attachment::embb_count;
use crate::topology::distribution::cell_allocations;
use crate::topology::is_supported_site_count;

/// Minimum coverage radius of a sparse suburban cell
const SPARSE_MIN_RADIUS: f64 = 50.0;

/// Check a validated configuration for surprising scenario shapes.
///
/// Flags:
/// - Site counts without a dedicated layout (ring fallback is used)
/// - Sparse inter-site distances too small for the coverage ring
/// - Dense hotspots that leave later cells without terminals
/// - Ratios that leave one traffic class empty
///
/// # Returns
/// * One message per finding, each already logged at warn level
pub fn validate_scenario_shape(config: &Config) -> Vec<String> {
    let mut findings = Vec::new();
    let scenario = &config.scenario;

    if !is_supported_site_count(scenario.num_cells) {
        findings.push(format!(
            "num_cells {} has no dedicated layout; the ring pattern will be used",
            scenario.num_cells
        ));
    }

    if !scenario.dense && scenario.isd * 0.8 <= SPARSE_MIN_RADIUS {
        findings.push(format!(
            "isd {} m is too small for sparse placement; every terminal will sit {} m from its site",
            scenario.isd, SPARSE_MIN_RADIUS
        ));
    }

    if scenario.dense {
        let allocations = cell_allocations(
            scenario.num_ues as usize,
            scenario.num_cells as usize,
            config.density(),
        );
        let mut remaining = scenario.num_ues as usize;
        let starved = allocations
            .iter()
            .filter(|&&alloc| {
                let starved = remaining == 0 && alloc > 0;
                remaining = remaining.saturating_sub(alloc);
                starved
            })
            .count();
        if starved > 0 {
            findings.push(format!(
                "dense hotspots exhaust the terminal supply; {} cell(s) will start with no nearby terminals",
                starved
            ));
        }
    }

    let embb = embb_count(scenario.num_ues as usize, scenario.embb_ratio);
    if embb == 0 {
        findings.push("embb_ratio yields no eMBB terminals".to_string());
    } else if embb == scenario.num_ues as usize {
        findings.push("embb_ratio yields no URLLC terminals".to_string());
    }

    for finding in &findings {
        log::warn!("{}", finding);
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_scenario_has_no_findings() {
        assert!(validate_scenario_shape(&Config::default()).is_empty());
    }

    #[test]
    fn test_unsupported_cell_count_flagged() {
        let mut config = Config::default();
        config.scenario.num_cells = 4;
        let findings = validate_scenario_shape(&config);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("num_cells 4"));
    }

    #[test]
    fn test_small_sparse_isd_flagged() {
        let mut config = Config::default();
        config.scenario.isd = 60.0;
        let findings = validate_scenario_shape(&config);
        assert!(findings.iter().any(|f| f.contains("too small")));
    }

    #[test]
    fn test_starved_dense_cells_flagged() {
        let mut config = Config::default();
        config.scenario.dense = true;
        config.scenario.num_cells = 3;
        config.scenario.num_ues = 30;
        let findings = validate_scenario_shape(&config);
        assert!(findings.iter().any(|f| f.contains("1 cell(s)")), "{:?}", findings);
    }

    #[test]
    fn test_single_class_flagged() {
        let mut config = Config::default();
        config.scenario.embb_ratio = 1.0;
        let findings = validate_scenario_shape(&config);
        assert_eq!(findings, vec!["embb_ratio yields no URLLC terminals".to_string()]);
    }
}
