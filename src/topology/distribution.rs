//! Terminal distribution around cell sites.
//!
//! This module places terminals around the sites produced by the layout
//! stage. The placement strategy depends on the deployment density:
//!
//! - **Dense urban**: radii drawn from an exponential distribution, so
//!   terminals cluster near the site; the first and middle cells are
//!   hotspots that receive 1.5x their fair share
//! - **Sparse suburban**: radii drawn uniformly across the coverage ring
//!
//! Every terminal receives exactly one position. Terminals left over after
//! the per-cell pass (because hotspot allocations used up the supply early)
//! are spread uniformly over the whole deployment area.

use std::f64::consts::PI;

use log::{debug, info};
use rand::Rng;
use rand_distr::Exp1;

use super::types::{CellSite, DensityClass, Vec3};

const HOTSPOT_MULTIPLIER: f64 = 1.5;
const DENSE_MIN_RADIUS: f64 = 10.0;
const SPARSE_MIN_RADIUS: f64 = 50.0;
const DENSE_MAX_RADIUS_FACTOR: f64 = 0.4;
const SPARSE_MAX_RADIUS_FACTOR: f64 = 0.8;
const DENSE_SPREAD_FACTOR: f64 = 0.3;
const FALLBACK_AREA_FACTOR: f64 = 1.5;

/// Result of distributing terminals across cells
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalPlacement {
    /// One position per terminal, in terminal index order
    pub positions: Vec<Vec3>,
    /// Terminals actually placed around each cell, by cell index
    pub per_cell: Vec<usize>,
    /// Terminals placed uniformly over the area after the per-cell pass
    pub fallback: usize,
}

/// Number of terminals each cell is asked to host.
///
/// Terminals are split as evenly as possible with the remainder going to
/// the first cells. Dense scenarios scale the first and middle cell by
/// 1.5x, so the sum may exceed `terminal_count`.
pub fn cell_allocations(terminal_count: usize, cell_count: usize, density: DensityClass) -> Vec<usize> {
    if cell_count == 0 {
        return Vec::new();
    }
    let base = terminal_count / cell_count;
    let remainder = terminal_count % cell_count;

    (0..cell_count)
        .map(|i| {
            let share = base + usize::from(i < remainder);
            if density.is_dense() && (i == 0 || i == cell_count / 2) {
                (share as f64 * HOTSPOT_MULTIPLIER) as usize
            } else {
                share
            }
        })
        .collect()
}

/// Distributes terminals around the given cell sites.
///
/// # Arguments
///
/// * `terminal_count` - Number of terminals to place
/// * `sites` - Cell sites from the layout stage
/// * `density` - Deployment density class
/// * `isd` - Nominal inter-site distance (not density adjusted)
/// * `terminal_height` - Height assigned to every terminal
/// * `rng` - Random stream; identical streams yield identical placements
pub fn distribute_terminals<R: Rng + ?Sized>(
    terminal_count: usize,
    sites: &[CellSite],
    density: DensityClass,
    isd: f64,
    terminal_height: f64,
    rng: &mut R,
) -> TerminalPlacement {
    let allocations = cell_allocations(terminal_count, sites.len(), density);
    let (min_radius, max_radius) = match density {
        DensityClass::DenseUrban => (DENSE_MIN_RADIUS, isd * DENSE_MAX_RADIUS_FACTOR),
        DensityClass::SparseSuburban => (SPARSE_MIN_RADIUS, isd * SPARSE_MAX_RADIUS_FACTOR),
    };

    let mut positions = Vec::with_capacity(terminal_count);
    let mut per_cell = vec![0usize; sites.len()];

    for (cell_idx, site) in sites.iter().enumerate() {
        if positions.len() >= terminal_count {
            break;
        }
        for _ in 0..allocations[cell_idx] {
            if positions.len() >= terminal_count {
                break;
            }

            let radius = match density {
                DensityClass::DenseUrban => {
                    let spread: f64 = rng.sample(Exp1);
                    let r = min_radius + spread * (max_radius - min_radius) * DENSE_SPREAD_FACTOR;
                    r.min(max_radius)
                }
                DensityClass::SparseSuburban => {
                    if max_radius > min_radius {
                        rng.gen_range(min_radius..max_radius)
                    } else {
                        min_radius
                    }
                }
            };
            let angle = rng.gen_range(0.0..2.0 * PI);

            positions.push(Vec3::new(
                site.position.x + radius * angle.cos(),
                site.position.y + radius * angle.sin(),
                terminal_height,
            ));
            per_cell[cell_idx] += 1;
        }
        debug!("Cell {} -> {} terminals", site.id, per_cell[cell_idx]);
    }

    let area = isd * FALLBACK_AREA_FACTOR;
    let fallback = terminal_count - positions.len();
    if fallback > 0 {
        info!(
            "Placing {} terminals uniformly over +/-{:.1} m (not reached by per-cell allocation)",
            fallback, area
        );
    }
    while positions.len() < terminal_count {
        let (x, y) = if area > 0.0 {
            (rng.gen_range(-area..area), rng.gen_range(-area..area))
        } else {
            (0.0, 0.0)
        };
        positions.push(Vec3::new(x, y, terminal_height));
    }

    TerminalPlacement {
        positions,
        per_cell,
        fallback,
    }
}
