//! Cell site layout.
//!
//! Produces fixed site coordinates for the supported topologies:
//!
//! - **1 site**: a single site at the origin
//! - **3 sites**: equilateral triangle, one vertex due north
//! - **5 sites**: origin plus a "plus" of four sites on the axes
//! - **7 sites**: origin plus a hexagon
//! - **9 sites**: origin plus an eight-point ring
//!
//! The inter-site distance is compressed for dense-urban scenarios and
//! stretched for sparse-suburban ones before the pattern is laid out.
//! Any other site count falls back to the nine-site pattern.

use std::f64::consts::PI;

use log::{debug, warn};

use super::types::{CellSite, DensityClass, Vec3};

/// Site counts with a dedicated layout pattern
pub const SUPPORTED_SITE_COUNTS: [u32; 5] = [1, 3, 5, 7, 9];

const DENSE_ISD_FACTOR: f64 = 0.7;
const SPARSE_ISD_FACTOR: f64 = 1.3;

const TRIANGLE_RADIUS_FACTOR: f64 = 0.577;
const PLUS_OFFSET_FACTOR: f64 = 0.7;
const HEXAGON_RADIUS_FACTOR: f64 = 0.6;
const RING_RADIUS_FACTOR: f64 = 0.65;

/// Sites per ring in the fallback pattern
const RING_SITES: u32 = 8;

/// Returns true if `count` has a dedicated layout pattern
pub fn is_supported_site_count(count: u32) -> bool {
    SUPPORTED_SITE_COUNTS.contains(&count)
}

/// Inter-site distance after the density adjustment
pub fn effective_isd(isd: f64, density: DensityClass) -> f64 {
    match density {
        DensityClass::DenseUrban => isd * DENSE_ISD_FACTOR,
        DensityClass::SparseSuburban => isd * SPARSE_ISD_FACTOR,
    }
}

/// Lays out `count` cell sites at height `height`.
///
/// # Arguments
///
/// * `count` - Number of sites; 1, 3, 5, 7 and 9 have dedicated patterns
/// * `isd` - Nominal inter-site distance in metres
/// * `height` - Antenna height of every site
/// * `density` - Deployment density class
///
/// # Returns
///
/// * One site per requested count, ordered by site index
pub fn create_cell_layout(count: u32, isd: f64, height: f64, density: DensityClass) -> Vec<CellSite> {
    let eff = effective_isd(isd, density);

    let positions: Vec<(f64, f64)> = match count {
        1 => vec![(0.0, 0.0)],
        3 => {
            let r = eff * TRIANGLE_RADIUS_FACTOR;
            vec![
                (0.0, r),
                (-r * 0.866, -r * 0.5),
                (r * 0.866, -r * 0.5),
            ]
        }
        5 => {
            let offset = eff * PLUS_OFFSET_FACTOR;
            vec![
                (0.0, 0.0),
                (offset, 0.0),
                (-offset, 0.0),
                (0.0, offset),
                (0.0, -offset),
            ]
        }
        7 => {
            let r = eff * HEXAGON_RADIUS_FACTOR;
            let mut points = vec![(0.0, 0.0)];
            points.extend(ring(r, 6));
            points
        }
        9 => ring_pattern(9, eff),
        other => {
            warn!(
                "Unsupported site count {} (supported: {:?}), falling back to the ring pattern",
                other, SUPPORTED_SITE_COUNTS
            );
            ring_pattern(other, eff)
        }
    };

    let sites: Vec<CellSite> = positions
        .into_iter()
        .enumerate()
        .map(|(i, (x, y))| CellSite {
            id: i as u32,
            position: Vec3::new(x, y, height),
        })
        .collect();

    debug!("Laid out {} sites (effective ISD {:.1} m)", sites.len(), eff);
    sites
}

/// Centre site plus eight-point rings.
///
/// Counts below nine truncate the first ring. Counts above nine add
/// further rings at integer multiples of the first ring's radius so that
/// no two sites coincide.
fn ring_pattern(count: u32, eff: f64) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(count as usize);
    if count == 0 {
        return points;
    }
    points.push((0.0, 0.0));

    let mut ring_index = 1;
    while (points.len() as u32) < count {
        let r = eff * RING_RADIUS_FACTOR * ring_index as f64;
        for point in ring(r, RING_SITES) {
            if points.len() as u32 == count {
                break;
            }
            points.push(point);
        }
        ring_index += 1;
    }
    points
}

/// `n` points evenly spaced on a circle of radius `r`, starting due east
fn ring(r: f64, n: u32) -> impl Iterator<Item = (f64, f64)> {
    (0..n).map(move |i| {
        let angle = i as f64 * 2.0 * PI / n as f64;
        (r * angle.cos(), r * angle.sin())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min_pairwise_distance(sites: &[CellSite]) -> f64 {
        let mut min = f64::MAX;
        for (i, a) in sites.iter().enumerate() {
            for b in &sites[i + 1..] {
                min = min.min(a.position.distance_to(&b.position));
            }
        }
        min
    }

    #[test]
    fn test_supported_counts_produce_distinct_sites() {
        for density in [DensityClass::DenseUrban, DensityClass::SparseSuburban] {
            for count in SUPPORTED_SITE_COUNTS {
                let sites = create_cell_layout(count, 200.0, 25.0, density);
                assert_eq!(sites.len(), count as usize);
                if count > 1 {
                    assert!(min_pairwise_distance(&sites) > 1.0, "coincident sites for count {}", count);
                }
                for (i, site) in sites.iter().enumerate() {
                    assert_eq!(site.id, i as u32);
                    assert_eq!(site.height(), 25.0);
                }
            }
        }
    }

    #[test]
    fn test_min_distance_scales_with_isd() {
        for count in [3, 5, 7, 9] {
            let mut previous = 0.0;
            for isd in [100.0, 200.0, 400.0, 800.0] {
                let sites = create_cell_layout(count, isd, 25.0, DensityClass::SparseSuburban);
                let d = min_pairwise_distance(&sites);
                assert!(d > previous, "count {} isd {}: {} <= {}", count, isd, d, previous);
                previous = d;
            }
        }
    }

    #[test]
    fn test_single_site_at_origin() {
        let sites = create_cell_layout(1, 500.0, 30.0, DensityClass::DenseUrban);
        assert_eq!(sites[0].position, Vec3::new(0.0, 0.0, 30.0));
    }

    #[test]
    fn test_triangle_first_vertex_due_north() {
        let sites = create_cell_layout(3, 200.0, 25.0, DensityClass::DenseUrban);
        let r = 200.0 * 0.7 * 0.577;
        assert!(sites[0].position.x.abs() < 1e-9);
        assert!((sites[0].position.y - r).abs() < 1e-9);
        assert!((sites[1].position.x + r * 0.866).abs() < 1e-9);
        assert!((sites[2].position.y + r * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_plus_pattern_on_axes() {
        let sites = create_cell_layout(5, 100.0, 25.0, DensityClass::SparseSuburban);
        let offset = 100.0 * 1.3 * 0.7;
        assert_eq!(sites[0].position.x, 0.0);
        assert!((sites[1].position.x - offset).abs() < 1e-9);
        assert!((sites[2].position.x + offset).abs() < 1e-9);
        assert!((sites[3].position.y - offset).abs() < 1e-9);
        assert!((sites[4].position.y + offset).abs() < 1e-9);
    }

    #[test]
    fn test_unsupported_count_falls_back_to_ring_pattern() {
        let nine = create_cell_layout(9, 200.0, 25.0, DensityClass::SparseSuburban);

        let four = create_cell_layout(4, 200.0, 25.0, DensityClass::SparseSuburban);
        assert_eq!(four.len(), 4);
        assert_eq!(four[..], nine[..4]);

        let twelve = create_cell_layout(12, 200.0, 25.0, DensityClass::SparseSuburban);
        assert_eq!(twelve.len(), 12);
        assert_eq!(twelve[..9], nine[..]);
        assert!(min_pairwise_distance(&twelve) > 1.0);

        assert!(create_cell_layout(0, 200.0, 25.0, DensityClass::SparseSuburban).is_empty());
    }
}
