//! Traffic class assignment and nearest-cell attachment.

use super::types::{CellSite, PlacedTerminal, TrafficClass, Vec3};

/// Serving cell of a terminal and its distance to that cell's site
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attachment {
    pub cell_id: u32,
    pub distance: f64,
}

/// Number of eMBB terminals for a given ratio (rounded down)
pub fn embb_count(terminal_count: usize, embb_ratio: f64) -> usize {
    let count = (embb_ratio.clamp(0.0, 1.0) * terminal_count as f64) as usize;
    count.min(terminal_count)
}

/// Tags terminals with a traffic class: the first `embb_count` terminals
/// carry eMBB traffic, the rest URLLC.
pub fn classify_terminals(positions: &[Vec3], embb_ratio: f64) -> Vec<PlacedTerminal> {
    let embb = embb_count(positions.len(), embb_ratio);
    positions
        .iter()
        .enumerate()
        .map(|(index, position)| PlacedTerminal {
            index,
            position: *position,
            class: if index < embb {
                TrafficClass::Embb
            } else {
                TrafficClass::Urllc
            },
        })
        .collect()
}

/// Finds the closest site to `position`. Ties go to the lower site index.
///
/// Returns `None` only when there are no sites.
pub fn nearest_cell(position: &Vec3, sites: &[CellSite]) -> Option<Attachment> {
    let mut best: Option<Attachment> = None;
    for site in sites {
        let distance = position.distance_to(&site.position);
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(Attachment {
                cell_id: site.id,
                distance,
            });
        }
    }
    best
}
