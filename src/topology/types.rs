//! Geometry and classification types shared by the layout, distribution
//! and attachment stages.

use serde::{Deserialize, Serialize};

/// A point in the deployment area, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Vec3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// A cell site produced by the layout stage. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSite {
    /// Index of the site, also used as the cell identity in reports
    pub id: u32,
    pub position: Vec3,
}

impl CellSite {
    pub fn height(&self) -> f64 {
        self.position.z
    }
}

/// Deployment density class of the scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DensityClass {
    /// Compressed inter-site distance, users concentrated near sites
    DenseUrban,
    /// Stretched inter-site distance, users spread uniformly
    SparseSuburban,
}

impl DensityClass {
    pub fn from_dense_flag(dense: bool) -> Self {
        if dense {
            Self::DenseUrban
        } else {
            Self::SparseSuburban
        }
    }

    pub fn is_dense(&self) -> bool {
        matches!(self, Self::DenseUrban)
    }

    /// Short label used in the system report
    pub fn label(&self) -> &'static str {
        match self {
            Self::DenseUrban => "dense",
            Self::SparseSuburban => "sparse",
        }
    }

    /// Long label used in the scenario echo
    pub fn description(&self) -> &'static str {
        match self {
            Self::DenseUrban => "Dense urban",
            Self::SparseSuburban => "Sparse suburban",
        }
    }

    /// 3GPP propagation scenario the engine is expected to use
    pub fn propagation_model(&self) -> &'static str {
        match self {
            Self::DenseUrban => "UMa",
            Self::SparseSuburban => "RMa",
        }
    }
}

/// Traffic class of a terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrafficClass {
    /// Latency-tolerant, high-throughput traffic (eMBB)
    Embb,
    /// Latency-critical, low-throughput traffic (URLLC)
    Urllc,
}

impl std::fmt::Display for TrafficClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrafficClass::Embb => write!(f, "eMBB"),
            TrafficClass::Urllc => write!(f, "URLLC"),
        }
    }
}

/// A terminal placed by the distribution stage, before the engine has
/// assigned it an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedTerminal {
    pub index: usize,
    pub position: Vec3,
    pub class: TrafficClass,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_euclidean_in_three_dimensions() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 12.0);
        assert!((a.distance_to(&b) - 13.0).abs() < 1e-12);
        assert_eq!(a.distance_to(&b), b.distance_to(&a));
    }

    #[test]
    fn test_density_labels() {
        assert_eq!(DensityClass::from_dense_flag(true), DensityClass::DenseUrban);
        assert_eq!(DensityClass::from_dense_flag(false).label(), "sparse");
        assert_eq!(DensityClass::DenseUrban.propagation_model(), "UMa");
    }

    #[test]
    fn test_traffic_class_display() {
        assert_eq!(TrafficClass::Embb.to_string(), "eMBB");
        assert_eq!(TrafficClass::Urllc.to_string(), "URLLC");
    }
}
