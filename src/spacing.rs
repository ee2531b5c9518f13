//! Center-to-center spacing of detected grid lines.

use crate::cluster::ClusterSet;

/// Average distance between neighbouring grid lines on each axis.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spacing {
    /// Mean horizontal distance between column centers.
    pub column: f64,
    /// Mean vertical distance between row centers.
    pub row: f64,
}

/// Estimate column and row spacing from ordered cluster centers.
///
/// Both values are non-negative for well-formed cluster sets (columns left
/// to right, rows top to bottom). An axis with fewer than two clusters has
/// zero spacing.
pub fn estimate_spacing(columns: &ClusterSet, rows: &ClusterSet) -> Spacing {
    Spacing {
        column: columns.mean_step(),
        row: rows.mean_step(),
    }
}
