//! Grid inference: cluster item centers into columns and rows.
//!
//! Centers are sorted along each axis and walked once. A value further than
//! the tolerance from the last emitted cluster starts a new cluster;
//! anything closer is merged into it. Merging only ever looks at the
//! previous cluster, so the result is a best-effort heuristic: a scattered,
//! non-rectangular selection still yields some grid.
//!
//! # Example
//!
//! ```
//! use regrid::{Bounds, GeometryIndex, GridClusterer, ItemId};
//!
//! // 3 columns × 2 rows of 10×10 squares, 50pt apart.
//! let mut items = Vec::new();
//! for row in 0..2 {
//!     for col in 0..3 {
//!         let (x, y) = (col as f64 * 50.0, -(row as f64) * 50.0);
//!         items.push((ItemId(items.len() as u32), Bounds::new(x, y + 10.0, x + 10.0, y)));
//!     }
//! }
//!
//! let grid = GridClusterer::default()
//!     .cluster(&GeometryIndex::from_bounds(&items))
//!     .unwrap();
//!
//! assert_eq!((grid.spec.columns, grid.spec.rows), (3, 2));
//! assert_eq!(grid.spec.column_spacing, 50.0);
//! ```

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use log::{debug, trace, warn};
use num_traits::Float;

use crate::error::GridError;
use crate::geometry::{GeometryIndex, ItemInfo, Point};
use crate::spacing::{Spacing, estimate_spacing};
use crate::surface::ItemId;

/// Grid axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Columns: clusters of x centers, ordered left to right.
    Column,
    /// Rows: clusters of y centers, ordered top to bottom.
    Row,
}

impl Axis {
    /// The coordinate of `p` this axis clusters on.
    pub fn coordinate(self, p: Point) -> f64 {
        match self {
            Self::Column => p.x,
            Self::Row => p.y,
        }
    }

    /// `+1.0` when cluster order follows the document axis, `-1.0` when it
    /// runs against it (rows go down while y goes up).
    pub fn direction(self) -> f64 {
        match self {
            Self::Column => 1.0,
            Self::Row => -1.0,
        }
    }
}

/// How a value is folded into the cluster it falls into.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MergeStrategy {
    /// The cluster center becomes the average of itself and the new value.
    ///
    /// Later members weigh more than earlier ones. This reproduces the
    /// output of the established grid tools.
    #[default]
    PairwiseAverage,
    /// The cluster center is the running mean of every member.
    Centroid,
}

/// Ordered cluster centers along one axis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterSet {
    axis: Axis,
    centers: Vec<f64>,
}

impl ClusterSet {
    /// Wrap centers that are already in axis order.
    pub fn from_centers(axis: Axis, centers: &[f64]) -> Self {
        Self {
            axis,
            centers: centers.to_vec(),
        }
    }

    /// Sort `values` in axis order and merge neighbours within `tolerance`.
    pub fn build(axis: Axis, values: &[f64], tolerance: f64, strategy: MergeStrategy) -> Self {
        let mut sorted = values.to_vec();
        match axis {
            Axis::Column => sorted.sort_by(|a, b| a.total_cmp(b)),
            Axis::Row => sorted.sort_by(|a, b| b.total_cmp(a)),
        }

        let mut centers: Vec<f64> = Vec::new();
        let mut members: Vec<u32> = Vec::new();
        for v in sorted {
            match (centers.last_mut(), members.last_mut()) {
                (Some(center), Some(count)) if Float::abs(v - *center) <= tolerance => {
                    let before = *center;
                    *count += 1;
                    *center = match strategy {
                        MergeStrategy::PairwiseAverage => (*center + v) / 2.0,
                        MergeStrategy::Centroid => *center + (v - *center) / *count as f64,
                    };
                    trace!("{axis:?}: merged {v} into {before} -> {}", *center);
                }
                _ => {
                    centers.push(v);
                    members.push(1);
                }
            }
        }
        Self { axis, centers }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// First center in axis order (leftmost column, topmost row).
    pub fn first(&self) -> Option<f64> {
        self.centers.first().copied()
    }

    /// Index of the center closest to `value`; ties go to the lower index.
    pub fn nearest(&self, value: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &c) in self.centers.iter().enumerate() {
            let d = Float::abs(value - c);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Mean distance between consecutive centers, measured in axis order.
    pub fn mean_step(&self) -> f64 {
        if self.centers.len() < 2 {
            return 0.0;
        }
        let dir = self.axis.direction();
        let sum: f64 = self
            .centers
            .windows(2)
            .map(|w| dir * (w[1] - w[0]))
            .sum();
        sum / (self.centers.len() - 1) as f64
    }

    /// Position of the `index`-th evenly spaced line starting at the first
    /// center. `None` when the set is empty.
    pub fn line(&self, index: usize, spacing: f64) -> Option<f64> {
        self.first()
            .map(|first| first + self.axis.direction() * index as f64 * spacing)
    }
}

/// Row/column address of an item in a detected grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// 0 = topmost row.
    pub row: usize,
    /// 0 = leftmost column.
    pub column: usize,
}

/// Summary of a detected or requested grid.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSpec {
    pub columns: usize,
    pub rows: usize,
    /// Center-to-center distance between columns.
    pub column_spacing: f64,
    /// Center-to-center distance between rows.
    pub row_spacing: f64,
}

impl GridSpec {
    pub fn spacing(&self) -> Spacing {
        Spacing {
            column: self.column_spacing,
            row: self.row_spacing,
        }
    }
}

/// Result of clustering: grid summary, cluster centers and item addresses.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedGrid {
    pub spec: GridSpec,
    pub columns: ClusterSet,
    pub rows: ClusterSet,
    items: Vec<ItemInfo>,
    by_item: BTreeMap<ItemId, usize>,
}

impl DetectedGrid {
    /// Measured items with their assigned row and column.
    pub fn items(&self) -> &[ItemInfo] {
        &self.items
    }

    /// Address of `item`, if it took part in clustering.
    pub fn address(&self, item: ItemId) -> Option<CellAddress> {
        self.by_item.get(&item).map(|&i| {
            let info = &self.items[i];
            CellAddress {
                row: info.row,
                column: info.column,
            }
        })
    }

    /// Cluster centers for `axis`.
    pub fn clusters(&self, axis: Axis) -> &ClusterSet {
        match axis {
            Axis::Column => &self.columns,
            Axis::Row => &self.rows,
        }
    }

    /// Spacing along `axis`.
    pub fn spacing(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Column => self.spec.column_spacing,
            Axis::Row => self.spec.row_spacing,
        }
    }

    /// Items assigned to the `index`-th column or row, in input order.
    pub fn members(&self, axis: Axis, index: usize) -> impl Iterator<Item = ItemId> + '_ {
        self.items
            .iter()
            .filter(move |i| match axis {
                Axis::Column => i.column == index,
                Axis::Row => i.row == index,
            })
            .map(|i| i.item)
    }

    /// Whether every cell of the `columns × rows` grid holds exactly one item.
    pub fn is_complete(&self) -> bool {
        if self.items.len() != self.spec.columns * self.spec.rows {
            return false;
        }
        let mut seen = BTreeSet::new();
        self.items.iter().all(|i| seen.insert((i.row, i.column)))
    }
}

/// Clusters item centers into a grid.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridClusterer {
    /// Fraction of the mean item extent used as merge tolerance.
    pub tolerance_factor: f64,
    pub strategy: MergeStrategy,
}

impl Default for GridClusterer {
    fn default() -> Self {
        Self {
            tolerance_factor: 0.5,
            strategy: MergeStrategy::PairwiseAverage,
        }
    }
}

impl GridClusterer {
    /// Set the tolerance factor.
    pub fn tolerance_factor(mut self, factor: f64) -> Self {
        self.tolerance_factor = factor;
        self
    }

    /// Set the merge strategy.
    pub fn strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Detect columns and rows and assign every item an address.
    pub fn cluster(&self, index: &GeometryIndex) -> Result<DetectedGrid, GridError> {
        if index.len() < 2 {
            return Err(GridError::InsufficientInput { found: index.len() });
        }
        if !self.tolerance_factor.is_finite() || self.tolerance_factor < 0.0 {
            return Err(GridError::invalid(
                "tolerance_factor",
                "must be finite and non-negative",
            ));
        }

        let mean = index.mean_size();
        if mean.width <= 0.0 || mean.height <= 0.0 {
            warn!("degenerate item sizes (mean {mean:?}); clustering on exact centers");
        }

        let mut items = index.items().to_vec();
        let columns = self.axis_clusters(Axis::Column, &items, mean.width);
        let rows = self.axis_clusters(Axis::Row, &items, mean.height);

        for info in &mut items {
            info.column = columns.nearest(info.center.x).unwrap_or(0);
            info.row = rows.nearest(info.center.y).unwrap_or(0);
        }

        let spacing = estimate_spacing(&columns, &rows);
        let spec = GridSpec {
            columns: columns.len(),
            rows: rows.len(),
            column_spacing: spacing.column,
            row_spacing: spacing.row,
        };
        debug!(
            "detected {} columns × {} rows from {} items, spacing {:.3} × {:.3}",
            spec.columns,
            spec.rows,
            items.len(),
            spec.column_spacing,
            spec.row_spacing
        );

        let by_item = items.iter().enumerate().map(|(i, info)| (info.item, i)).collect();
        Ok(DetectedGrid {
            spec,
            columns,
            rows,
            items,
            by_item,
        })
    }

    fn axis_clusters(&self, axis: Axis, items: &[ItemInfo], mean_extent: f64) -> ClusterSet {
        let values: Vec<f64> = items.iter().map(|i| axis.coordinate(i.center)).collect();
        let tolerance = self.tolerance_factor * mean_extent.max(0.0);
        trace!("{axis:?}: tolerance {tolerance} from mean extent {mean_extent}");
        ClusterSet::build(axis, &values, tolerance, self.strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;

    fn square(id: u32, cx: f64, cy: f64, size: f64) -> (ItemId, Bounds) {
        (
            ItemId(id),
            Bounds::centered(Point::new(cx, cy), crate::geometry::Size::new(size, size)),
        )
    }

    fn grid(columns: usize, rows: usize, pitch: f64, size: f64) -> Vec<(ItemId, Bounds)> {
        let mut out = Vec::new();
        for r in 0..rows {
            for c in 0..columns {
                let id = out.len() as u32;
                out.push(square(id, c as f64 * pitch, -(r as f64) * pitch, size));
            }
        }
        out
    }

    // ── ClusterSet ──────────────────────────────────────────────────────

    #[test]
    fn build_merges_within_tolerance() {
        let set = ClusterSet::build(
            Axis::Column,
            &[0.0, 100.0, 2.0, 101.0],
            5.0,
            MergeStrategy::PairwiseAverage,
        );
        assert_eq!(set.centers(), &[1.0, 100.5]);
    }

    #[test]
    fn rows_are_ordered_top_to_bottom() {
        let set = ClusterSet::build(Axis::Row, &[-50.0, 0.0, 50.0], 5.0, MergeStrategy::default());
        assert_eq!(set.centers(), &[50.0, 0.0, -50.0]);
    }

    #[test]
    fn pairwise_average_weights_later_members() {
        // 0, 2, 4 all within tolerance of the running center:
        // (0+2)/2 = 1, (1+4)/2 = 2.5
        let set = ClusterSet::build(
            Axis::Column,
            &[0.0, 2.0, 4.0],
            5.0,
            MergeStrategy::PairwiseAverage,
        );
        assert_eq!(set.centers(), &[2.5]);
    }

    #[test]
    fn centroid_is_true_mean() {
        let set = ClusterSet::build(Axis::Column, &[0.0, 2.0, 4.0], 5.0, MergeStrategy::Centroid);
        assert_eq!(set.centers(), &[2.0]);
    }

    #[test]
    fn boundary_distance_merges() {
        // Exactly at tolerance still merges; only strictly greater splits.
        let set = ClusterSet::build(Axis::Column, &[0.0, 5.0], 5.0, MergeStrategy::default());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn merging_chains_through_adjacent_values() {
        // Each step is within tolerance of the previous running center, so
        // the whole ramp collapses into one cluster.
        let set = ClusterSet::build(
            Axis::Column,
            &[0.0, 2.4, 4.8, 7.2, 9.6],
            5.0,
            MergeStrategy::PairwiseAverage,
        );
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn nearest_prefers_lower_index_on_tie() {
        let set = ClusterSet::from_centers(Axis::Column, &[0.0, 10.0]);
        assert_eq!(set.nearest(5.0), Some(0));
        assert_eq!(set.nearest(6.0), Some(1));
        assert_eq!(ClusterSet::from_centers(Axis::Column, &[]).nearest(1.0), None);
    }

    #[test]
    fn line_steps_down_for_rows() {
        let rows = ClusterSet::from_centers(Axis::Row, &[100.0, 40.0]);
        assert_eq!(rows.line(2, 60.0), Some(-20.0));
        let cols = ClusterSet::from_centers(Axis::Column, &[10.0, 30.0]);
        assert_eq!(cols.line(3, 20.0), Some(70.0));
    }

    // ── GridClusterer ───────────────────────────────────────────────────

    #[test]
    fn recovers_perfect_grid() {
        let index = GeometryIndex::from_bounds(&grid(4, 3, 60.0, 20.0));
        let g = GridClusterer::default().cluster(&index).unwrap();
        assert_eq!(g.spec.columns, 4);
        assert_eq!(g.spec.rows, 3);
        assert!((g.spec.column_spacing - 60.0).abs() < 1e-6);
        assert!((g.spec.row_spacing - 60.0).abs() < 1e-6);
        assert!(g.is_complete());
    }

    #[test]
    fn addresses_follow_visual_order() {
        let items = grid(3, 2, 50.0, 10.0);
        let g = GridClusterer::default()
            .cluster(&GeometryIndex::from_bounds(&items))
            .unwrap();
        // Item 0 is top-left, item 5 is bottom-right.
        assert_eq!(g.address(ItemId(0)), Some(CellAddress { row: 0, column: 0 }));
        assert_eq!(g.address(ItemId(5)), Some(CellAddress { row: 1, column: 2 }));
        assert_eq!(g.address(ItemId(99)), None);
    }

    #[test]
    fn members_lists_a_column() {
        let g = GridClusterer::default()
            .cluster(&GeometryIndex::from_bounds(&grid(2, 3, 40.0, 10.0)))
            .unwrap();
        let col: Vec<_> = g.members(Axis::Column, 1).collect();
        assert_eq!(col, [ItemId(1), ItemId(3), ItemId(5)]);
        let row: Vec<_> = g.members(Axis::Row, 2).collect();
        assert_eq!(row, [ItemId(4), ItemId(5)]);
    }

    #[test]
    fn fewer_than_two_items_is_insufficient() {
        let index = GeometryIndex::from_bounds(&[square(0, 0.0, 0.0, 10.0)]);
        assert_eq!(
            GridClusterer::default().cluster(&index),
            Err(GridError::InsufficientInput { found: 1 })
        );
        assert_eq!(
            GridClusterer::default().cluster(&GeometryIndex::default()),
            Err(GridError::InsufficientInput { found: 0 })
        );
    }

    #[test]
    fn irregular_selection_still_clusters() {
        let index = GeometryIndex::from_bounds(&[
            square(0, 0.0, 0.0, 10.0),
            square(1, 100.0, 37.0, 10.0),
            square(2, 13.0, 200.0, 10.0),
        ]);
        let g = GridClusterer::default().cluster(&index).unwrap();
        assert_eq!(g.spec.columns, 3);
        assert_eq!(g.spec.rows, 3);
        assert!(!g.is_complete());
    }

    #[test]
    fn stacked_items_leave_the_grid_incomplete() {
        // Right count for 2 × 2, but two items share the top-left cell.
        let index = GeometryIndex::from_bounds(&[
            square(0, 0.0, 0.0, 10.0),
            square(1, 1.0, 1.0, 10.0),
            square(2, 50.0, 0.0, 10.0),
            square(3, 0.0, -50.0, 10.0),
        ]);
        let g = GridClusterer::default().cluster(&index).unwrap();
        assert_eq!((g.spec.columns, g.spec.rows), (2, 2));
        assert!(!g.is_complete());
    }

    #[test]
    fn jitter_within_tolerance_is_absorbed() {
        let mut items = grid(3, 3, 50.0, 20.0);
        items[4].1 = items[4].1.translated(3.0, -2.0);
        let g = GridClusterer::default()
            .cluster(&GeometryIndex::from_bounds(&items))
            .unwrap();
        assert_eq!((g.spec.columns, g.spec.rows), (3, 3));
        assert_eq!(g.address(ItemId(4)), Some(CellAddress { row: 1, column: 1 }));
    }

    #[test]
    fn larger_tolerance_collapses_columns() {
        let index = GeometryIndex::from_bounds(&grid(3, 1, 30.0, 20.0));
        let g = GridClusterer::default()
            .tolerance_factor(4.0)
            .cluster(&index)
            .unwrap();
        assert_eq!(g.spec.columns, 1);
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let index = GeometryIndex::from_bounds(&grid(2, 1, 30.0, 20.0));
        assert!(matches!(
            GridClusterer::default().tolerance_factor(-1.0).cluster(&index),
            Err(GridError::InvalidParameter {
                name: "tolerance_factor",
                ..
            })
        ));
    }
}
