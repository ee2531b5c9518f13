//! Even out a detected grid and group its lines.
//!
//! The normalizer computes translations; it never moves anything itself.
//! Callers apply the deltas with [`apply`] once the whole pass has been
//! computed, so no measurement is ever taken from a half-moved selection.

use alloc::vec::Vec;

use log::debug;
use num_traits::Float;

use crate::cluster::{Axis, DetectedGrid};
use crate::error::GridError;
use crate::surface::{BoundsKind, DocumentSurface, ItemId};

/// Relative move for one item.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Translation {
    pub item: ItemId,
    pub dx: f64,
    pub dy: f64,
}

impl Translation {
    /// Whether the move is smaller than `epsilon` on both axes.
    pub fn is_negligible(&self, epsilon: f64) -> bool {
        Float::abs(self.dx) < epsilon && Float::abs(self.dy) < epsilon
    }
}

/// Deltas that put every item of `grid` on evenly spaced lines along `axis`.
///
/// Line `i` sits at `first center + i × spacing` (rows step downward).
/// Current centers are re-read from `surface` here, so the result is valid
/// even if items moved after `grid` was detected. Returns nothing when the
/// axis has fewer than two clusters.
pub fn normalize<S: DocumentSurface + ?Sized>(
    surface: &S,
    grid: &DetectedGrid,
    axis: Axis,
    kind: BoundsKind,
) -> Result<Vec<Translation>, GridError> {
    let clusters = grid.clusters(axis);
    if clusters.len() < 2 {
        return Ok(Vec::new());
    }
    let spacing = grid.spacing(axis);

    let mut out = Vec::with_capacity(grid.items().len());
    for info in grid.items() {
        let index = match axis {
            Axis::Column => info.column,
            Axis::Row => info.row,
        };
        let Some(target) = clusters.line(index, spacing) else {
            continue;
        };
        let current = axis.coordinate(surface.bounds(info.item, kind)?.center());
        let delta = target - current;
        out.push(match axis {
            Axis::Column => Translation {
                item: info.item,
                dx: delta,
                dy: 0.0,
            },
            Axis::Row => Translation {
                item: info.item,
                dx: 0.0,
                dy: delta,
            },
        });
    }
    debug!(
        "normalize {axis:?}: {} items onto {} lines, spacing {spacing:.3}",
        out.len(),
        clusters.len()
    );
    Ok(out)
}

/// Apply translations to the surface.
pub fn apply<S: DocumentSurface + ?Sized>(
    surface: &mut S,
    translations: &[Translation],
) -> Result<(), GridError> {
    for t in translations {
        surface.translate(t.item, t.dx, t.dy)?;
    }
    Ok(())
}

/// Group the members of every column (or row) into a new group.
///
/// Groups are created under the parent of the first item, in cluster order.
/// Returns the new group handles. Fails before grouping anything when that
/// parent is itself one of the grid's items or lies inside one.
pub fn group_by<S: DocumentSurface + ?Sized>(
    surface: &mut S,
    grid: &DetectedGrid,
    axis: Axis,
) -> Result<Vec<ItemId>, GridError> {
    let Some(first) = grid.items().first() else {
        return Ok(Vec::new());
    };
    let parent = surface.parent(first.item);
    let selected = |id: ItemId| grid.items().iter().any(|info| info.item == id);
    if core::iter::successors(parent, |&id| surface.parent(id)).any(selected) {
        return Err(GridError::invalid("parent", "inside one of the grouped items"));
    }

    let mut groups = Vec::with_capacity(grid.clusters(axis).len());
    for index in 0..grid.clusters(axis).len() {
        let members: Vec<ItemId> = grid.members(axis, index).collect();
        if members.is_empty() {
            continue;
        }
        groups.push(surface.group_into(parent, &members)?);
    }
    debug!("grouped {} {axis:?} lines", groups.len());
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::GridClusterer;
    use crate::geometry::{Bounds, GeometryIndex, Point, Size};
    use crate::surface::MemoryDocument;

    /// 3 × 2 grid, pitch 50, with the middle column nudged right.
    fn jittered() -> (MemoryDocument, Vec<ItemId>) {
        let mut doc = MemoryDocument::new();
        let mut ids = Vec::new();
        for r in 0..2 {
            for c in 0..3 {
                let nudge = if c == 1 { 4.0 } else { 0.0 };
                let center = Point::new(c as f64 * 50.0 + nudge, -(r as f64) * 50.0);
                ids.push(doc.add_rect(Bounds::centered(center, Size::new(20.0, 20.0))));
            }
        }
        (doc, ids)
    }

    fn detect(doc: &MemoryDocument, ids: &[ItemId]) -> DetectedGrid {
        let index = GeometryIndex::measure(doc, ids, BoundsKind::Geometric).unwrap();
        GridClusterer::default().cluster(&index).unwrap()
    }

    #[test]
    fn columns_become_evenly_spaced() {
        let (mut doc, ids) = jittered();
        let grid = detect(&doc, &ids);
        let moves = normalize(&doc, &grid, Axis::Column, BoundsKind::Geometric).unwrap();
        assert_eq!(moves.len(), 6);
        apply(&mut doc, &moves).unwrap();

        let xs: Vec<f64> = ids
            .iter()
            .take(3)
            .map(|&id| doc.bounds(id, BoundsKind::Geometric).unwrap().center().x)
            .collect();
        assert!(((xs[1] - xs[0]) - (xs[2] - xs[1])).abs() < 1e-9);
        // Rows untouched.
        assert!(moves.iter().all(|m| m.dy == 0.0));
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let (mut doc, ids) = jittered();
        let grid = detect(&doc, &ids);
        let moves = normalize(&doc, &grid, Axis::Column, BoundsKind::Geometric).unwrap();
        apply(&mut doc, &moves).unwrap();

        let again = detect(&doc, &ids);
        let moves = normalize(&doc, &again, Axis::Column, BoundsKind::Geometric).unwrap();
        assert!(moves.iter().all(|m| m.is_negligible(1e-9)), "{moves:?}");
    }

    #[test]
    fn rows_step_downward() {
        let mut doc = MemoryDocument::new();
        let size = Size::new(10.0, 10.0);
        let ids = [
            doc.add_rect(Bounds::centered(Point::new(0.0, 100.0), size)),
            doc.add_rect(Bounds::centered(Point::new(0.0, 70.0), size)),
            doc.add_rect(Bounds::centered(Point::new(0.0, 0.0), size)),
        ];
        let grid = detect(&doc, &ids);
        assert_eq!(grid.spec.row_spacing, 50.0);
        let moves = normalize(&doc, &grid, Axis::Row, BoundsKind::Geometric).unwrap();
        apply(&mut doc, &moves).unwrap();
        let y = |id| doc.bounds(id, BoundsKind::Geometric).unwrap().center().y;
        assert_eq!(y(ids[0]), 100.0);
        assert_eq!(y(ids[1]), 50.0);
        assert_eq!(y(ids[2]), 0.0);
    }

    #[test]
    fn centers_are_reread_before_emitting() {
        let (mut doc, ids) = jittered();
        let grid = detect(&doc, &ids);
        // Move an item after detection; its delta must account for it.
        doc.translate(ids[0], 7.0, 0.0).unwrap();
        let moves = normalize(&doc, &grid, Axis::Column, BoundsKind::Geometric).unwrap();
        let m0 = moves.iter().find(|m| m.item == ids[0]).unwrap();
        let target = grid.columns.line(0, grid.spec.column_spacing).unwrap();
        assert!((m0.dx - (target - 7.0)).abs() < 1e-9);
    }

    #[test]
    fn single_line_axis_emits_nothing() {
        let mut doc = MemoryDocument::new();
        let size = Size::new(10.0, 10.0);
        let ids = [
            doc.add_rect(Bounds::centered(Point::new(0.0, 0.0), size)),
            doc.add_rect(Bounds::centered(Point::new(50.0, 1.0), size)),
        ];
        let grid = detect(&doc, &ids);
        assert!(normalize(&doc, &grid, Axis::Row, BoundsKind::Geometric).unwrap().is_empty());
    }

    #[test]
    fn group_by_columns() {
        let (mut doc, ids) = jittered();
        let grid = detect(&doc, &ids);
        let groups = group_by(&mut doc, &grid, Axis::Column).unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(doc.children(groups[0]), [ids[0], ids[3]]);
        assert_eq!(doc.children(groups[2]), [ids[2], ids[5]]);
    }

    #[test]
    fn group_by_rows_keeps_parent() {
        let (mut doc, ids) = jittered();
        let layer = doc.group_into(None, &ids).unwrap();
        let grid = detect(&doc, &ids);
        let groups = group_by(&mut doc, &grid, Axis::Row).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(doc.parent(groups[1]), Some(layer));
        assert_eq!(doc.children(groups[1]), [ids[3], ids[4], ids[5]]);
    }
}
