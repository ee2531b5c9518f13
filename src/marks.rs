//! Crop marks for a laid-out grid.
//!
//! ```
//! use regrid::{Bounds, CropMarks, GridLayout, MarkPosition};
//!
//! let plan = GridLayout::new(2, 1)
//!     .compute(Bounds::new(0.0, 0.0, 100.0, -50.0), None)
//!     .unwrap();
//!
//! let marks = CropMarks::new(18.0).position(MarkPosition::Absolute);
//! // Three vertical cut lines (shared edge counted once) × top and bottom,
//! // plus two horizontal cut lines × left and right.
//! assert_eq!(marks.generate(&plan).unwrap().len(), 10);
//! ```

use alloc::vec::Vec;

use num_traits::Float;

use crate::color::MarkColor;
use crate::error::GridError;
use crate::geometry::{Bounds, Point};
use crate::layout::LayoutPlan;

/// Segments closer than this are considered the same mark.
const SAME_MARK_EPSILON: f64 = 1e-9;

/// Where crop marks are drawn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarkPosition {
    /// Only around the outside of the whole grid, one pair per cut line.
    #[default]
    Absolute,
    /// At every corner of every cell. Marks running into a gutter between
    /// two cells stop halfway across it, so they never touch the neighbor.
    Relative,
}

/// Crop mark settings, lengths in points.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CropMarks {
    /// Length of each mark.
    pub size: f64,
    /// Gap between the artwork edge and the start of the mark.
    pub offset: f64,
    pub position: MarkPosition,
    /// Stroke weight for whoever draws the marks.
    pub stroke_width: f64,
    /// Stroke color for whoever draws the marks.
    pub color: MarkColor,
}

impl Default for CropMarks {
    fn default() -> Self {
        // 1/4" marks, 0.01" weight, registration color.
        Self {
            size: 18.0,
            offset: 0.0,
            position: MarkPosition::Absolute,
            stroke_width: 0.72,
            color: MarkColor::REGISTRATION,
        }
    }
}

/// A single straight mark, drawn from `from` (near the artwork) to `to`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkSegment {
    pub from: Point,
    pub to: Point,
}

impl MarkSegment {
    fn same_as(&self, other: &Self) -> bool {
        let close = |a: f64, b: f64| Float::abs(a - b) < SAME_MARK_EPSILON;
        close(self.from.x, other.from.x)
            && close(self.from.y, other.from.y)
            && close(self.to.x, other.to.x)
            && close(self.to.y, other.to.y)
    }
}

impl CropMarks {
    /// Marks of the given length, defaults otherwise.
    pub fn new(size: f64) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn position(mut self, position: MarkPosition) -> Self {
        self.position = position;
        self
    }

    pub fn stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    pub fn color(mut self, color: MarkColor) -> Self {
        self.color = color;
        self
    }

    fn validate(&self) -> Result<(), GridError> {
        if !(self.size > 0.0) || !self.size.is_finite() {
            return Err(GridError::invalid("marks.size", "must be positive"));
        }
        if !(self.offset >= 0.0) || !self.offset.is_finite() {
            return Err(GridError::invalid("marks.offset", "must be finite and non-negative"));
        }
        if !(self.stroke_width >= 0.0) || !self.stroke_width.is_finite() {
            return Err(GridError::invalid("marks.weight", "must be finite and non-negative"));
        }
        if !self.color.is_valid() {
            return Err(GridError::invalid("marks.color", "components out of range"));
        }
        Ok(())
    }

    /// Mark segments for `plan`, without duplicates.
    pub fn generate(&self, plan: &LayoutPlan) -> Result<Vec<MarkSegment>, GridError> {
        self.validate()?;
        let mut out = Vec::new();
        match self.position {
            MarkPosition::Relative => {
                let room_x = plan.gutter.columns / 2.0 - self.offset;
                let room_y = plan.gutter.rows / 2.0 - self.offset;
                let reach = |between: bool, room: f64| {
                    if between { self.size.min(room).max(0.0) } else { self.size }
                };
                for cell in &plan.cells {
                    let lengths = Reach {
                        left: reach(cell.column > 0, room_x),
                        right: reach(cell.column + 1 < plan.columns, room_x),
                        up: reach(cell.row > 0, room_y),
                        down: reach(cell.row + 1 < plan.rows, room_y),
                    };
                    self.corner_marks(plan.cell_bounds(cell), lengths, &mut out);
                }
            }
            MarkPosition::Absolute => self.perimeter_marks(plan, &mut out),
        }
        Ok(out)
    }

    /// Two marks at each corner of `b`, pointing away from it.
    fn corner_marks(&self, b: Bounds, reach: Reach, out: &mut Vec<MarkSegment>) {
        let corners = [
            (b.left, b.top, -1.0, 1.0),
            (b.right, b.top, 1.0, 1.0),
            (b.right, b.bottom, 1.0, -1.0),
            (b.left, b.bottom, -1.0, -1.0),
        ];
        for (x, y, sx, sy) in corners {
            let across = if sx < 0.0 { reach.left } else { reach.right };
            let along = if sy > 0.0 { reach.up } else { reach.down };
            self.push_horizontal(y, x, sx, across, out);
            self.push_vertical(x, y, sy, along, out);
        }
    }

    /// Marks outside the grid block at every column and row edge.
    fn perimeter_marks(&self, plan: &LayoutPlan, out: &mut Vec<MarkSegment>) {
        let block = plan.bounds();
        let pitch = plan.pitch();
        for c in 0..plan.columns {
            let left = plan.origin.x + f64::from(c) * pitch.width;
            for x in [left, left + plan.cell_size.width] {
                self.push_vertical(x, block.top, 1.0, self.size, out);
                self.push_vertical(x, block.bottom, -1.0, self.size, out);
            }
        }
        for r in 0..plan.rows {
            let top = plan.origin.y - f64::from(r) * pitch.height;
            for y in [top, top - plan.cell_size.height] {
                self.push_horizontal(y, block.left, -1.0, self.size, out);
                self.push_horizontal(y, block.right, 1.0, self.size, out);
            }
        }
    }

    /// Horizontal mark of `len` on line `y` starting beside `x`, heading `dir`.
    fn push_horizontal(&self, y: f64, x: f64, dir: f64, len: f64, out: &mut Vec<MarkSegment>) {
        let start = x + dir * self.offset;
        push_unique(
            out,
            MarkSegment {
                from: Point::new(start, y),
                to: Point::new(start + dir * len, y),
            },
        );
    }

    /// Vertical mark of `len` on line `x` starting beside `y`, heading `dir`.
    fn push_vertical(&self, x: f64, y: f64, dir: f64, len: f64, out: &mut Vec<MarkSegment>) {
        let start = y + dir * self.offset;
        push_unique(
            out,
            MarkSegment {
                from: Point::new(x, start),
                to: Point::new(x, start + dir * len),
            },
        );
    }
}

/// Longest mark allowed in each direction from one cell.
#[derive(Copy, Clone)]
struct Reach {
    left: f64,
    right: f64,
    up: f64,
    down: f64,
}

/// Adds `seg` unless it is empty or already present.
fn push_unique(out: &mut Vec<MarkSegment>, seg: MarkSegment) {
    let length = Float::abs(seg.to.x - seg.from.x) + Float::abs(seg.to.y - seg.from.y);
    if length > SAME_MARK_EPSILON && !out.iter().any(|s| s.same_as(&seg)) {
        out.push(seg);
    }
}
