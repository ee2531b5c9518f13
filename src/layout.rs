//! Regular-grid layout: replicate a template into columns × rows.
//!
//! Computes cell origins from a template size, cell counts, gutters and an
//! optional container (artboard). Pure geometry: the plan says where each
//! copy goes, the caller duplicates and moves the artwork.
//!
//! # Example
//!
//! ```
//! use regrid::{Bounds, GridLayout, Gutter, Point};
//!
//! let template = Bounds::new(0.0, 0.0, 100.0, -50.0);
//! let plan = GridLayout::new(3, 2)
//!     .gutter(Gutter::uniform(10.0))
//!     .compute(template, None)
//!     .unwrap();
//!
//! assert_eq!(plan.cells.len(), 6);
//! assert_eq!(plan.cell(1, 0).unwrap().origin, Point::new(110.0, 0.0));
//! assert_eq!(plan.cell(0, 1).unwrap().origin, Point::new(0.0, -60.0));
//! ```
//!
//! # Fit to container
//!
//! With [`GridLayout::fit`] the counts come from the container instead:
//! the interior (container minus margins) is divided by the template pitch
//! in both orientations and the one holding more cells wins. Ties keep the
//! template as authored.

use alloc::vec::Vec;

use log::{debug, warn};
use num_traits::Float;

use crate::cluster::GridSpec;
use crate::error::GridError;
use crate::geometry::{Bounds, Point, Size};
use crate::orientation::Orientation;
use crate::units::Margins;

/// Space inserted between adjacent cells, in points.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gutter {
    /// Horizontal gap between columns.
    pub columns: f64,
    /// Vertical gap between rows.
    pub rows: f64,
}

impl Gutter {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(columns: f64, rows: f64) -> Self {
        Self { columns, rows }
    }

    pub const fn uniform(gap: f64) -> Self {
        Self::new(gap, gap)
    }

    /// Gaps exchanged, for a template turned 90°.
    pub const fn swapped(self) -> Self {
        Self::new(self.rows, self.columns)
    }

    fn is_valid(&self) -> bool {
        self.columns.is_finite() && self.rows.is_finite() && self.columns >= 0.0 && self.rows >= 0.0
    }
}

/// Where the grid block sits inside the container interior.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    /// Grow the grid from the template's current position.
    #[default]
    None,
    Center,
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

/// Position along one axis of the interior.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Anchor {
    Near,
    Center,
    Far,
}

impl Align {
    /// Horizontal and vertical anchors, `None` for [`Align::None`].
    fn anchors(self) -> Option<(Anchor, Anchor)> {
        use Anchor::{Center, Far, Near};
        Some(match self {
            Self::None => return None,
            Self::Center => (Center, Center),
            Self::TopLeft => (Near, Near),
            Self::TopCenter => (Center, Near),
            Self::TopRight => (Far, Near),
            Self::MiddleLeft => (Near, Center),
            Self::MiddleRight => (Far, Center),
            Self::BottomLeft => (Near, Far),
            Self::BottomCenter => (Center, Far),
            Self::BottomRight => (Far, Far),
        })
    }

    /// Top-left corner for a block of `extent` placed in `interior`.
    fn place(self, interior: Bounds, extent: Size) -> Option<Point> {
        let (h, v) = self.anchors()?;
        let x = match h {
            Anchor::Near => interior.left,
            Anchor::Center => (interior.left + interior.right - extent.width) / 2.0,
            Anchor::Far => interior.right - extent.width,
        };
        let y = match v {
            Anchor::Near => interior.top,
            Anchor::Center => (interior.top + interior.bottom + extent.height) / 2.0,
            Anchor::Far => interior.bottom + extent.height,
        };
        Some(Point::new(x, y))
    }
}

/// Target placement of one template copy.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutCell {
    pub column: u32,
    pub row: u32,
    /// Top-left corner of the cell.
    pub origin: Point,
}

/// Cell counts that fit in an area.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FitCounts {
    pub columns: u32,
    pub rows: u32,
}

impl FitCounts {
    pub fn product(self) -> u64 {
        u64::from(self.columns) * u64::from(self.rows)
    }
}

/// Largest grid [`GridLayout::compute`] will lay out.
pub const MAX_CELLS: u64 = 1 << 20;

/// How many pitches of `pitch` fit in `space`.
///
/// The floor estimate is decremented when multiplying back still overflows
/// `space` by rounding error.
fn fit_count(space: f64, pitch: f64) -> u32 {
    if !(pitch > 0.0) || !(space > 0.0) {
        return 0;
    }
    let mut n = Float::floor(space / pitch);
    if pitch * n > space {
        n -= 1.0;
    }
    if n <= 0.0 { 0 } else { n as u32 }
}

/// Maximum columns × rows of `pitch` inside `interior`.
pub fn fit_counts(interior: Size, pitch: Size) -> FitCounts {
    FitCounts {
        columns: fit_count(interior.width, pitch.width),
        rows: fit_count(interior.height, pitch.height),
    }
}

/// Pick the orientation that fits the most cells into `interior`.
///
/// Portrait turns the template 90°, and its gutters turn with it. Landscape
/// is evaluated first and kept unless portrait is strictly better.
pub fn choose_orientation(
    interior: Size,
    template: Size,
    gutter: Gutter,
) -> (Orientation, FitCounts) {
    let pitch = Size::new(template.width + gutter.columns, template.height + gutter.rows);
    let landscape = fit_counts(interior, pitch);
    let portrait = fit_counts(interior, pitch.swapped());
    debug!(
        "fit {:.3}×{:.3}: landscape {}×{}, portrait {}×{}",
        interior.width,
        interior.height,
        landscape.columns,
        landscape.rows,
        portrait.columns,
        portrait.rows
    );
    if portrait.product() > landscape.product() {
        (Orientation::Portrait, portrait)
    } else {
        (Orientation::Landscape, landscape)
    }
}

/// Cell origins for a `columns × rows` grid starting at `start`.
///
/// Columns advance right by `size.width + gutter.columns`; rows advance down
/// by `size.height + gutter.rows`. Cells are returned row by row.
pub fn layout_cells(
    size: Size,
    columns: u32,
    rows: u32,
    gutter: Gutter,
    start: Point,
) -> Vec<LayoutCell> {
    let step_x = size.width + gutter.columns;
    let step_y = size.height + gutter.rows;
    let count = u64::from(columns) * u64::from(rows);
    let mut cells = Vec::with_capacity(count.min(MAX_CELLS) as usize);
    for row in 0..rows {
        for column in 0..columns {
            cells.push(LayoutCell {
                column,
                row,
                origin: Point::new(
                    start.x + f64::from(column) * step_x,
                    start.y - f64::from(row) * step_y,
                ),
            });
        }
    }
    cells
}

/// Grid layout request.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridLayout {
    /// Column count; ignored when fitting to the container.
    pub columns: u32,
    /// Row count; ignored when fitting to the container.
    pub rows: u32,
    pub gutter: Gutter,
    /// Inset of the usable container interior.
    pub margins: Margins,
    pub align: Align,
    /// Derive counts and orientation from the container.
    pub fit_to_container: bool,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl GridLayout {
    /// Fixed `columns × rows` grid, no gutters, grown from the template.
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            gutter: Gutter::ZERO,
            margins: Margins::ZERO,
            align: Align::None,
            fit_to_container: false,
        }
    }

    /// As many cells as fit in the container, centered in its interior.
    pub fn fit() -> Self {
        Self {
            fit_to_container: true,
            ..Self::new(0, 0)
        }
    }

    pub fn gutter(mut self, gutter: Gutter) -> Self {
        self.gutter = gutter;
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn fit_to_container(mut self, fit: bool) -> Self {
        self.fit_to_container = fit;
        self
    }

    /// Usable interior of `container` after margins.
    pub fn interior(&self, container: Bounds) -> Bounds {
        Bounds::new(
            container.left + self.margins.left,
            container.top - self.margins.top,
            container.right - self.margins.right,
            container.bottom + self.margins.bottom,
        )
    }

    /// Compute cell placements for `template`.
    ///
    /// `container` is required for fitting and for any alignment other than
    /// [`Align::None`].
    pub fn compute(
        &self,
        template: Bounds,
        container: Option<Bounds>,
    ) -> Result<LayoutPlan, GridError> {
        let size = template.size();
        if !(size.width > 0.0 && size.height > 0.0)
            || !size.width.is_finite()
            || !size.height.is_finite()
        {
            return Err(GridError::invalid("template", "width and height must be positive"));
        }
        if !self.gutter.is_valid() {
            return Err(GridError::invalid("gutter", "must be finite and non-negative"));
        }
        if !self.margins.is_valid() {
            return Err(GridError::invalid("margins", "must be finite and non-negative"));
        }

        let interior = match container {
            Some(c) => {
                let interior = self.interior(c);
                if interior.width() <= 0.0 || interior.height() <= 0.0 {
                    warn!("container interior {interior:?} is empty");
                    return Err(GridError::EmptyLayout { columns: 0, rows: 0 });
                }
                Some(interior)
            }
            None => None,
        };

        let (orientation, counts) = if self.fit_to_container {
            let interior = interior.ok_or(GridError::invalid("container", "required to fit"))?;
            let (orientation, counts) = choose_orientation(interior.size(), size, self.gutter);
            if counts.columns == 0 || counts.rows == 0 {
                warn!("template {size:?} does not fit in {:?}", interior.size());
                return Err(GridError::EmptyLayout {
                    columns: counts.columns,
                    rows: counts.rows,
                });
            }
            (orientation, counts)
        } else {
            if self.columns == 0 || self.rows == 0 {
                return Err(GridError::invalid("columns/rows", "must be at least 1"));
            }
            (
                Orientation::Landscape,
                FitCounts {
                    columns: self.columns,
                    rows: self.rows,
                },
            )
        };
        if counts.product() > MAX_CELLS {
            warn!("{}×{} grid exceeds {MAX_CELLS} cells", counts.columns, counts.rows);
            return Err(GridError::invalid("columns/rows", "grid has too many cells"));
        }

        let oriented = orientation.transform_bounds(template);
        let cell_size = oriented.size();
        let gutter = if orientation.swaps_axes() {
            self.gutter.swapped()
        } else {
            self.gutter
        };
        let extent = block_extent(cell_size, counts, gutter);

        let align = if self.fit_to_container { Align::Center } else { self.align };
        let origin = match (align, interior) {
            (Align::None, _) => oriented.origin(),
            (align, Some(interior)) => align
                .place(interior, extent)
                .unwrap_or_else(|| oriented.origin()),
            (_, None) => return Err(GridError::invalid("align", "requires a container")),
        };

        let cells = layout_cells(cell_size, counts.columns, counts.rows, gutter, origin);
        debug!(
            "layout {}×{} {:?} cells of {:.3}×{:.3} at ({:.3}, {:.3})",
            counts.columns,
            counts.rows,
            orientation,
            cell_size.width,
            cell_size.height,
            origin.x,
            origin.y
        );

        Ok(LayoutPlan {
            orientation,
            columns: counts.columns,
            rows: counts.rows,
            template: oriented,
            cell_size,
            gutter,
            origin,
            interior,
            cells,
        })
    }
}

fn block_extent(cell: Size, counts: FitCounts, gutter: Gutter) -> Size {
    let span = |n: u32, size: f64, gap: f64| {
        if n == 0 {
            0.0
        } else {
            f64::from(n) * size + f64::from(n - 1) * gap
        }
    };
    Size::new(
        span(counts.columns, cell.width, gutter.columns),
        span(counts.rows, cell.height, gutter.rows),
    )
}

/// Result of [`GridLayout::compute`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutPlan {
    /// Whether the template is turned before replication.
    pub orientation: Orientation,
    pub columns: u32,
    pub rows: u32,
    /// Template bounds after orientation, at its original position.
    pub template: Bounds,
    /// Size of one cell (the oriented template).
    pub cell_size: Size,
    /// Gutters in effect after orientation.
    pub gutter: Gutter,
    /// Top-left corner of the first cell.
    pub origin: Point,
    /// Container interior after margins, when a container was given.
    pub interior: Option<Bounds>,
    /// Row-major cell placements.
    pub cells: Vec<LayoutCell>,
}

impl LayoutPlan {
    /// Cell at `(column, row)`.
    pub fn cell(&self, column: u32, row: u32) -> Option<&LayoutCell> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells.get((row * self.columns + column) as usize)
    }

    /// Distance from one cell origin to the next on each axis.
    pub fn pitch(&self) -> Size {
        Size::new(
            self.cell_size.width + self.gutter.columns,
            self.cell_size.height + self.gutter.rows,
        )
    }

    /// Total width and height of the grid block.
    pub fn extent(&self) -> Size {
        block_extent(
            self.cell_size,
            FitCounts {
                columns: self.columns,
                rows: self.rows,
            },
            self.gutter,
        )
    }

    /// Bounds of the whole grid block.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_origin(self.origin, self.extent())
    }

    /// Bounds of one cell.
    pub fn cell_bounds(&self, cell: &LayoutCell) -> Bounds {
        Bounds::from_origin(cell.origin, self.cell_size)
    }

    /// Copies produced when every one of `items` templates is laid out.
    pub fn piece_count(&self, items: usize) -> usize {
        self.cells.len() * items
    }

    /// Summary as a [`GridSpec`] (spacing is the cell pitch).
    pub fn spec(&self) -> GridSpec {
        let pitch = self.pitch();
        GridSpec {
            columns: self.columns as usize,
            rows: self.rows as usize,
            column_spacing: if self.columns > 1 { pitch.width } else { 0.0 },
            row_spacing: if self.rows > 1 { pitch.height } else { 0.0 },
        }
    }

    /// Offset of every cell from the oriented template's position.
    pub fn translations(&self) -> impl Iterator<Item = (LayoutCell, f64, f64)> + '_ {
        let from = self.template.origin();
        self.cells
            .iter()
            .map(move |c| (*c, c.origin.x - from.x, c.origin.y - from.y))
    }
}
