//! Bounding boxes, centers and the per-pass geometry index.
//!
//! Document coordinates are in points with the vertical axis increasing
//! upward, so a well-formed [`Bounds`] has `top >= bottom`.
//!
//! # Example
//!
//! ```
//! use regrid::{Bounds, GeometryIndex, ItemId};
//!
//! let index = GeometryIndex::from_bounds(&[
//!     (ItemId(0), Bounds::new(0.0, 20.0, 10.0, 0.0)),
//!     (ItemId(1), Bounds::new(30.0, 20.0, 50.0, 0.0)),
//! ]);
//!
//! assert_eq!(index.len(), 2);
//! assert_eq!(index.mean_size().width, 15.0);
//! ```

use alloc::vec::Vec;

use crate::error::GridError;
use crate::surface::{BoundsKind, DocumentSurface, ItemId};

/// A point in document space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width × height extent in points.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Same size with width and height exchanged.
    pub const fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Area in square points.
    pub fn area(self) -> f64 {
        self.width * self.height
    }
}

/// Axis-aligned box as `(left, top, right, bottom)`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Bounds {
    /// Create bounds from the four edges.
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Bounds with top-left corner at `origin` and the given size.
    pub fn from_origin(origin: Point, size: Size) -> Self {
        Self {
            left: origin.x,
            top: origin.y,
            right: origin.x + size.width,
            bottom: origin.y - size.height,
        }
    }

    /// Bounds of the given size centered on `center`.
    pub fn centered(center: Point, size: Size) -> Self {
        let hw = size.width / 2.0;
        let hh = size.height / 2.0;
        Self {
            left: center.x - hw,
            top: center.y + hh,
            right: center.x + hw,
            bottom: center.y - hh,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Move by `(dx, dy)`.
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    /// Grow every edge outward by `amount` (shrinks when negative).
    pub fn outset(self, amount: f64) -> Self {
        Self {
            left: self.left - amount,
            top: self.top + amount,
            right: self.right + amount,
            bottom: self.bottom - amount,
        }
    }

    /// Smallest bounds containing both.
    pub fn union(self, other: Self) -> Self {
        Self {
            left: self.left.min(other.left),
            top: self.top.max(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.min(other.bottom),
        }
    }

    /// Same center, width and height exchanged (a 90° turn about the center).
    pub fn rotated_quarter(self) -> Self {
        Self::centered(self.center(), self.size().swapped())
    }
}

/// Measurements for one item, fresh for a single analysis pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ItemInfo {
    pub item: ItemId,
    pub center: Point,
    pub width: f64,
    pub height: f64,
    /// Assigned column index, set by the clusterer.
    pub column: usize,
    /// Assigned row index (0 = topmost), set by the clusterer.
    pub row: usize,
}

impl ItemInfo {
    fn from_bounds(item: ItemId, bounds: Bounds) -> Self {
        Self {
            item,
            center: bounds.center(),
            width: bounds.width(),
            height: bounds.height(),
            column: 0,
            row: 0,
        }
    }
}

/// Centers and sizes of a set of items.
///
/// Never cache an index across a translation: build a new one after any
/// item moves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryIndex {
    items: Vec<ItemInfo>,
}

impl GeometryIndex {
    /// Read current bounds for `items` from the surface.
    pub fn measure<S: DocumentSurface + ?Sized>(
        surface: &S,
        items: &[ItemId],
        kind: BoundsKind,
    ) -> Result<Self, GridError> {
        let items = items
            .iter()
            .map(|&id| Ok(ItemInfo::from_bounds(id, surface.bounds(id, kind)?)))
            .collect::<Result<Vec<_>, GridError>>()?;
        Ok(Self { items })
    }

    /// Build an index from already known bounds.
    pub fn from_bounds(items: &[(ItemId, Bounds)]) -> Self {
        Self {
            items: items
                .iter()
                .map(|&(id, b)| ItemInfo::from_bounds(id, b))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ItemInfo] {
        &self.items
    }

    /// Mean width and height. Zero for an empty index.
    pub fn mean_size(&self) -> Size {
        if self.items.is_empty() {
            return Size::default();
        }
        let n = self.items.len() as f64;
        let (w, h) = self
            .items
            .iter()
            .fold((0.0, 0.0), |(w, h), i| (w + i.width, h + i.height));
        Size::new(w / n, h / n)
    }
}
