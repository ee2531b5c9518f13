//! Grid inference and regular-grid layout for page items.
//!
//! Pure geometry over a host document reached through [`DocumentSurface`]:
//! no rendering, no I/O. Works in `no_std` with `alloc`.
//!
//! Two directions:
//!
//! - **Detect**: cluster the centers of scattered items into columns and
//!   rows, estimate their spacing, and snap the items onto evenly spaced
//!   lines ([`Regrid`]).
//! - **Generate**: replicate a template into a `columns × rows` grid with
//!   gutters, margins and alignment inside a container, optionally fitting
//!   as many copies as possible and adding crop marks ([`GridLayout`]).
//!
//! # Modules
//!
//! - [`geometry`]: bounds, centers and the per-pass [`GeometryIndex`]
//! - [`cluster`]: tolerance clustering into a [`DetectedGrid`]
//! - [`spacing`]: center-to-center spacing per axis
//! - [`layout`]: regular grid placement and fit-to-container
//! - [`marks`]: crop marks for a laid-out grid
//! - [`color`]: crop mark stroke colors
//! - [`normalize`]: translations onto even lines, grouping by line
//! - [`pass`]: the end-to-end detect-and-normalize pass
//! - [`settings`]: flat `key=value` configuration
//! - [`units`]: points, inches, millimeters and friends
//! - `svg` (feature `svg`): SVG preview of a layout
//!
//! # Example
//!
//! ```
//! use regrid::{Bounds, GeometryIndex, GridClusterer, ItemId};
//!
//! let index = GeometryIndex::from_bounds(&[
//!     (ItemId(0), Bounds::new(0.0, 10.0, 10.0, 0.0)),
//!     (ItemId(1), Bounds::new(52.0, 10.0, 62.0, 0.0)),
//!     (ItemId(2), Bounds::new(100.0, 10.0, 110.0, 0.0)),
//! ]);
//! let grid = GridClusterer::default().cluster(&index).unwrap();
//! assert_eq!(grid.spec.columns, 3);
//! assert_eq!(grid.spec.column_spacing, 50.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod cluster;
pub mod color;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod marks;
pub mod normalize;
pub mod orientation;
pub mod pass;
pub mod settings;
pub mod spacing;
pub mod surface;
pub mod units;

#[cfg(feature = "svg")]
pub mod svg;

pub use cluster::{
    Axis, CellAddress, ClusterSet, DetectedGrid, GridClusterer, GridSpec, MergeStrategy,
};
pub use color::MarkColor;
pub use error::GridError;
pub use geometry::{Bounds, GeometryIndex, ItemInfo, Point, Size};
pub use layout::{
    Align, FitCounts, GridLayout, Gutter, LayoutCell, LayoutPlan, MAX_CELLS, choose_orientation,
    fit_counts, layout_cells,
};
pub use marks::{CropMarks, MarkPosition, MarkSegment};
pub use normalize::{Translation, apply, group_by, normalize};
pub use orientation::Orientation;
pub use pass::{Grouping, Regrid, RegridOptions, RegridReport};
pub use settings::{LayoutConfig, ParseWarning};
pub use spacing::{Spacing, estimate_spacing};
pub use surface::{BoundsKind, DocumentSurface, ItemId, MemoryDocument};
pub use units::{Margins, Unit, from_points, to_points};
