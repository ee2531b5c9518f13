//! End-to-end pass over the current selection: detect the grid the items
//! already form, optionally group its lines, and snap the items onto evenly
//! spaced columns and rows.
//!
//! ```
//! use regrid::{Bounds, DocumentSurface, MemoryDocument, Point, Regrid, RegridOptions, Size};
//!
//! let mut doc = MemoryDocument::new();
//! let ids: Vec<_> = [0.0, 47.0, 100.0]
//!     .iter()
//!     .map(|&x| doc.add_rect(Bounds::centered(Point::new(x, 0.0), Size::new(20.0, 20.0))))
//!     .collect();
//! doc.select(&ids);
//!
//! let report = Regrid::new(RegridOptions::default()).run(&mut doc).unwrap();
//! assert_eq!(report.spec.columns, 3);
//! let middle = doc.bounds(ids[1], Default::default()).unwrap().center();
//! assert_eq!(middle.x, 50.0);
//! ```

use alloc::vec::Vec;

use log::debug;

use crate::cluster::{Axis, DetectedGrid, GridClusterer, GridSpec};
use crate::error::GridError;
use crate::geometry::GeometryIndex;
use crate::normalize::{Translation, apply, group_by, normalize};
use crate::surface::{BoundsKind, DocumentSurface, ItemId};

/// Which lines of the detected grid get wrapped into groups.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Grouping {
    #[default]
    None,
    Columns,
    Rows,
}

/// Settings for a [`Regrid`] pass.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegridOptions {
    pub clusterer: GridClusterer,
    /// Bounds used for every measurement. Visible bounds include strokes.
    pub bounds: BoundsKind,
    pub normalize_columns: bool,
    pub normalize_rows: bool,
    pub grouping: Grouping,
}

impl Default for RegridOptions {
    fn default() -> Self {
        Self {
            clusterer: GridClusterer::default(),
            bounds: BoundsKind::Visible,
            normalize_columns: true,
            normalize_rows: true,
            grouping: Grouping::None,
        }
    }
}

impl RegridOptions {
    pub fn clusterer(mut self, clusterer: GridClusterer) -> Self {
        self.clusterer = clusterer;
        self
    }

    pub fn bounds(mut self, kind: BoundsKind) -> Self {
        self.bounds = kind;
        self
    }

    /// Choose which axes to even out.
    pub fn normalize(mut self, columns: bool, rows: bool) -> Self {
        self.normalize_columns = columns;
        self.normalize_rows = rows;
        self
    }

    pub fn grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }
}

/// What a [`Regrid::run`] did.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegridReport {
    /// The grid as detected before anything moved.
    pub spec: GridSpec,
    /// Every translation applied, columns first.
    pub translations: Vec<Translation>,
    /// Groups created, in cluster order.
    pub groups: Vec<ItemId>,
}

/// Grid detection and normalization over a document's selection.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Regrid {
    options: RegridOptions,
}

impl Regrid {
    pub fn new(options: RegridOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RegridOptions {
        &self.options
    }

    /// Items the pass works on: the selection, or the children of a single
    /// selected group.
    pub fn targets<S: DocumentSurface + ?Sized>(&self, surface: &S) -> Vec<ItemId> {
        let selection = surface.selection();
        if let [only] = selection.as_slice() {
            let children = surface.children(*only);
            if !children.is_empty() {
                return children;
            }
        }
        selection
    }

    /// Measure and cluster the targets without touching the document.
    pub fn detect<S: DocumentSurface + ?Sized>(
        &self,
        surface: &S,
    ) -> Result<DetectedGrid, GridError> {
        let items = self.targets(surface);
        let index = GeometryIndex::measure(surface, &items, self.options.bounds)?;
        self.options.clusterer.cluster(&index)
    }

    /// Detect, group and normalize.
    ///
    /// Nothing is moved until the whole column pass has been computed. Row
    /// deltas are computed after the column moves land, from freshly read
    /// centers.
    pub fn run<S: DocumentSurface + ?Sized>(
        &self,
        surface: &mut S,
    ) -> Result<RegridReport, GridError> {
        let grid = self.detect(surface)?;
        let kind = self.options.bounds;

        let groups = match self.options.grouping {
            Grouping::None => Vec::new(),
            Grouping::Columns => group_by(surface, &grid, Axis::Column)?,
            Grouping::Rows => group_by(surface, &grid, Axis::Row)?,
        };

        let mut translations = Vec::new();
        if self.options.normalize_columns {
            let moves = normalize(surface, &grid, Axis::Column, kind)?;
            apply(surface, &moves)?;
            translations.extend(moves);
        }
        if self.options.normalize_rows {
            let moves = normalize(surface, &grid, Axis::Row, kind)?;
            apply(surface, &moves)?;
            translations.extend(moves);
        }

        debug!(
            "regrid: {}×{} grid, {} translations, {} groups",
            grid.spec.columns,
            grid.spec.rows,
            translations.len(),
            groups.len()
        );
        Ok(RegridReport {
            spec: grid.spec,
            translations,
            groups,
        })
    }
}
