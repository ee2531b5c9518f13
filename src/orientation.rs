//! Template orientation for grid replication.

use crate::geometry::{Bounds, Size};

/// How the template is turned before it is replicated.
///
/// ```text
///     Landscape          Portrait (90°)
///     ┌──────┐           ┌───┐
///     │ F    │           │ F │
///     └──────┘           │   │
///                        └───┘
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Template as authored.
    #[default]
    Landscape,
    /// Template rotated 90° about its center.
    Portrait,
}

impl Orientation {
    /// Rotation applied to the template, in degrees.
    pub fn degrees(self) -> f64 {
        match self {
            Self::Landscape => 0.0,
            Self::Portrait => 90.0,
        }
    }

    /// Whether this orientation swaps width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Self::Portrait)
    }

    /// Template size after orientation.
    pub fn transform_size(self, size: Size) -> Size {
        if self.swaps_axes() {
            size.swapped()
        } else {
            size
        }
    }

    /// Template bounds after orientation (rotation keeps the center).
    pub fn transform_bounds(self, bounds: Bounds) -> Bounds {
        if self.swaps_axes() {
            bounds.rotated_quarter()
        } else {
            bounds
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_is_identity() {
        let b = Bounds::new(0.0, 50.0, 100.0, 0.0);
        assert_eq!(Orientation::Landscape.transform_bounds(b), b);
        assert_eq!(
            Orientation::Landscape.transform_size(Size::new(100.0, 50.0)),
            Size::new(100.0, 50.0)
        );
    }

    #[test]
    fn portrait_swaps_dimensions() {
        assert!(Orientation::Portrait.swaps_axes());
        assert_eq!(
            Orientation::Portrait.transform_size(Size::new(100.0, 50.0)),
            Size::new(50.0, 100.0)
        );
        let b = Orientation::Portrait.transform_bounds(Bounds::new(0.0, 50.0, 100.0, 0.0));
        assert_eq!(b, Bounds::new(25.0, 75.0, 75.0, -25.0));
    }

    #[test]
    fn degrees() {
        assert_eq!(Orientation::Landscape.degrees(), 0.0);
        assert_eq!(Orientation::Portrait.degrees(), 90.0);
    }
}
