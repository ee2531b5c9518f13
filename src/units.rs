//! Linear units and length parsing.
//!
//! All geometry is in points. Inputs such as `"0.25 in"` or `"5mm"` are
//! converted on the way in; a bare number is read as inches.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::GridError;

const MM_PER_INCH: f64 = 25.4;
const POINTS_PER_INCH: f64 = 72.0;

/// A linear unit understood by [`to_points`] and [`from_points`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unit {
    /// PostScript point, 1/72 inch.
    Point,
    /// Document pixel, identical to a point.
    Pixel,
    /// Pica, 12 points.
    Pica,
    Inch,
    Millimeter,
    Centimeter,
}

impl Unit {
    /// Every supported unit.
    pub const ALL: [Self; 6] = [
        Self::Point,
        Self::Pixel,
        Self::Pica,
        Self::Inch,
        Self::Millimeter,
        Self::Centimeter,
    ];

    /// Points per one of this unit.
    pub const fn points(self) -> f64 {
        match self {
            Self::Point | Self::Pixel => 1.0,
            Self::Pica => 12.0,
            Self::Inch => POINTS_PER_INCH,
            Self::Millimeter => POINTS_PER_INCH / MM_PER_INCH,
            Self::Centimeter => POINTS_PER_INCH / (MM_PER_INCH / 10.0),
        }
    }

    /// Two-letter suffix.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Point => "pt",
            Self::Pixel => "px",
            Self::Pica => "pc",
            Self::Inch => "in",
            Self::Millimeter => "mm",
            Self::Centimeter => "cm",
        }
    }

    /// Look up a unit by its suffix (case-insensitive).
    pub fn from_suffix(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|u| u.suffix().eq_ignore_ascii_case(s))
    }
}

/// Convert `value` in `unit` to points.
pub fn to_points(value: f64, unit: Unit) -> f64 {
    value * unit.points()
}

/// Convert `points` to `unit`.
pub fn from_points(points: f64, unit: Unit) -> f64 {
    points / unit.points()
}

/// Parse a length such as `"0.25 in"`, `"5mm"` or `"12"` into points.
///
/// A number without a suffix is taken in `default_unit`.
pub fn parse_length_in(s: &str, default_unit: Unit) -> Result<f64, GridError> {
    let trimmed = s.trim();
    let (number, unit) = match trimmed
        .len()
        .checked_sub(2)
        .filter(|&i| trimmed.is_char_boundary(i))
        .and_then(|i| Unit::from_suffix(&trimmed[i..]).map(|u| (&trimmed[..i], u)))
    {
        Some((number, unit)) => (number.trim_end(), unit),
        None => (trimmed, default_unit),
    };
    number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| to_points(v, unit))
        .ok_or_else(|| GridError::InvalidLength(String::from(s)))
}

/// Parse a length into points, reading bare numbers as inches.
///
/// ```
/// use regrid::units::parse_length;
///
/// assert_eq!(parse_length("1in").unwrap(), 72.0);
/// assert_eq!(parse_length("0.5").unwrap(), 36.0);
/// assert_eq!(parse_length("10 pt").unwrap(), 10.0);
/// ```
pub fn parse_length(s: &str) -> Result<f64, GridError> {
    parse_length_in(s, Unit::Inch)
}

/// Page margins in points.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub const ZERO: Self = Self::uniform(0.0);

    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn uniform(m: f64) -> Self {
        Self::new(m, m, m, m)
    }

    /// Parse space-separated `top right bottom left` lengths.
    ///
    /// One value applies to every side. Two values are `vertical
    /// horizontal`. With three values the last one is repeated for the
    /// left side. An empty string gives zero margins.
    pub fn parse(s: &str) -> Result<Self, GridError> {
        let values = s
            .split_whitespace()
            .map(parse_length)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match values.as_slice() {
            [] => Self::ZERO,
            [a] => Self::uniform(*a),
            [v, h] => Self::new(*v, *h, *v, *h),
            [t, r, b] => Self::new(*t, *r, *b, *b),
            [t, r, b, l] => Self::new(*t, *r, *b, *l),
            _ => return Err(GridError::InvalidLength(String::from(s))),
        })
    }

    /// Whether every side is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.top, self.right, self.bottom, self.left]
            .iter()
            .all(|m| m.is_finite() && *m >= 0.0)
    }
}
