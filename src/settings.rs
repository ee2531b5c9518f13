//! Flat `key=value` settings for layout and regrid passes.
//!
//! Pairs are separated by `&`, `;` or newlines. Keys are case-insensitive.
//! Lengths take a unit suffix (`pt px pc in mm cm`); a bare number is in
//! inches. Parsing never fails: anything that cannot be used is reported as
//! a [`ParseWarning`] and the default is kept.
//!
//! # Example
//!
//! ```
//! use regrid::settings;
//!
//! let result = settings::parse("columns=3; rows=2; gutter=5mm; marks=true");
//! assert!(result.warnings.is_empty());
//!
//! let config = result.config;
//! assert_eq!((config.layout.columns, config.layout.rows), (3, 2));
//! assert!(config.marks.is_some());
//! ```
//!
//! # Keys
//!
//! | Key | Value |
//! |---|---|
//! | `columns`, `rows` | positive integer |
//! | `gutter`, `gutter.columns`, `gutter.rows` | length |
//! | `margin` | 1 to 4 lengths, `top right bottom left` |
//! | `align` | `none`, `center`, `topleft` … `bottomright` |
//! | `fit` | bool |
//! | `marks` | bool |
//! | `marks.size`, `marks.offset`, `marks.weight` | length |
//! | `marks.position` | `absolute` or `relative` |
//! | `marks.color` | `registration`, `cmyk(c,m,y,k)`, `rgb(r,g,b)`, `gray(g)` or `#rrggbb` |
//! | `bounds` | `geometric` or `visible` |
//! | `tolerance` | non-negative factor of the mean item size |
//! | `merge` | `pairwise` or `centroid` |
//! | `normalize` | `none`, `columns`, `rows` or `both` |
//! | `group` | `none`, `columns` or `rows` |
//!
//! Any `marks.*` key turns crop marks on unless `marks=false` is given.

use alloc::string::String;
use alloc::vec::Vec;

use crate::cluster::MergeStrategy;
use crate::color::MarkColor;
use crate::layout::{Align, GridLayout, Gutter};
use crate::marks::{CropMarks, MarkPosition};
use crate::pass::{Grouping, RegridOptions};
use crate::surface::BoundsKind;
use crate::units::{Margins, parse_length};

/// Everything a settings string can configure.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    pub layout: GridLayout,
    /// Crop marks, when enabled.
    pub marks: Option<CropMarks>,
    pub regrid: RegridOptions,
}

/// Result of parsing a settings string.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub config: LayoutConfig,
    /// Non-fatal problems, in input order.
    pub warnings: Vec<ParseWarning>,
}

/// Non-fatal warning from settings parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A key appeared more than once (last value wins).
    DuplicateKey { key: String, value: String },
    /// The key is not a known setting.
    KeyNotRecognized { key: String, value: String },
    /// The key is known but its value could not be used.
    ValueInvalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Parse a settings string.
pub fn parse(text: &str) -> ParseResult {
    let mut raw = RawSettings::default();
    let mut warnings = Vec::new();

    for pair in split_pairs(text) {
        let (key, value) = split_pair(pair);
        let key = key.trim().to_ascii_lowercase();
        dispatch_key(&key, value.trim(), &mut raw, &mut warnings);
    }

    ParseResult {
        config: raw.into_config(),
        warnings,
    }
}

/// Values as given, before defaults are filled in.
#[derive(Default)]
struct RawSettings {
    columns: Option<u32>,
    rows: Option<u32>,
    gutter: Option<f64>,
    gutter_columns: Option<f64>,
    gutter_rows: Option<f64>,
    margins: Option<Margins>,
    align: Option<Align>,
    fit: Option<bool>,
    marks: Option<bool>,
    mark_size: Option<f64>,
    mark_offset: Option<f64>,
    mark_weight: Option<f64>,
    mark_position: Option<MarkPosition>,
    mark_color: Option<MarkColor>,
    bounds: Option<BoundsKind>,
    tolerance: Option<f64>,
    merge: Option<MergeStrategy>,
    normalize: Option<(bool, bool)>,
    group: Option<Grouping>,
}

impl RawSettings {
    fn into_config(self) -> LayoutConfig {
        let mut layout = GridLayout::default();
        if let Some(c) = self.columns {
            layout.columns = c;
        }
        if let Some(r) = self.rows {
            layout.rows = r;
        }
        let base = self.gutter.unwrap_or(0.0);
        layout.gutter = Gutter::new(
            self.gutter_columns.unwrap_or(base),
            self.gutter_rows.unwrap_or(base),
        );
        if let Some(m) = self.margins {
            layout.margins = m;
        }
        if let Some(fit) = self.fit {
            layout.fit_to_container = fit;
        }
        if let Some(a) = self.align {
            layout.align = a;
        }

        let any_mark_key = self.mark_size.is_some()
            || self.mark_offset.is_some()
            || self.mark_weight.is_some()
            || self.mark_position.is_some()
            || self.mark_color.is_some();
        let marks = self.marks.unwrap_or(any_mark_key).then(|| {
            let defaults = CropMarks::default();
            CropMarks {
                size: self.mark_size.unwrap_or(defaults.size),
                offset: self.mark_offset.unwrap_or(defaults.offset),
                position: self.mark_position.unwrap_or(defaults.position),
                stroke_width: self.mark_weight.unwrap_or(defaults.stroke_width),
                color: self.mark_color.unwrap_or(defaults.color),
            }
        });

        let mut regrid = RegridOptions::default();
        if let Some(kind) = self.bounds {
            regrid.bounds = kind;
        }
        if let Some(t) = self.tolerance {
            regrid.clusterer.tolerance_factor = t;
        }
        if let Some(m) = self.merge {
            regrid.clusterer.strategy = m;
        }
        if let Some((columns, rows)) = self.normalize {
            regrid = regrid.normalize(columns, rows);
        }
        if let Some(g) = self.group {
            regrid.grouping = g;
        }

        LayoutConfig {
            layout,
            marks,
            regrid,
        }
    }
}

const COUNT_REASON: &str = "expected a positive integer";
const BOOL_REASON: &str = "expected true|false|1|0|yes|no|on|off";
const LENGTH_REASON: &str = "expected a non-negative length such as 5mm, 0.25in or 12pt";

fn dispatch_key(key: &str, value: &str, raw: &mut RawSettings, warnings: &mut Vec<ParseWarning>) {
    let mut set = Setter { value, warnings };
    match key {
        "columns" => set.field(&mut raw.columns, parse_count(value), "columns", COUNT_REASON),
        "rows" => set.field(&mut raw.rows, parse_count(value), "rows", COUNT_REASON),
        "gutter" => set.field(&mut raw.gutter, parse_gap(value), "gutter", LENGTH_REASON),
        "gutter.columns" => set.field(
            &mut raw.gutter_columns,
            parse_gap(value),
            "gutter.columns",
            LENGTH_REASON,
        ),
        "gutter.rows" => {
            set.field(&mut raw.gutter_rows, parse_gap(value), "gutter.rows", LENGTH_REASON)
        }
        "margin" | "margins" => set.field(
            &mut raw.margins,
            Margins::parse(value).ok().filter(Margins::is_valid),
            "margin",
            "expected 1 to 4 non-negative lengths",
        ),
        "align" => set.field(
            &mut raw.align,
            parse_align(value),
            "align",
            "expected none|center|topleft|topcenter|topright|middleleft|middleright|bottomleft|bottomcenter|bottomright",
        ),
        "fit" => set.field(&mut raw.fit, parse_bool(value), "fit", BOOL_REASON),
        "marks" => set.field(&mut raw.marks, parse_bool(value), "marks", BOOL_REASON),
        "marks.size" => set.field(
            &mut raw.mark_size,
            parse_gap(value).filter(|&v| v > 0.0),
            "marks.size",
            "expected a positive length",
        ),
        "marks.offset" => {
            set.field(&mut raw.mark_offset, parse_gap(value), "marks.offset", LENGTH_REASON)
        }
        "marks.weight" => {
            set.field(&mut raw.mark_weight, parse_gap(value), "marks.weight", LENGTH_REASON)
        }
        "marks.color" => set.field(
            &mut raw.mark_color,
            MarkColor::parse(value),
            "marks.color",
            "expected registration, cmyk(c,m,y,k), rgb(r,g,b), gray(g) or #rrggbb",
        ),
        "marks.position" => set.field(
            &mut raw.mark_position,
            parse_mark_position(value),
            "marks.position",
            "expected absolute|relative",
        ),
        "bounds" => set.field(
            &mut raw.bounds,
            parse_bounds_kind(value),
            "bounds",
            "expected geometric|visible",
        ),
        "tolerance" => set.field(
            &mut raw.tolerance,
            value.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0),
            "tolerance",
            "expected a non-negative number",
        ),
        "merge" => set.field(
            &mut raw.merge,
            parse_merge(value),
            "merge",
            "expected pairwise|centroid",
        ),
        "normalize" => set.field(
            &mut raw.normalize,
            parse_normalize(value),
            "normalize",
            "expected none|columns|rows|both",
        ),
        "group" => set.field(
            &mut raw.group,
            parse_grouping(value),
            "group",
            "expected none|columns|rows",
        ),
        _ => set.unknown(key),
    }
}

/// Stores parsed values and records warnings for one pair.
struct Setter<'a> {
    value: &'a str,
    warnings: &'a mut Vec<ParseWarning>,
}

impl Setter<'_> {
    /// Set `field`, warning when the value is unusable or the key repeats.
    fn field<T>(
        &mut self,
        field: &mut Option<T>,
        parsed: Option<T>,
        key: &'static str,
        reason: &'static str,
    ) {
        let Some(v) = parsed else {
            self.warnings.push(ParseWarning::ValueInvalid {
                key,
                value: String::from(self.value),
                reason,
            });
            return;
        };
        if field.is_some() {
            self.warnings.push(ParseWarning::DuplicateKey {
                key: String::from(key),
                value: String::from(self.value),
            });
        }
        *field = Some(v);
    }

    fn unknown(&mut self, key: &str) {
        self.warnings.push(ParseWarning::KeyNotRecognized {
            key: String::from(key),
            value: String::from(self.value),
        });
    }
}

// ---- Value parsers ----

fn parse_count(s: &str) -> Option<u32> {
    s.parse::<u32>().ok().filter(|&v| v > 0)
}

fn parse_gap(s: &str) -> Option<f64> {
    parse_length(s).ok().filter(|&v| v >= 0.0)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Alignment names, ignoring `-`, `_` and spaces (`top-left` = `topleft`).
fn parse_align(s: &str) -> Option<Align> {
    let name: String = s
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect();
    Some(match name.as_str() {
        "none" => Align::None,
        "center" | "middlecenter" => Align::Center,
        "topleft" => Align::TopLeft,
        "topcenter" => Align::TopCenter,
        "topright" => Align::TopRight,
        "middleleft" => Align::MiddleLeft,
        "middleright" => Align::MiddleRight,
        "bottomleft" => Align::BottomLeft,
        "bottomcenter" => Align::BottomCenter,
        "bottomright" => Align::BottomRight,
        _ => return None,
    })
}

fn parse_mark_position(s: &str) -> Option<MarkPosition> {
    match s.to_ascii_lowercase().as_str() {
        "absolute" => Some(MarkPosition::Absolute),
        "relative" => Some(MarkPosition::Relative),
        _ => None,
    }
}

fn parse_bounds_kind(s: &str) -> Option<BoundsKind> {
    match s.to_ascii_lowercase().as_str() {
        "geometric" => Some(BoundsKind::Geometric),
        "visible" => Some(BoundsKind::Visible),
        _ => None,
    }
}

fn parse_merge(s: &str) -> Option<MergeStrategy> {
    match s.to_ascii_lowercase().as_str() {
        "pairwise" | "average" => Some(MergeStrategy::PairwiseAverage),
        "centroid" | "mean" => Some(MergeStrategy::Centroid),
        _ => None,
    }
}

fn parse_normalize(s: &str) -> Option<(bool, bool)> {
    match s.to_ascii_lowercase().as_str() {
        "none" => Some((false, false)),
        "columns" => Some((true, false)),
        "rows" => Some((false, true)),
        "both" => Some((true, true)),
        _ => None,
    }
}

fn parse_grouping(s: &str) -> Option<Grouping> {
    match s.to_ascii_lowercase().as_str() {
        "none" => Some(Grouping::None),
        "columns" => Some(Grouping::Columns),
        "rows" => Some(Grouping::Rows),
        _ => None,
    }
}

// ---- Tokenizer ----

/// Split on `&`, `;` and newlines, skipping blanks and `#` comment lines.
fn split_pairs(text: &str) -> impl Iterator<Item = &str> {
    text.split(['&', ';', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.starts_with('#'))
}

/// Split a single `key=value` pair on the first `=`.
fn split_pair(pair: &str) -> (&str, &str) {
    pair.split_once('=').unwrap_or((pair, ""))
}
