//! Crop mark stroke colors.
//!
//! Values stay in the color space the host document uses; only the SVG
//! preview needs an sRGB approximation ([`MarkColor::to_rgb`]).

use num_traits::Float;

/// Stroke color for crop marks.
///
/// CMYK and gray components are ink percentages (0 to 100), so
/// `Gray(100.0)` is solid black. RGB channels are 0 to 255.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarkColor {
    Cmyk([f64; 4]),
    Rgb([u8; 3]),
    Gray(f64),
}

impl Default for MarkColor {
    fn default() -> Self {
        Self::REGISTRATION
    }
}

impl MarkColor {
    /// Full coverage on every plate, so the marks print on all separations.
    pub const REGISTRATION: Self = Self::Cmyk([100.0; 4]);

    /// Whether every component is finite and in range.
    pub fn is_valid(&self) -> bool {
        let percent = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        match *self {
            Self::Cmyk(values) => values.iter().all(|&v| percent(v)),
            Self::Rgb(_) => true,
            Self::Gray(v) => percent(v),
        }
    }

    /// Approximate sRGB for previews. Uncalibrated: ink percentages are
    /// inverted and multiplied, with no profile involved.
    pub fn to_rgb(&self) -> [u8; 3] {
        let channel = |coverage: f64| -> u8 {
            let v = Float::round(255.0 * (1.0 - coverage.clamp(0.0, 1.0)));
            v as u8
        };
        match *self {
            Self::Rgb(rgb) => rgb,
            Self::Gray(g) => [channel(g / 100.0); 3],
            Self::Cmyk([c, m, y, k]) => {
                let k = k.clamp(0.0, 100.0) / 100.0;
                let ink = |v: f64| 1.0 - (1.0 - v.clamp(0.0, 100.0) / 100.0) * (1.0 - k);
                [channel(ink(c)), channel(ink(m)), channel(ink(y))]
            }
        }
    }

    /// Parse a color value.
    ///
    /// Accepts:
    /// - `registration`
    /// - `cmyk(c, m, y, k)` with ink percentages
    /// - `rgb(r, g, b)` with 0 to 255 channels
    /// - `gray(g)` with an ink percentage
    /// - `#RGB` / `#RRGGBB`, `#` optional
    ///
    /// Components may be separated by commas or spaces.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("registration") {
            return Some(Self::REGISTRATION);
        }
        if let Some((name, args)) = function_call(s) {
            let is = |n: &str| name.eq_ignore_ascii_case(n);
            let color = if is("cmyk") {
                Self::Cmyk(components::<4>(args)?)
            } else if is("rgb") {
                let [r, g, b] = components::<3>(args)?;
                Self::Rgb([byte(r)?, byte(g)?, byte(b)?])
            } else if is("gray") || is("grey") {
                let [g] = components::<1>(args)?;
                Self::Gray(g)
            } else {
                return None;
            };
            return color.is_valid().then_some(color);
        }
        parse_hex(s.strip_prefix('#').unwrap_or(s)).map(Self::Rgb)
    }
}

/// Split `name(args)` into its parts.
fn function_call(s: &str) -> Option<(&str, &str)> {
    let (name, rest) = s.split_once('(')?;
    let args = rest.trim_end().strip_suffix(')')?;
    Some((name.trim(), args))
}

/// Exactly `N` numbers separated by commas and/or spaces.
fn components<const N: usize>(args: &str) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    let mut parts = args
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty());
    for slot in &mut out {
        *slot = parts.next()?.parse().ok()?;
    }
    parts.next().is_none().then_some(out)
}

fn byte(v: f64) -> Option<u8> {
    ((0.0..=255.0).contains(&v) && Float::fract(v) == 0.0).then_some(v as u8)
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    let d = hex.as_bytes();
    let pair = |hi: u8, lo: u8| Some(hex_val(hi)? << 4 | hex_val(lo)?);
    match *d {
        // #abc → #aabbcc
        [r, g, b] => Some([pair(r, r)?, pair(g, g)?, pair(b, b)?]),
        [r1, r0, g1, g0, b1, b0] => Some([pair(r1, r0)?, pair(g1, g0)?, pair(b1, b0)?]),
        _ => None,
    }
}

fn hex_val(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}
