//! SVG preview of a grid layout.
//!
//! Draws the container, its usable interior, every cell of the plan and
//! the crop marks into a single panel, with a caption summarizing the plan.
//!
//! # Example
//!
//! ```
//! use regrid::{Bounds, CropMarks, GridLayout, svg::render_layout_svg};
//!
//! let artboard = Bounds::new(0.0, 792.0, 612.0, 0.0);
//! let plan = GridLayout::fit()
//!     .compute(Bounds::new(0.0, 0.0, 144.0, -72.0), Some(artboard))
//!     .unwrap();
//! let crop = CropMarks::default();
//! let marks = crop.generate(&plan).unwrap();
//!
//! let svg = render_layout_svg(&plan, Some(artboard), &marks, crop.color);
//! assert!(svg.starts_with("<svg"));
//! ```

use alloc::format;
use alloc::string::String;

use crate::color::MarkColor;
use crate::geometry::Bounds;
use crate::layout::LayoutPlan;
use crate::marks::MarkSegment;

/// Maximum drawing width in SVG pixels.
const MAX_PANEL_W: f64 = 480.0;
/// Maximum drawing height in SVG pixels.
const MAX_PANEL_H: f64 = 480.0;
/// Space around the drawing.
const MARGIN: f64 = 30.0;
/// Height of the caption above the drawing.
const LABEL_H: f64 = 22.0;

/// Maps document points (y up) into panel pixels (y down).
struct Viewport {
    scene: Bounds,
    scale: f64,
}

impl Viewport {
    fn new(scene: Bounds) -> Self {
        let w = scene.width();
        let h = scene.height();
        let scale = if w > 0.0 && h > 0.0 {
            (MAX_PANEL_W / w).min(MAX_PANEL_H / h)
        } else {
            1.0
        };
        Self { scene, scale }
    }

    fn x(&self, x: f64) -> f64 {
        MARGIN + (x - self.scene.left) * self.scale
    }

    fn y(&self, y: f64) -> f64 {
        MARGIN + LABEL_H + (self.scene.top - y) * self.scale
    }

    fn width(&self) -> f64 {
        self.scene.width() * self.scale
    }

    fn height(&self) -> f64 {
        self.scene.height() * self.scale
    }

    fn rect(&self, svg: &mut String, b: Bounds, class: &str) {
        svg.push_str(&format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" class="{class}"/>"#,
            self.x(b.left),
            self.y(b.top),
            b.width() * self.scale,
            b.height() * self.scale
        ));
        svg.push('\n');
    }
}

/// Render a complete SVG document previewing `plan`.
///
/// `container` is drawn when given, along with the interior the plan was
/// placed in. `marks` are usually the output of
/// [`CropMarks::generate`](crate::CropMarks::generate) for the same plan,
/// stroked with an sRGB approximation of `mark_color`.
pub fn render_layout_svg(
    plan: &LayoutPlan,
    container: Option<Bounds>,
    marks: &[MarkSegment],
    mark_color: MarkColor,
) -> String {
    let mut scene = plan.bounds();
    if let Some(c) = container {
        scene = scene.union(c);
    }
    for m in marks {
        scene = scene.union(Bounds::new(
            m.from.x.min(m.to.x),
            m.from.y.max(m.to.y),
            m.from.x.max(m.to.x),
            m.from.y.min(m.to.y),
        ));
    }
    let view = Viewport::new(scene);

    let total_w = view.width() + 2.0 * MARGIN;
    let total_h = view.height() + 2.0 * MARGIN + LABEL_H;

    let mut svg = String::with_capacity(4096);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {:.1} {:.1}">"#,
        total_w as u32, total_h as u32, total_w, total_h
    ));
    svg.push('\n');

    // Light/dark mode via prefers-color-scheme
    svg.push_str(
        r##"<style>
  text { font-family: "Consolas", "DejaVu Sans Mono", "Courier New", monospace; }
  .label { font-size: 13px; font-weight: bold; fill: #333; }
  .container { fill: #f4f4f4; stroke: #999; stroke-width: 1; }
  .interior { fill: none; stroke: #bbb; stroke-width: 1; stroke-dasharray: 4,2; }
  .cell { fill: #6ba3d6; stroke: #2c6faa; stroke-width: 1; }
  .mark { stroke-width: 0.75; }
  @media (prefers-color-scheme: dark) {
    .label { fill: #e0e0e0; }
    .container { fill: #2d2d2d; stroke: #555; }
    .interior { stroke: #666; }
    .cell { fill: #3a72a4; stroke: #5a9fd4; }
  }
</style>
"##,
    );

    let caption = format!(
        "{}×{} {:?}  cells {:.1}×{:.1} pt",
        plan.columns, plan.rows, plan.orientation, plan.cell_size.width, plan.cell_size.height
    );
    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" class="label" text-anchor="middle">{}</text>"#,
        total_w / 2.0,
        MARGIN + 14.0,
        escape_xml(&caption)
    ));
    svg.push('\n');

    if let Some(c) = container {
        view.rect(&mut svg, c, "container");
    }
    if let Some(interior) = plan.interior {
        view.rect(&mut svg, interior, "interior");
    }
    for cell in &plan.cells {
        view.rect(&mut svg, plan.cell_bounds(cell), "cell");
    }
    if !marks.is_empty() {
        let [r, g, b] = mark_color.to_rgb();
        svg.push_str(&format!(r##"<g stroke="#{r:02x}{g:02x}{b:02x}">"##));
        svg.push('\n');
        for m in marks {
            svg.push_str(&format!(
                r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" class="mark"/>"#,
                view.x(m.from.x),
                view.y(m.from.y),
                view.x(m.to.x),
                view.y(m.to.y)
            ));
            svg.push('\n');
        }
        svg.push_str("</g>\n");
    }

    svg.push_str("</svg>\n");
    svg
}

/// Escape special characters for XML text content.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Align, GridLayout, Gutter};
    use crate::marks::{CropMarks, MarkPosition};
    use crate::units::Margins;

    fn plan() -> LayoutPlan {
        GridLayout::new(3, 2)
            .gutter(Gutter::uniform(10.0))
            .compute(Bounds::new(0.0, 0.0, 100.0, -50.0), None)
            .unwrap()
    }

    #[test]
    fn svg_has_one_rect_per_cell() {
        let svg = render_layout_svg(&plan(), None, &[], MarkColor::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));
        assert_eq!(svg.matches(r#"class="cell""#).count(), 6);
        assert!(svg.contains("3×2 Landscape"));
    }

    #[test]
    fn svg_draws_container_and_marks() {
        let container = Bounds::new(-50.0, 50.0, 400.0, -200.0);
        let p = GridLayout::new(3, 2)
            .gutter(Gutter::uniform(10.0))
            .margins(Margins::uniform(5.0))
            .align(Align::Center)
            .compute(Bounds::new(0.0, 0.0, 100.0, -50.0), Some(container))
            .unwrap();
        let marks = CropMarks::new(10.0)
            .position(MarkPosition::Relative)
            .generate(&p)
            .unwrap();
        let svg = render_layout_svg(&p, Some(container), &marks, MarkColor::REGISTRATION);
        assert!(svg.contains(r#"class="container""#));
        assert!(svg.contains(r#"class="interior""#));
        assert_eq!(svg.matches(r#"class="mark""#).count(), marks.len());
        assert!(svg.contains(r##"<g stroke="#000000">"##));
    }

    #[test]
    fn marks_use_their_color() {
        let p = plan();
        let marks = CropMarks::new(10.0).generate(&p).unwrap();
        let svg = render_layout_svg(&p, None, &marks, MarkColor::Cmyk([0.0, 100.0, 100.0, 0.0]));
        assert!(svg.contains(r##"<g stroke="#ff0000">"##), "{svg}");

        let svg = render_layout_svg(&p, None, &marks, MarkColor::Rgb([0x12, 0xab, 0x05]));
        assert!(svg.contains(r##"<g stroke="#12ab05">"##), "{svg}");
    }

    #[test]
    fn scene_top_left_maps_to_margin() {
        let svg = render_layout_svg(&plan(), None, &[], MarkColor::default());
        // First cell is the top-left of the scene.
        let expected = format!(r#"<rect x="{MARGIN:.1}" y="{:.1}""#, MARGIN + LABEL_H);
        assert!(svg.contains(&expected), "{svg}");
    }

    #[test]
    fn escape() {
        assert_eq!(escape_xml(r#"a<b>&"c""#), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
