//! SVG backend and static export.

use crate::overlay::OverlayRenderer;
use crate::renderer::SchemeRenderer;
use crate::target::{Brush, DrawTarget, GradientStop, Shadow, StrokeStyle};
use kurbo::{Affine, BezPath, Rect};
use rand::Rng;
use std::fmt::Write as _;
use ts_core::{LiveItem, Scene, ViewTransform};

/// Margin around the exported layout, in output pixels.
const EXPORT_PADDING: f64 = 16.0;

fn matrix(transform: Affine) -> String {
    let [a, b, c, d, e, f] = transform.as_coeffs();
    format!("matrix({a} {b} {c} {d} {e} {f})")
}

fn stops_svg(out: &mut String, stops: &[GradientStop]) {
    for stop in stops {
        let _ = write!(
            out,
            "<stop offset=\"{}\" stop-color=\"{}\"/>",
            stop.offset,
            stop.color.to_css()
        );
    }
}

/// Accumulates primitives into an SVG document.
pub struct SvgTarget {
    width: f64,
    height: f64,
    defs: String,
    body: String,
    gradients: usize,
    shadows: Vec<Shadow>,
    active_shadow: Option<usize>,
}

impl SvgTarget {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            defs: String::new(),
            body: String::new(),
            gradients: 0,
            shadows: Vec::new(),
            active_shadow: None,
        }
    }

    /// Close the document.
    pub fn finish(self) -> String {
        let (width, height) = (self.width, self.height);
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\n"
        );
        if !self.defs.is_empty() {
            svg.push_str("<defs>\n");
            svg.push_str(&self.defs);
            svg.push_str("</defs>\n");
        }
        svg.push_str(&self.body);
        svg.push_str("</svg>");
        svg
    }

    /// `fill="…"` value for `brush`, defining a gradient when needed.
    /// Gradient coordinates are in the shape's user space.
    fn paint(&mut self, brush: &Brush) -> String {
        let id = format!("g{}", self.gradients);
        match brush {
            Brush::Solid(color) => return color.to_css(),
            Brush::LinearGradient { start, end, stops } => {
                let _ = write!(
                    self.defs,
                    "<linearGradient id=\"{id}\" gradientUnits=\"userSpaceOnUse\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\">",
                    start.x, start.y, end.x, end.y
                );
                stops_svg(&mut self.defs, stops);
                self.defs.push_str("</linearGradient>\n");
            }
            Brush::RadialGradient {
                center,
                radius,
                stops,
            } => {
                let _ = write!(
                    self.defs,
                    "<radialGradient id=\"{id}\" gradientUnits=\"userSpaceOnUse\" cx=\"{}\" cy=\"{}\" r=\"{radius}\">",
                    center.x, center.y
                );
                stops_svg(&mut self.defs, stops);
                self.defs.push_str("</radialGradient>\n");
            }
        }
        self.gradients += 1;
        format!("url(#{id})")
    }

    /// Append one element. A shadowed element is wrapped in an untransformed
    /// group carrying the filter, so the shadow offset stays in output units.
    fn push_element(&mut self, element: &str) {
        let _ = match self.active_shadow {
            Some(index) => writeln!(self.body, "<g filter=\"url(#shadow{index})\">{element}</g>"),
            None => writeln!(self.body, "{element}"),
        };
    }
}

impl DrawTarget for SvgTarget {
    /// Documents start empty; nothing to clear.
    fn clear_rect(&mut self, _transform: Affine, _rect: Rect) {}

    fn fill_rect(&mut self, transform: Affine, rect: Rect, brush: &Brush) {
        let fill = self.paint(brush);
        let element = format!(
            "<rect transform=\"{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{fill}\"/>",
            matrix(transform),
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height()
        );
        self.push_element(&element);
    }

    fn fill_path(&mut self, transform: Affine, path: &BezPath, brush: &Brush) {
        let fill = self.paint(brush);
        let element = format!(
            "<path transform=\"{}\" d=\"{}\" fill=\"{fill}\"/>",
            matrix(transform),
            path.to_svg()
        );
        self.push_element(&element);
    }

    fn stroke_path(&mut self, transform: Affine, path: &BezPath, style: &StrokeStyle) {
        let mut dash = String::new();
        if !style.dash.is_empty() {
            let pattern: Vec<String> = style.dash.iter().map(f64::to_string).collect();
            dash = format!(" stroke-dasharray=\"{}\"", pattern.join(" "));
        }
        let _ = writeln!(
            self.body,
            "<path transform=\"{}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"{}\"{dash}/>",
            matrix(transform),
            path.to_svg(),
            style.color.to_css(),
            style.width,
            style.cap.as_str()
        );
    }

    fn set_shadow(&mut self, shadow: Option<&Shadow>) {
        let Some(shadow) = shadow else {
            self.active_shadow = None;
            return;
        };
        if shadow.color.a <= 0.0 {
            self.active_shadow = None;
            return;
        }
        let index = match self.shadows.iter().position(|known| known == shadow) {
            Some(index) => index,
            None => {
                let index = self.shadows.len();
                let _ = writeln!(
                    self.defs,
                    "<filter id=\"shadow{index}\" filterUnits=\"userSpaceOnUse\"><feDropShadow dx=\"{}\" dy=\"{}\" stdDeviation=\"{}\" flood-color=\"{}\"/></filter>",
                    shadow.offset.x,
                    shadow.offset.y,
                    shadow.blur / 2.0,
                    shadow.color.to_css()
                );
                self.shadows.push(*shadow);
                index
            }
        };
        self.active_shadow = Some(index);
    }
}

// ─── Export ──────────────────────────────────────────────────────────────

/// Render the scene and the overlay into a standalone SVG document framed on
/// the placed pieces (or the whole layout when it has none).
pub fn render_svg<R: Rng>(
    renderer: &mut SchemeRenderer<R>,
    overlay: &OverlayRenderer,
    scene: &Scene,
    live: &[LiveItem],
    view: ViewTransform,
) -> String {
    let world = view.world_affine(scene.frame());
    let frame = scene.frame();
    let visible = match scene.world_bounds() {
        Some(bounds) => world
            .transform_rect_bbox(bounds)
            .inflate(EXPORT_PADDING, EXPORT_PADDING),
        None => Rect::new(0.0, 0.0, frame.width * view.scale, frame.height * view.scale),
    };

    let mut target = SvgTarget::new(visible.width().ceil(), visible.height().ceil());
    let base = Affine::translate(-visible.origin().to_vec2());
    let stats = renderer.paint(&mut target, base, visible, scene, view);
    let indicators = overlay.paint(&mut target, base, visible, scene, live, view);
    log::debug!(
        "exported {} pieces and {indicators} indicators to SVG",
        stats.pieces
    );
    target.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use kurbo::{Point, Vec2};
    use smallvec::smallvec;
    use std::rc::Rc;
    use ts_core::{Color, ItemId, LayoutDescription, PlacedItem, SceneBuilder, SchemeConfig};

    #[test]
    fn gradients_and_shadows_become_defs() {
        let mut svg = SvgTarget::new(100.0, 50.0);
        let shadow = Shadow {
            color: Color::rgba8(0, 0, 0, 179),
            blur: 4.0,
            offset: Vec2::new(1.5, 1.5),
        };
        svg.set_shadow(Some(&shadow));
        svg.fill_rect(Affine::IDENTITY, Rect::new(0.0, 0.0, 10.0, 10.0), &Color::BLACK.into());
        svg.set_shadow(None);
        svg.set_shadow(Some(&shadow));
        svg.set_shadow(None);
        svg.fill_rect(
            Affine::translate((5.0, 5.0)),
            Rect::new(0.0, 0.0, 10.0, 10.0),
            &Brush::LinearGradient {
                start: Point::new(0.0, 0.0),
                end: Point::new(0.0, 10.0),
                stops: smallvec![
                    GradientStop::new(0.0, Color::BLACK),
                    GradientStop::new(1.0, Color::rgb8(0x33, 0x33, 0x33)),
                ],
            },
        );
        let doc = svg.finish();

        assert!(doc.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"100\""));
        assert_eq!(doc.matches("<filter ").count(), 1);
        assert_eq!(doc.matches("filter=\"url(#shadow0)\"").count(), 1);
        assert!(doc.contains("<g filter=\"url(#shadow0)\"><rect transform="));
        assert!(doc.contains("<linearGradient id=\"g0\""));
        assert!(doc.contains("fill=\"url(#g0)\""));
        assert!(doc.contains("matrix(1 0 0 1 5 5)"));
        assert!(doc.ends_with("</svg>"));
    }

    #[test]
    fn shadow_offset_ignores_the_element_transform() {
        let mut svg = SvgTarget::new(100.0, 100.0);
        let shadow = Shadow {
            color: Color::rgba8(0, 0, 0, 179),
            blur: 4.0,
            offset: Vec2::new(1.5, 1.5),
        };
        svg.set_shadow(Some(&shadow));
        // Scaled, rotated and Y-flipped like a tie on the track surface.
        let tie = Affine::scale_non_uniform(3.0, -3.0) * Affine::rotate(0.7);
        svg.fill_rect(tie, Rect::new(0.0, 0.0, 10.0, 10.0), &Color::BLACK.into());
        svg.set_shadow(None);
        let doc = svg.finish();

        // The filter sits on a group without a transform of its own.
        let group = doc
            .lines()
            .find(|line| line.starts_with("<g "))
            .unwrap();
        let (open, element) = group.split_once('>').unwrap();
        assert_eq!(open, "<g filter=\"url(#shadow0)\"");
        assert!(!open.contains("transform"));
        assert!(element.starts_with("<rect transform=\"matrix("));
        assert!(!element.contains("filter"));
        assert!(doc.contains("dx=\"1.5\" dy=\"1.5\""));
    }

    #[test]
    fn export_frames_the_placed_pieces() {
        let layout = Rc::new(LayoutDescription {
            width: 2000.0,
            height: 1000.0,
            offset_x: 0.0,
            offset_y: 0.0,
            items: vec![PlacedItem {
                id: ItemId::intern("export-1"),
                kind: "G119".to_string(),
                x: 100.0,
                y: 100.0,
                angle: 0.0,
            }],
        });
        let scene = SceneBuilder::default().build(&layout);
        let mut renderer = SchemeRenderer::new(Theme::default(), SchemeConfig::default(), 1);
        let overlay = OverlayRenderer::new(Theme::default());

        let doc = render_svg(&mut renderer, &overlay, &scene, &[], ViewTransform::new(1.0));
        // 119 long plus a tie overhang on each end and the padding.
        let width: f64 = doc
            .split("width=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .and_then(|w| w.parse().ok())
            .unwrap();
        assert!(width > 119.0 && width < 200.0, "width {width}");
        assert_eq!(doc.matches("stroke-dasharray=\"1 3\"").count(), 1);
    }
}
