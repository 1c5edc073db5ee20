//! `CanvasRenderingContext2d` backend.
//!
//! Every primitive sets the context transform from the painter's composed
//! affine, so no save/restore bookkeeping is left on the context between
//! calls. Canvas errors are swallowed: a failed call draws nothing.

use kurbo::{Affine, BezPath, PathEl, Rect};
use ts_render::{Brush, DrawTarget, GradientStop, Shadow, StrokeStyle};
use web_sys::{CanvasGradient, CanvasRenderingContext2d};

pub struct CanvasTarget<'c> {
    ctx: &'c CanvasRenderingContext2d,
}

impl<'c> CanvasTarget<'c> {
    pub fn new(ctx: &'c CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    fn set_transform(&self, transform: Affine) {
        let [a, b, c, d, e, f] = transform.as_coeffs();
        let _ = self.ctx.set_transform(a, b, c, d, e, f);
    }

    fn trace_path(&self, path: &BezPath) {
        let ctx = self.ctx;
        ctx.begin_path();
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => ctx.move_to(p.x, p.y),
                PathEl::LineTo(p) => ctx.line_to(p.x, p.y),
                PathEl::QuadTo(c, p) => ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
                PathEl::CurveTo(c1, c2, p) => ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
                PathEl::ClosePath => ctx.close_path(),
            }
        }
    }

    fn set_fill(&self, brush: &Brush) {
        let gradient = match brush {
            Brush::Solid(color) => {
                self.ctx.set_fill_style_str(&color.to_css());
                return;
            }
            Brush::LinearGradient { start, end, stops } => {
                let gradient = self.ctx.create_linear_gradient(start.x, start.y, end.x, end.y);
                add_stops(&gradient, stops);
                gradient
            }
            Brush::RadialGradient {
                center,
                radius,
                stops,
            } => match self
                .ctx
                .create_radial_gradient(center.x, center.y, 0.0, center.x, center.y, *radius)
            {
                Ok(gradient) => {
                    add_stops(&gradient, stops);
                    gradient
                }
                Err(_) => {
                    self.ctx.set_fill_style_str(&brush.fallback_color().to_css());
                    return;
                }
            },
        };
        self.ctx.set_fill_style_canvas_gradient(&gradient);
    }
}

fn add_stops(gradient: &CanvasGradient, stops: &[GradientStop]) {
    for stop in stops {
        let _ = gradient.add_color_stop(stop.offset as f32, &stop.color.to_css());
    }
}

impl DrawTarget for CanvasTarget<'_> {
    fn clear_rect(&mut self, transform: Affine, rect: Rect) {
        self.set_transform(transform);
        self.ctx.clear_rect(rect.x0, rect.y0, rect.width(), rect.height());
    }

    fn fill_rect(&mut self, transform: Affine, rect: Rect, brush: &Brush) {
        self.set_transform(transform);
        self.set_fill(brush);
        self.ctx.fill_rect(rect.x0, rect.y0, rect.width(), rect.height());
    }

    fn fill_path(&mut self, transform: Affine, path: &BezPath, brush: &Brush) {
        self.set_transform(transform);
        self.set_fill(brush);
        self.trace_path(path);
        self.ctx.fill();
    }

    fn stroke_path(&mut self, transform: Affine, path: &BezPath, style: &StrokeStyle) {
        self.set_transform(transform);
        self.ctx.set_stroke_style_str(&style.color.to_css());
        self.ctx.set_line_width(style.width);
        self.ctx.set_line_cap(style.cap.as_str());
        let dash = js_sys::Array::new();
        for segment in &style.dash {
            dash.push(&(*segment).into());
        }
        let _ = self.ctx.set_line_dash(&dash);
        self.trace_path(path);
        self.ctx.stroke();
    }

    fn set_shadow(&mut self, shadow: Option<&Shadow>) {
        match shadow {
            Some(shadow) => {
                self.ctx.set_shadow_blur(shadow.blur);
                self.ctx.set_shadow_offset_x(shadow.offset.x);
                self.ctx.set_shadow_offset_y(shadow.offset.y);
                self.ctx.set_shadow_color(&shadow.color.to_css());
            }
            None => {
                self.ctx.set_shadow_blur(0.0);
                self.ctx.set_shadow_offset_x(0.0);
                self.ctx.set_shadow_offset_y(0.0);
                self.ctx.set_shadow_color("transparent");
            }
        }
    }
}
