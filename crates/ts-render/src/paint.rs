//! Vello backend: encodes primitives into a `vello::Scene`.
//!
//! The caller owns the scene and presents it via wgpu. Gradients are painted
//! with their first stop.

use crate::target::{Brush, DrawTarget, LineCap, Shadow, StrokeStyle};
use kurbo::{Affine, BezPath, Cap, Rect, Stroke};
use peniko::{Color as PenikoColor, Fill};
use ts_core::Color;
use vello::Scene;

fn to_peniko(color: Color) -> PenikoColor {
    let [r, g, b, a] = color.to_rgba8();
    PenikoColor::from_rgba8(r, g, b, a)
}

fn map_cap(cap: LineCap) -> Cap {
    match cap {
        LineCap::Butt => Cap::Butt,
        LineCap::Round => Cap::Round,
        LineCap::Square => Cap::Square,
    }
}

pub struct VelloTarget<'s> {
    scene: &'s mut Scene,
    shadow: Option<Shadow>,
}

impl<'s> VelloTarget<'s> {
    pub fn new(scene: &'s mut Scene) -> Self {
        Self {
            scene,
            shadow: None,
        }
    }
}

impl DrawTarget for VelloTarget<'_> {
    /// Scenes are rebuilt per frame; a clear discards everything encoded so
    /// far, whatever the rectangle.
    fn clear_rect(&mut self, _transform: Affine, _rect: Rect) {
        self.scene.reset();
    }

    fn fill_rect(&mut self, transform: Affine, rect: Rect, brush: &Brush) {
        if let Some(shadow) = self.shadow
            && shadow.color.a > 0.0
        {
            self.scene.draw_blurred_rounded_rect(
                Affine::translate(shadow.offset) * transform,
                rect,
                to_peniko(shadow.color),
                0.0,
                shadow.blur / 2.0,
            );
        }
        let color = to_peniko(brush.fallback_color());
        self.scene.fill(Fill::NonZero, transform, color, None, &rect);
    }

    fn fill_path(&mut self, transform: Affine, path: &BezPath, brush: &Brush) {
        let color = to_peniko(brush.fallback_color());
        self.scene.fill(Fill::NonZero, transform, color, None, path);
    }

    fn stroke_path(&mut self, transform: Affine, path: &BezPath, style: &StrokeStyle) {
        let mut stroke = Stroke::new(style.width).with_caps(map_cap(style.cap));
        if !style.dash.is_empty() {
            stroke = stroke.with_dashes(0.0, style.dash.iter().copied());
        }
        self.scene
            .stroke(&stroke, transform, to_peniko(style.color), None, path);
    }

    fn set_shadow(&mut self, shadow: Option<&Shadow>) {
        self.shadow = shadow.copied();
    }
}
