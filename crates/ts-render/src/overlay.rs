//! Live-state overlay: switch position indicators.
//!
//! Drawn on its own surface above the track and redrawn on every poll. Only
//! live items of a state-visualizable type whose id is placed on the layout
//! and whose piece has an indicator produce output.

use crate::painter::Painter;
use crate::target::{DrawTarget, StrokeStyle};
use crate::theme::Theme;
use kurbo::{Affine, BezPath, Rect, Vec2};
use ts_core::catalog::{StraightShape, SwitchIndicator};
use ts_core::{LiveItem, Scene, SurfaceMetrics, SwitchState, ViewTransform};

/// Rail spacing of the indicator, whatever the piece underneath.
pub const INDICATOR_GAUGE: f64 = 16.5;
pub const INDICATOR_WIDTH: f64 = 2.0;

pub struct OverlayRenderer {
    theme: Theme,
}

impl OverlayRenderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Draw onto a mounted surface. Returns the number of indicators drawn.
    pub fn draw<T: DrawTarget + ?Sized>(
        &self,
        target: &mut T,
        surface: &SurfaceMetrics,
        scene: &Scene,
        live: &[LiveItem],
        view: ViewTransform,
    ) -> usize {
        let visible = Rect::new(0.0, 0.0, surface.width, surface.height);
        self.paint(target, Affine::scale(surface.dpr), visible, scene, live, view)
    }

    /// Draw the region `visible` (logical units) through `base`.
    pub fn paint<T: DrawTarget + ?Sized>(
        &self,
        target: &mut T,
        base: Affine,
        visible: Rect,
        scene: &Scene,
        live: &[LiveItem],
        view: ViewTransform,
    ) -> usize {
        let mut painter = Painter::new(target, base);
        painter.clear_rect(visible);

        let mut world = painter.push();
        world.concat(view.world_affine(scene.frame()));

        let style = StrokeStyle::solid(INDICATOR_WIDTH, self.theme.indicator);
        let mut drawn = 0;
        for item in live.iter().filter(|item| item.item_type.is_state_visualizable()) {
            let Some(piece) = scene.piece_for(item.id) else {
                log::debug!("live item {} has no placement", item.id);
                continue;
            };
            let Some(indicator) = piece.geometry.switch_indicator() else {
                continue;
            };

            let mut frame = world.push();
            frame.translate((piece.item.x, piece.item.y)).rotate(piece.item.angle);
            frame.stroke_path(&indicator_path(&indicator, item.switch_state()), &style);
            drawn += 1;
        }
        drawn
    }
}

/// Rails of the route a switch currently sets. Diverging: the straight lead
/// followed by the branch from its end. Normal: the branch from the origin.
pub fn indicator_path(indicator: &SwitchIndicator, state: SwitchState) -> BezPath {
    let mut path = BezPath::new();
    let branch_offset = match state {
        SwitchState::Diverging => {
            let lead = StraightShape::new(indicator.lead_length, 0);
            for rail in lead.rails(INDICATOR_GAUGE) {
                path.extend(rail.to_bez().elements().iter().copied());
            }
            Vec2::new(indicator.lead_length, 0.0)
        }
        SwitchState::Normal => Vec2::ZERO,
    };
    for rail in indicator.branch.rails(INDICATOR_GAUGE) {
        path.extend(rail.translated(branch_offset).to_bez().elements().iter().copied());
    }
    path
}
