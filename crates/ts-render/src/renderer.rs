//! Track surface: grid plus every piece of the scene.
//!
//! Each pass clears the visible area, draws the reference grid in surface
//! units, then applies the Y-up world transform once and draws every piece
//! inside its own translate → rotate frame.

use crate::loco::draw_locomotive;
use crate::painter::Painter;
use crate::target::{DrawTarget, StrokeStyle};
use crate::theme::Theme;
use crate::track::{PieceStats, draw_piece};
use kurbo::{Affine, BezPath, Point, Rect};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ts_core::{GeometryPiece, Scene, SceneFrame, SchemeConfig, SurfaceMetrics, ViewTransform};

/// Regular gridlines closer than this many logical pixels are skipped.
const MIN_GRID_STEP: f64 = 4.0;

/// What one pass emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub pieces: usize,
    pub grid_lines: usize,
    pub sleepers: u32,
    pub rails: u32,
    pub locomotives: usize,
}

pub struct SchemeRenderer<R: Rng = StdRng> {
    theme: Theme,
    config: SchemeConfig,
    rng: R,
}

impl SchemeRenderer<StdRng> {
    /// Renderer with a seeded texture rng.
    pub fn new(theme: Theme, config: SchemeConfig, seed: u64) -> Self {
        Self::with_rng(theme, config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SchemeRenderer<R> {
    pub fn with_rng(theme: Theme, config: SchemeConfig, rng: R) -> Self {
        Self { theme, config, rng }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn set_config(&mut self, config: SchemeConfig) {
        self.config = config;
    }

    /// Draw onto a mounted surface.
    pub fn draw<T: DrawTarget + ?Sized>(
        &mut self,
        target: &mut T,
        surface: &SurfaceMetrics,
        scene: &Scene,
        view: ViewTransform,
    ) -> RenderStats {
        let visible = Rect::new(0.0, 0.0, surface.width, surface.height);
        self.paint(target, Affine::scale(surface.dpr), visible, scene, view)
    }

    /// Draw the region `visible` (logical units) through `base`.
    pub fn paint<T: DrawTarget + ?Sized>(
        &mut self,
        target: &mut T,
        base: Affine,
        visible: Rect,
        scene: &Scene,
        view: ViewTransform,
    ) -> RenderStats {
        let mut stats = RenderStats::default();
        let mut painter = Painter::new(target, base);
        painter.clear_rect(visible);

        stats.grid_lines = draw_grid(
            &mut painter,
            &self.theme,
            self.config.grid_spacing,
            visible,
            scene.frame(),
            view,
        );

        // Y-up world: flip once, then move the layout origin into place.
        let extent = scene.frame();
        let mut world = painter.push();
        world
            .scale(view.scale, -view.scale)
            .translate((extent.origin_x, -extent.height + extent.origin_y));

        let mut totals = PieceStats::default();
        for piece in scene.pieces() {
            let mut frame = world.push();
            frame.translate((piece.item.x, piece.item.y)).rotate(piece.item.angle);
            totals += draw_piece(&mut frame, &mut self.rng, &self.theme, &piece.geometry);

            if self.config.show_locomotives
                && let GeometryPiece::Straight(shape) = &piece.geometry
            {
                let mut mid = frame.push();
                mid.translate((shape.length / 2.0, 0.0));
                draw_locomotive(&mut mid, &self.theme);
                stats.locomotives += 1;
            }

            log::trace!(
                "{} {} at ({}, {}) rot {}",
                piece.kind,
                piece.item.id,
                piece.item.x,
                piece.item.y,
                piece.item.angle
            );
            stats.pieces += 1;
        }

        stats.sleepers = totals.sleepers;
        stats.rails = totals.rails;
        stats
    }
}

// ─── Grid ────────────────────────────────────────────────────────────────

/// Grid lines in surface units, snapped to whole pixels. The lines through
/// the layout origin use their own color and dash. Returns the line count.
fn draw_grid<T: DrawTarget + ?Sized>(
    painter: &mut Painter<'_, T>,
    theme: &Theme,
    spacing: f64,
    visible: Rect,
    frame: &SceneFrame,
    view: ViewTransform,
) -> usize {
    let origin = view.world_affine(frame) * Point::ZERO;
    let (ox, oy) = (origin.x.floor(), origin.y.floor());
    let step = spacing * view.scale;

    let mut lines = 0;
    let mut grid = BezPath::new();
    if step >= MIN_GRID_STEP {
        for x in grid_positions(ox, step, visible.x0, visible.x1) {
            grid.move_to((x, visible.y0));
            grid.line_to((x, visible.y1 - 1.0));
            lines += 1;
        }
        for y in grid_positions(oy, step, visible.y0, visible.y1) {
            grid.move_to((visible.x0, y));
            grid.line_to((visible.x1 - 1.0, y));
            lines += 1;
        }
        painter.stroke_path(&grid, &StrokeStyle::dashed(1.0, theme.grid, &[1.0, 3.0]));
    }

    let mut axes = BezPath::new();
    axes.move_to((ox, visible.y0));
    axes.line_to((ox, visible.y1 - 1.0));
    axes.move_to((visible.x0, oy));
    axes.line_to((visible.x1 - 1.0, oy));
    painter.stroke_path(
        &axes,
        &StrokeStyle::dashed(1.0, theme.grid_origin, &[2.0, 2.0]),
    );

    lines + 2
}

/// Floored positions `origin ± k·step` (k ≥ 1) inside `[min, max)`.
fn grid_positions(origin: f64, step: f64, min: f64, max: f64) -> Vec<f64> {
    let mut positions = Vec::new();
    let mut at = origin + step;
    while at < max {
        if at >= min {
            positions.push(at.floor());
        }
        at += step;
    }
    let mut at = origin - step;
    while at >= min {
        if at < max {
            positions.push(at.floor());
        }
        at -= step;
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Command, RecordingTarget};
    use pretty_assertions::assert_eq;
    use std::rc::Rc;
    use ts_core::{ItemId, LayoutDescription, PlacedItem, SceneBuilder};

    fn scene(kinds: &[&str]) -> Rc<Scene> {
        let items = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| PlacedItem {
                id: ItemId::intern(&format!("p{i}")),
                kind: kind.to_string(),
                x: i as f64 * 250.0,
                y: 0.0,
                angle: 0.0,
            })
            .collect();
        let layout = Rc::new(LayoutDescription {
            width: 1500.0,
            height: 600.0,
            offset_x: 0.0,
            offset_y: 0.0,
            items,
        });
        SceneBuilder::default().build(&layout)
    }

    fn surface() -> SurfaceMetrics {
        SurfaceMetrics::measure(1500.0, 600.0, 2.0)
    }

    #[test]
    fn grid_positions_cover_both_sides_of_the_origin() {
        assert_eq!(
            grid_positions(100.5, 150.0, 0.0, 500.0),
            vec![250.0, 400.0]
        );
        assert_eq!(grid_positions(400.0, 150.0, 0.0, 500.0), vec![250.0, 100.0]);
    }

    #[test]
    fn pass_clears_then_draws_grid_then_pieces() {
        let scene = scene(&["G239", "R2L", "UNKNOWN"]);
        let mut renderer = SchemeRenderer::new(Theme::default(), SchemeConfig::default(), 5);
        let mut target = RecordingTarget::new();
        let stats = renderer.draw(&mut target, &surface(), &scene, ViewTransform::new(1.0));

        assert_eq!(stats.pieces, 2);
        assert_eq!(stats.sleepers, 32 + 30);
        assert_eq!(stats.rails, 4);
        assert_eq!(stats.locomotives, 0);

        let commands = target.commands();
        let Command::Clear { transform, rect } = &commands[0] else {
            panic!("first command must clear, got {:?}", commands[0]);
        };
        assert_eq!(*transform, Affine::scale(2.0));
        assert_eq!(*rect, Rect::new(0.0, 0.0, 1500.0, 600.0));

        // Grid strokes are in surface units, before any world transform.
        let (grid_transform, _, grid_style) = target.strokes().next().unwrap();
        assert_eq!(*grid_transform, Affine::scale(2.0));
        assert_eq!(grid_style.dash.as_slice(), &[1.0, 3.0]);
        let (_, _, axes_style) = target.strokes().nth(1).unwrap();
        assert_eq!(axes_style.dash.as_slice(), &[2.0, 2.0]);
        assert_eq!(axes_style.color, Theme::default().grid_origin);
    }

    #[test]
    fn world_is_flipped_once() {
        let scene = scene(&["G119"]);
        let mut renderer = SchemeRenderer::new(Theme::default(), SchemeConfig::default(), 5);
        let mut target = RecordingTarget::new();
        renderer.draw(&mut target, &surface(), &scene, ViewTransform::new(1.0));

        // Rails are the last strokes; their transform maps world up to screen up.
        let (rail_transform, _, _) = target.strokes().last().unwrap();
        let a = *rail_transform * Point::new(0.0, 0.0);
        let b = *rail_transform * Point::new(0.0, 10.0);
        assert!(b.y < a.y);
        assert_eq!(rail_transform.determinant().signum(), -1.0);
    }

    #[test]
    fn locomotives_ride_on_straights_only() {
        let scene = scene(&["G239", "R2L", "G119"]);
        let config = SchemeConfig {
            show_locomotives: true,
            ..SchemeConfig::default()
        };
        let mut renderer = SchemeRenderer::new(Theme::default(), config, 5);
        let mut target = RecordingTarget::new();
        let stats = renderer.draw(&mut target, &surface(), &scene, ViewTransform::new(1.0));
        assert_eq!(stats.locomotives, 2);
    }

    #[test]
    fn dense_grid_keeps_only_the_axes() {
        let scene = scene(&[]);
        let mut renderer = SchemeRenderer::new(Theme::default(), SchemeConfig::default(), 5);
        let mut target = RecordingTarget::new();
        let stats = renderer.draw(&mut target, &surface(), &scene, ViewTransform::new(0.02));
        assert_eq!(stats.grid_lines, 2);
        assert_eq!(target.strokes().count(), 1);
    }
}
