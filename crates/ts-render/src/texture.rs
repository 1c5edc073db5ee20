//! Procedural tie and rail textures.
//!
//! Ties get a fresh set of grain streaks on every call; nothing is cached, so
//! two redraws of the same tie differ. Pass a seeded rng for reproducible
//! output.

use crate::painter::Painter;
use crate::target::{Brush, DrawTarget, LineCap, Shadow, StrokeStyle};
use crate::theme::Theme;
use kurbo::{BezPath, Rect, Vec2};
use rand::Rng;
use ts_core::catalog::RAIL_WIDTH;

/// Streak count per tie, inclusive.
pub const STREAKS: (u32, u32) = (15, 20);
const STREAK_MIN_WIDTH: f64 = 0.1;
const STREAK_MAX_WIDTH: f64 = 0.6;
/// Longest streak as a share of the tie length.
const STREAK_MAX_SHARE: f64 = 0.4;

const SHINE_WIDTH: f64 = 0.5;
/// Width lost by the bright core relative to the dark base.
const CORE_INSET: f64 = 0.6;

/// Draw a wooden tie filling `rect`: a shadowed base, then randomly placed
/// grain and crack streaks running along the tie. Returns the streak count.
pub fn draw_tie<T: DrawTarget + ?Sized>(
    painter: &mut Painter<'_, T>,
    rng: &mut impl Rng,
    theme: &Theme,
    rect: Rect,
) -> u32 {
    let shadow = Shadow {
        color: theme.tie_shadow,
        blur: 4.0,
        offset: Vec2::new(1.5, 1.5),
    };
    painter.with_shadow(&shadow, |p| p.fill_rect(rect, &Brush::Solid(theme.wood)));

    let (width, length) = (rect.width(), rect.height());
    let count = rng.gen_range(STREAKS.0..=STREAKS.1);
    for _ in 0..count {
        let color = if rng.gen_bool(0.5) {
            theme.grain
        } else {
            theme.crack
        };
        let streak_width = rng.gen_range(STREAK_MIN_WIDTH..STREAK_MAX_WIDTH).min(width);
        let streak_length = rng.gen_range(0.0..1.0) * length * STREAK_MAX_SHARE;
        let x = rect.x0 + rng.gen_range(0.0..1.0) * (width - streak_width);
        let y = rect.y0 + rng.gen_range(0.0..1.0) * (length - streak_length);
        painter.fill_rect(
            Rect::new(x, y, x + streak_width, y + streak_length),
            &Brush::Solid(color),
        );
    }
    count
}

/// Stroke a rail along `path` in three plies: dark base, bright core and a
/// thin highlight.
pub fn draw_rail<T: DrawTarget + ?Sized>(painter: &mut Painter<'_, T>, theme: &Theme, path: &BezPath) {
    for style in rail_plies(theme) {
        painter.stroke_path(path, &style);
    }
}

fn rail_plies(theme: &Theme) -> [StrokeStyle; 3] {
    let ply = |width, color| StrokeStyle {
        cap: LineCap::Butt,
        ..StrokeStyle::solid(width, color)
    };
    [
        ply(RAIL_WIDTH, theme.dark),
        ply(RAIL_WIDTH - CORE_INSET, theme.gold),
        ply(SHINE_WIDTH, theme.shine),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Command, RecordingTarget};
    use kurbo::Affine;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn tie() -> Rect {
        Rect::new(-1.35, -15.0, 1.35, 15.0)
    }

    #[test]
    fn streaks_stay_inside_the_tie() {
        let theme = Theme::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut target = RecordingTarget::new();
            let mut painter = Painter::new(&mut target, Affine::IDENTITY);
            let count = draw_tie(&mut painter, &mut rng, &theme, tie());
            assert!((STREAKS.0..=STREAKS.1).contains(&count));

            let streaks: Vec<Rect> = target
                .commands()
                .iter()
                .filter_map(|c| match c {
                    Command::FillRect { rect, brush, .. } if *brush != Brush::Solid(theme.wood) => {
                        Some(*rect)
                    }
                    _ => None,
                })
                .collect();
            assert_eq!(streaks.len() as u32, count);
            for streak in streaks {
                assert!(streak.x0 >= tie().x0 - 1e-9 && streak.x1 <= tie().x1 + 1e-9);
                assert!(streak.y0 >= tie().y0 - 1e-9 && streak.y1 <= tie().y1 + 1e-9);
                assert!(streak.width() >= STREAK_MIN_WIDTH - 1e-9);
                assert!(streak.height() <= 30.0 * STREAK_MAX_SHARE + 1e-9);
            }
        }
    }

    #[test]
    fn base_is_drawn_under_a_shadow() {
        let theme = Theme::default();
        let mut target = RecordingTarget::new();
        let mut painter = Painter::new(&mut target, Affine::IDENTITY);
        draw_tie(&mut painter, &mut StdRng::seed_from_u64(1), &theme, tie());

        let commands = target.commands();
        assert!(matches!(commands[0], Command::Shadow(Some(_))));
        assert!(matches!(&commands[1], Command::FillRect { brush, .. } if *brush == Brush::Solid(theme.wood)));
        assert_eq!(commands[2], Command::Shadow(None));
    }

    #[test]
    fn same_seed_same_texture() {
        let theme = Theme::default();
        let draw = |seed| {
            let mut target = RecordingTarget::new();
            let mut painter = Painter::new(&mut target, Affine::IDENTITY);
            draw_tie(&mut painter, &mut StdRng::seed_from_u64(seed), &theme, tie());
            target.take()
        };
        assert_eq!(draw(3), draw(3));
        assert_ne!(draw(3), draw(4));
    }

    #[test]
    fn rail_has_three_plies() {
        let theme = Theme::default();
        let mut target = RecordingTarget::new();
        let mut painter = Painter::new(&mut target, Affine::IDENTITY);
        let mut path = BezPath::new();
        path.move_to((0.0, 8.25));
        path.line_to((100.0, 8.25));
        draw_rail(&mut painter, &theme, &path);

        let widths: Vec<f64> = target.strokes().map(|(_, _, style)| style.width).collect();
        assert_eq!(widths.len(), 3);
        assert_eq!(widths[0], RAIL_WIDTH);
        assert!(widths[0] > widths[1] && widths[1] > widths[2]);
    }
}
