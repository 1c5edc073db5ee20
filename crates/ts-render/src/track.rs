//! Draw routines for catalog pieces.
//!
//! All ties of a piece are drawn before any of its rails, so rails of one
//! segment sit on top of ties of the neighbouring segment on switches.

use crate::painter::Painter;
use crate::target::{Brush, DrawTarget};
use crate::texture::{draw_rail, draw_tie};
use crate::theme::Theme;
use kurbo::{Circle, Point, Rect, Shape};
use rand::Rng;
use ts_core::GeometryPiece;
use ts_core::catalog::{
    ARC_TOLERANCE, BOLT_RADIUS, GAUGE, HALF_GAUGE, SLEEPER_LENGTH, SLEEPER_WIDTH, SleeperPose,
};

/// What a piece draw emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PieceStats {
    pub sleepers: u32,
    pub rails: u32,
}

impl std::ops::AddAssign for PieceStats {
    fn add_assign(&mut self, other: Self) {
        self.sleepers += other.sleepers;
        self.rails += other.rails;
    }
}

/// Draw `piece` in the painter's current frame (piece origin, heading +x).
pub fn draw_piece<T: DrawTarget + ?Sized>(
    painter: &mut Painter<'_, T>,
    rng: &mut impl Rng,
    theme: &Theme,
    piece: &GeometryPiece,
) -> PieceStats {
    let segments = piece.segments();
    let mut stats = PieceStats::default();

    for segment in &segments {
        let mut frame = painter.push();
        frame.translate(segment.offset());
        for pose in segment.sleepers() {
            draw_sleeper(&mut frame, rng, theme, pose);
            stats.sleepers += 1;
        }
    }

    for segment in &segments {
        let mut frame = painter.push();
        frame.translate(segment.offset());
        for rail in segment.rails(GAUGE) {
            draw_rail(&mut frame, theme, &rail.to_bez());
            stats.rails += 1;
        }
    }

    stats
}

/// One tie with its two spike heads, centered on `pose`.
fn draw_sleeper<T: DrawTarget + ?Sized>(
    painter: &mut Painter<'_, T>,
    rng: &mut impl Rng,
    theme: &Theme,
    pose: SleeperPose,
) {
    let mut frame = painter.push();
    frame.concat(pose.frame());

    let half_width = SLEEPER_WIDTH / 2.0;
    let half_length = SLEEPER_LENGTH / 2.0;
    draw_tie(
        &mut frame,
        rng,
        theme,
        Rect::new(-half_width, -half_length, half_width, half_length),
    );

    let bolt = Brush::Solid(theme.bolt);
    for lateral in [-HALF_GAUGE, HALF_GAUGE] {
        let head = Circle::new(Point::new(0.0, lateral), BOLT_RADIUS);
        frame.fill_path(&head.to_path(ARC_TOLERANCE), &bolt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Command, RecordingTarget};
    use kurbo::Affine;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use ts_core::TrackKind;

    fn draw(kind: TrackKind) -> (PieceStats, RecordingTarget) {
        let mut target = RecordingTarget::new();
        let mut painter = Painter::new(&mut target, Affine::IDENTITY);
        let stats = draw_piece(
            &mut painter,
            &mut StdRng::seed_from_u64(11),
            &Theme::default(),
            &kind.geometry(),
        );
        assert_eq!(painter.depth(), 0);
        (stats, target)
    }

    #[test]
    fn every_kind_draws_its_catalog_sleeper_count() {
        for kind in TrackKind::ALL {
            let (stats, target) = draw(kind);
            let expected = kind.geometry().sleeper_count();
            assert_eq!(stats.sleepers, expected, "{kind}");
            // One wood base per tie, whatever the texture rolled.
            assert_eq!(
                target.rect_fills_with(&Brush::Solid(Theme::default().wood)),
                expected as usize,
                "{kind}"
            );
        }
    }

    #[test]
    fn rails_come_after_all_ties() {
        let (stats, target) = draw(TrackKind::SwitchR2Right);
        assert_eq!(stats.rails, 6);

        let first_stroke = target
            .commands()
            .iter()
            .position(|c| matches!(c, Command::StrokePath { .. }))
            .unwrap();
        let last_fill = target
            .commands()
            .iter()
            .rposition(|c| matches!(c, Command::FillRect { .. } | Command::FillPath { .. }))
            .unwrap();
        assert!(last_fill < first_stroke);
        // Three plies per rail.
        assert_eq!(target.strokes().count(), 18);
    }

    #[test]
    fn bolts_sit_on_the_rails() {
        let (_, target) = draw(TrackKind::G119);
        let bolts: Vec<Point> = target
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::FillPath { transform, path, .. } => {
                    let center = path.bounding_box().center();
                    Some(*transform * center)
                }
                _ => None,
            })
            .collect();
        assert_eq!(bolts.len(), 32);
        assert!(bolts.iter().all(|p| (p.y.abs() - HALF_GAUGE).abs() < 1e-6));
    }
}
