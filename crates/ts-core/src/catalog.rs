//! Track geometry catalog.
//!
//! A closed set of track-piece kinds, each resolved once into a
//! [`GeometryPiece`] carrying its precomputed shape parameters. Shape
//! functions are pure: they yield tie poses and rail paths in the piece's
//! local frame (origin at the piece start, heading along +x, +y to the left)
//! and never touch randomness, so placement is reproducible across redraws.

use kurbo::{Affine, Arc as KurboArc, BezPath, Point, Rect, Shape, Vec2};
use smallvec::SmallVec;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt;

/// Distance between the two rail centerlines.
pub const GAUGE: f64 = 16.5;
pub const HALF_GAUGE: f64 = GAUGE / 2.0;
/// Tie extent along the track.
pub const SLEEPER_WIDTH: f64 = 2.7;
/// Tie extent across the track.
pub const SLEEPER_LENGTH: f64 = 30.0;
pub const BOLT_RADIUS: f64 = 1.2;
pub const RAIL_WIDTH: f64 = 1.8;

/// Flattening tolerance for arcs, in world units.
pub const ARC_TOLERANCE: f64 = 0.05;

const R1: f64 = 360.0;
const R2: f64 = 422.0;
const R9: f64 = 908.0;

/// Length of a circular arc of `radius` subtending `angle_degrees`.
pub fn arc_length(radius: f64, angle_degrees: f64) -> f64 {
    TAU * radius * (angle_degrees.abs() / 360.0)
}

// ─── Kinds ───────────────────────────────────────────────────────────────

/// Every track kind known to the catalog, keyed by its layout tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    G119,
    G231,
    G239,
    R1L,
    R1R,
    R2L,
    R2R,
    R9L,
    R9R,
    SwitchLineLeft,
    SwitchLineRight,
    SwitchR2Left,
    SwitchR2Right,
}

impl TrackKind {
    pub const ALL: [TrackKind; 13] = [
        TrackKind::G119,
        TrackKind::G231,
        TrackKind::G239,
        TrackKind::R1L,
        TrackKind::R1R,
        TrackKind::R2L,
        TrackKind::R2R,
        TrackKind::R9L,
        TrackKind::R9R,
        TrackKind::SwitchLineLeft,
        TrackKind::SwitchLineRight,
        TrackKind::SwitchR2Left,
        TrackKind::SwitchR2Right,
    ];

    /// Look up a layout `type` tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub fn tag(self) -> &'static str {
        match self {
            TrackKind::G119 => "G119",
            TrackKind::G231 => "G231",
            TrackKind::G239 => "G239",
            TrackKind::R1L => "R1L",
            TrackKind::R1R => "R1R",
            TrackKind::R2L => "R2L",
            TrackKind::R2R => "R2R",
            TrackKind::R9L => "R9L",
            TrackKind::R9R => "R9R",
            TrackKind::SwitchLineLeft => "SWITCH_LINE_LEFT",
            TrackKind::SwitchLineRight => "SWITCH_LINE_RIGHT",
            TrackKind::SwitchR2Left => "SWITCH_R2_LEFT",
            TrackKind::SwitchR2Right => "SWITCH_R2_RIGHT",
        }
    }

    /// Instantiate the geometry for this kind from its fixed constants.
    pub fn geometry(self) -> GeometryPiece {
        match self {
            TrackKind::G119 => GeometryPiece::Straight(StraightShape::new(119.0, 16)),
            TrackKind::G231 => GeometryPiece::Straight(StraightShape::new(231.0, 31)),
            TrackKind::G239 => GeometryPiece::Straight(StraightShape::new(239.0, 32)),
            TrackKind::R1L => GeometryPiece::Curve(CurveShape::new(R1, 30.0, 25)),
            TrackKind::R1R => GeometryPiece::Curve(CurveShape::new(R1, -30.0, 25)),
            TrackKind::R2L => GeometryPiece::Curve(CurveShape::new(R2, 30.0, 30)),
            TrackKind::R2R => GeometryPiece::Curve(CurveShape::new(R2, -30.0, 30)),
            TrackKind::R9L => GeometryPiece::Curve(CurveShape::new(R9, 15.0, 31)),
            TrackKind::R9R => GeometryPiece::Curve(CurveShape::new(R9, -15.0, 31)),
            TrackKind::SwitchLineLeft => {
                GeometryPiece::SwitchStraightLeft(StraightSwitch::line(15.0))
            }
            TrackKind::SwitchLineRight => {
                GeometryPiece::SwitchStraightRight(StraightSwitch::line(-15.0))
            }
            TrackKind::SwitchR2Left => {
                GeometryPiece::SwitchDivergingLeft(DivergingSwitch::r2(30.0))
            }
            TrackKind::SwitchR2Right => {
                GeometryPiece::SwitchDivergingRight(DivergingSwitch::r2(-30.0))
            }
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ─── Shape primitives ────────────────────────────────────────────────────

/// Position and heading of one tie, in the piece's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SleeperPose {
    pub center: Point,
    /// Track direction at the tie, radians.
    pub heading: f64,
}

impl SleeperPose {
    /// Frame whose x axis runs along the track at this tie.
    pub fn frame(&self) -> Affine {
        Affine::translate(self.center.to_vec2()) * Affine::rotate(self.heading)
    }
}

/// A rail centerline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RailPath {
    Line {
        from: Point,
        to: Point,
    },
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        sweep: f64,
    },
}

impl RailPath {
    pub fn start(&self) -> Point {
        match *self {
            RailPath::Line { from, .. } => from,
            RailPath::Arc {
                center,
                radius,
                start_angle,
                ..
            } => center + Vec2::from_angle(start_angle) * radius,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            RailPath::Line { to, .. } => to,
            RailPath::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => center + Vec2::from_angle(start_angle + sweep) * radius,
        }
    }

    pub fn to_bez(&self) -> BezPath {
        match *self {
            RailPath::Line { from, to } => {
                let mut path = BezPath::new();
                path.move_to(from);
                path.line_to(to);
                path
            }
            RailPath::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => KurboArc {
                center,
                radii: Vec2::new(radius, radius),
                start_angle,
                sweep_angle: sweep,
                x_rotation: 0.0,
            }
            .to_path(ARC_TOLERANCE),
        }
    }

    /// The same path moved by `offset`.
    pub fn translated(self, offset: Vec2) -> Self {
        match self {
            RailPath::Line { from, to } => RailPath::Line {
                from: from + offset,
                to: to + offset,
            },
            RailPath::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => RailPath::Arc {
                center: center + offset,
                radius,
                start_angle,
                sweep,
            },
        }
    }
}

/// Straight segment with evenly spaced ties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightShape {
    pub length: f64,
    pub sleepers: u32,
}

impl StraightShape {
    pub const fn new(length: f64, sleepers: u32) -> Self {
        Self { length, sleepers }
    }

    pub fn sleeper_spacing(&self) -> f64 {
        self.length / self.sleepers as f64
    }

    pub fn sleepers(&self) -> impl Iterator<Item = SleeperPose> + '_ {
        let step = self.sleeper_spacing();
        (0..self.sleepers).map(move |i| SleeperPose {
            center: Point::new((i as f64 + 0.5) * step, 0.0),
            heading: 0.0,
        })
    }

    /// Rail at lateral offset `lateral` (positive is left).
    pub fn rail(&self, lateral: f64) -> RailPath {
        RailPath::Line {
            from: Point::new(0.0, lateral),
            to: Point::new(self.length, lateral),
        }
    }

    pub fn rails(&self, gauge: f64) -> [RailPath; 2] {
        [self.rail(gauge / 2.0), self.rail(-gauge / 2.0)]
    }
}

/// Constant-radius arc. Positive `angle` turns left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveShape {
    pub radius: f64,
    /// Subtended angle in radians, signed.
    pub angle: f64,
    /// Centerline arc length.
    pub length: f64,
    pub sleepers: u32,
}

impl CurveShape {
    pub fn new(radius: f64, angle_degrees: f64, sleepers: u32) -> Self {
        Self {
            radius,
            angle: angle_degrees.to_radians(),
            length: arc_length(radius, angle_degrees),
            sleepers,
        }
    }

    fn turn(&self) -> f64 {
        if self.angle < 0.0 { -1.0 } else { 1.0 }
    }

    /// Center of curvature in the local frame.
    pub fn center(&self) -> Point {
        Point::new(0.0, self.turn() * self.radius)
    }

    /// Point at signed arc parameter `phi`, shifted `lateral` to the left.
    pub fn point_at(&self, phi: f64, lateral: f64) -> Point {
        let s = self.turn();
        let (sin, cos) = phi.sin_cos();
        Point::new(
            s * self.radius * sin - lateral * sin,
            s * self.radius * (1.0 - cos) + lateral * cos,
        )
    }

    /// Ties evenly spaced by angle, each centered in its angular slot.
    pub fn sleepers(&self) -> impl Iterator<Item = SleeperPose> + '_ {
        let step = self.angle / self.sleepers as f64;
        (0..self.sleepers).map(move |i| {
            let phi = (i as f64 + 0.5) * step;
            SleeperPose {
                center: self.point_at(phi, 0.0),
                heading: phi,
            }
        })
    }

    /// Concentric rail arc at lateral offset `lateral` (positive is left).
    pub fn rail(&self, lateral: f64) -> RailPath {
        let s = self.turn();
        RailPath::Arc {
            center: self.center(),
            radius: self.radius - s * lateral,
            start_angle: -s * FRAC_PI_2,
            sweep: self.angle,
        }
    }

    pub fn rails(&self, gauge: f64) -> [RailPath; 2] {
        [self.rail(gauge / 2.0), self.rail(-gauge / 2.0)]
    }
}

// ─── Pieces ──────────────────────────────────────────────────────────────

/// Switch with a full-length straight route and a diverging curve, both
/// starting at the piece origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightSwitch {
    pub main: StraightShape,
    pub branch: CurveShape,
}

impl StraightSwitch {
    fn line(angle_degrees: f64) -> Self {
        Self {
            main: StraightShape::new(239.0, 32),
            branch: CurveShape::new(R9, angle_degrees, 32),
        }
    }
}

/// Switch made of a short straight lead and a curve laid twice: once from
/// the origin and once from the end of the lead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivergingSwitch {
    pub lead: StraightShape,
    pub branch: CurveShape,
}

impl DivergingSwitch {
    fn r2(angle_degrees: f64) -> Self {
        Self {
            lead: StraightShape::new(61.0, 8),
            branch: CurveShape::new(R2, angle_degrees, 30),
        }
    }
}

/// One drawable part of a piece, placed at `offset` along the local x axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Straight { offset: Vec2, shape: StraightShape },
    Curve { offset: Vec2, shape: CurveShape },
}

impl Segment {
    pub fn offset(&self) -> Vec2 {
        match *self {
            Segment::Straight { offset, .. } | Segment::Curve { offset, .. } => offset,
        }
    }

    pub fn sleeper_count(&self) -> u32 {
        match self {
            Segment::Straight { shape, .. } => shape.sleepers,
            Segment::Curve { shape, .. } => shape.sleepers,
        }
    }

    /// Tie poses relative to the segment's own origin.
    pub fn sleepers(&self) -> Vec<SleeperPose> {
        match self {
            Segment::Straight { shape, .. } => shape.sleepers().collect(),
            Segment::Curve { shape, .. } => shape.sleepers().collect(),
        }
    }

    /// Rails relative to the segment's own origin.
    pub fn rails(&self, gauge: f64) -> [RailPath; 2] {
        match self {
            Segment::Straight { shape, .. } => shape.rails(gauge),
            Segment::Curve { shape, .. } => shape.rails(gauge),
        }
    }
}

/// Geometry for the diverging-switch state indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchIndicator {
    pub lead_length: f64,
    pub branch: CurveShape,
}

/// An instantiated catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryPiece {
    Straight(StraightShape),
    Curve(CurveShape),
    SwitchDivergingLeft(DivergingSwitch),
    SwitchDivergingRight(DivergingSwitch),
    SwitchStraightLeft(StraightSwitch),
    SwitchStraightRight(StraightSwitch),
}

impl GeometryPiece {
    /// Drawable parts in draw order.
    pub fn segments(&self) -> SmallVec<[Segment; 3]> {
        let origin = Vec2::ZERO;
        match *self {
            GeometryPiece::Straight(shape) => smallvec::smallvec![Segment::Straight {
                offset: origin,
                shape,
            }],
            GeometryPiece::Curve(shape) => smallvec::smallvec![Segment::Curve {
                offset: origin,
                shape,
            }],
            GeometryPiece::SwitchStraightLeft(sw) | GeometryPiece::SwitchStraightRight(sw) => {
                smallvec::smallvec![
                    Segment::Curve {
                        offset: origin,
                        shape: sw.branch,
                    },
                    Segment::Straight {
                        offset: origin,
                        shape: sw.main,
                    },
                ]
            }
            GeometryPiece::SwitchDivergingLeft(sw) | GeometryPiece::SwitchDivergingRight(sw) => {
                smallvec::smallvec![
                    Segment::Straight {
                        offset: origin,
                        shape: sw.lead,
                    },
                    Segment::Curve {
                        offset: Vec2::new(sw.lead.length, 0.0),
                        shape: sw.branch,
                    },
                    Segment::Curve {
                        offset: origin,
                        shape: sw.branch,
                    },
                ]
            }
        }
    }

    /// Total number of ties drawn for this piece.
    pub fn sleeper_count(&self) -> u32 {
        self.segments().iter().map(Segment::sleeper_count).sum()
    }

    /// All tie poses in the piece's local frame.
    pub fn sleepers(&self) -> Vec<SleeperPose> {
        self.segments()
            .iter()
            .flat_map(|segment| {
                let offset = segment.offset();
                segment.sleepers().into_iter().map(move |pose| SleeperPose {
                    center: pose.center + offset,
                    heading: pose.heading,
                })
            })
            .collect()
    }

    /// All rail centerlines in the piece's local frame.
    pub fn rails(&self) -> Vec<RailPath> {
        self.segments()
            .iter()
            .flat_map(|segment| {
                let offset = segment.offset();
                segment
                    .rails(GAUGE)
                    .into_iter()
                    .map(move |rail| rail.translated(offset))
            })
            .collect()
    }

    /// Local-frame bounding box of all ties.
    pub fn extent(&self) -> Rect {
        let half = SLEEPER_LENGTH / 2.0;
        self.sleepers()
            .iter()
            .map(|pose| Rect::from_center_size(pose.center, (2.0 * half, 2.0 * half)))
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO)
    }

    /// Indicator geometry for kinds that show a thrown/normal state.
    pub fn switch_indicator(&self) -> Option<SwitchIndicator> {
        match self {
            GeometryPiece::SwitchDivergingLeft(sw) | GeometryPiece::SwitchDivergingRight(sw) => {
                Some(SwitchIndicator {
                    lead_length: sw.lead.length,
                    branch: sw.branch,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn tags_roundtrip_and_unknown_is_none() {
        for kind in TrackKind::ALL {
            assert_eq!(TrackKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(TrackKind::from_tag("G120"), None);
        assert_eq!(TrackKind::from_tag("g119"), None);
    }

    #[test]
    fn sleeper_counts_match_catalog() {
        let expected = [
            (TrackKind::G119, 16),
            (TrackKind::G231, 31),
            (TrackKind::G239, 32),
            (TrackKind::R1L, 25),
            (TrackKind::R1R, 25),
            (TrackKind::R2L, 30),
            (TrackKind::R2R, 30),
            (TrackKind::R9L, 31),
            (TrackKind::R9R, 31),
            (TrackKind::SwitchLineLeft, 64),
            (TrackKind::SwitchLineRight, 64),
            (TrackKind::SwitchR2Left, 68),
            (TrackKind::SwitchR2Right, 68),
        ];
        for (kind, count) in expected {
            let piece = kind.geometry();
            assert_eq!(piece.sleeper_count(), count, "{kind}");
            assert_eq!(piece.sleepers().len(), count as usize, "{kind}");
        }
    }

    #[test]
    fn arc_length_is_independent_of_sleepers() {
        let a = CurveShape::new(422.0, 30.0, 30);
        let b = CurveShape::new(422.0, 30.0, 7);
        assert!(close(a.length, TAU * 422.0 / 12.0));
        assert!(close(a.length, b.length));
        assert!(close(arc_length(908.0, -15.0), TAU * 908.0 / 24.0));
    }

    #[test]
    fn straight_ties_are_evenly_spaced() {
        let shape = StraightShape::new(119.0, 16);
        let xs: Vec<f64> = shape.sleepers().map(|p| p.center.x).collect();
        let step = 119.0 / 16.0;
        assert!(close(xs[0], step / 2.0));
        for pair in xs.windows(2) {
            assert!(close(pair[1] - pair[0], step));
        }
    }

    #[test]
    fn curve_ties_are_evenly_spaced_by_angle_on_the_arc() {
        let curve = CurveShape::new(360.0, 30.0, 25);
        let center = curve.center();
        let headings: Vec<f64> = curve.sleepers().map(|p| p.heading).collect();
        let step = curve.angle / 25.0;
        for pair in headings.windows(2) {
            assert!(close(pair[1] - pair[0], step));
        }
        for pose in curve.sleepers() {
            assert!(close(pose.center.distance(center), 360.0));
        }
    }

    #[test]
    fn curve_rails_are_concentric_and_start_at_gauge() {
        for angle in [30.0, -30.0] {
            let curve = CurveShape::new(422.0, angle, 30);
            let [left, right] = curve.rails(GAUGE);
            assert!(left.start().distance(Point::new(0.0, HALF_GAUGE)) < 1e-9);
            assert!(right.start().distance(Point::new(0.0, -HALF_GAUGE)) < 1e-9);
            match (left, right) {
                (
                    RailPath::Arc { center: c1, radius: r1, .. },
                    RailPath::Arc { center: c2, radius: r2, .. },
                ) => {
                    assert_eq!(c1, c2);
                    assert!(close((r1 - r2).abs(), GAUGE));
                }
                other => panic!("expected arcs, got {other:?}"),
            }
        }
    }

    #[test]
    fn mirror_switches_differ_only_in_curvature_sign() {
        let left = TrackKind::SwitchR2Left.geometry().sleepers();
        let right = TrackKind::SwitchR2Right.geometry().sleepers();
        assert_eq!(left.len(), right.len());
        for (l, r) in left.iter().zip(&right) {
            assert!(close(l.center.x, r.center.x));
            assert!(close(l.center.y, -r.center.y));
            assert!(close(l.heading, -r.heading));
        }
    }

    #[test]
    fn diverging_switch_branch_continues_from_lead() {
        let piece = TrackKind::SwitchR2Right.geometry();
        let rails = piece.rails();
        assert_eq!(rails.len(), 6);
        // Lead rails end where the second branch begins.
        assert!(rails[0].end().distance(rails[2].start()) < 1e-9);
        assert!(rails[1].end().distance(rails[3].start()) < 1e-9);
        assert!(piece.switch_indicator().is_some());
        assert!(TrackKind::SwitchLineRight.geometry().switch_indicator().is_none());
    }

    #[test]
    fn extent_covers_every_tie() {
        let piece = TrackKind::G239.geometry();
        let extent = piece.extent();
        assert!(extent.x0 < 0.0 && extent.x1 > 239.0 - 15.0);
        assert!(close(extent.y0, -15.0) && close(extent.y1, 15.0));
    }
}
