//! The primitive set every drawing backend implements.
//!
//! Transforms are passed explicitly with each call instead of living in
//! backend state; [`Painter`](crate::painter::Painter) owns the stack and
//! hands the composed transform down.

use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use smallvec::SmallVec;
use ts_core::Color;

// ─── Paint ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

impl GradientStop {
    pub const fn new(offset: f64, color: Color) -> Self {
        Self { offset, color }
    }
}

pub type GradientStops = SmallVec<[GradientStop; 4]>;

/// Fill style.
#[derive(Debug, Clone, PartialEq)]
pub enum Brush {
    Solid(Color),
    LinearGradient {
        start: Point,
        end: Point,
        stops: GradientStops,
    },
    RadialGradient {
        center: Point,
        radius: f64,
        stops: GradientStops,
    },
}

impl Brush {
    /// Color used by backends that cannot render gradients.
    pub fn fallback_color(&self) -> Color {
        match self {
            Brush::Solid(color) => *color,
            Brush::LinearGradient { stops, .. } | Brush::RadialGradient { stops, .. } => stops
                .first()
                .map(|stop| stop.color)
                .unwrap_or(Color::BLACK),
        }
    }
}

impl From<Color> for Brush {
    fn from(color: Color) -> Self {
        Brush::Solid(color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub fn as_str(self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

/// Stroke style for a path.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub color: Color,
    /// Alternating dash / gap lengths; empty for a solid line.
    pub dash: SmallVec<[f64; 4]>,
    pub cap: LineCap,
}

impl StrokeStyle {
    pub fn solid(width: f64, color: Color) -> Self {
        Self {
            width,
            color,
            dash: SmallVec::new(),
            cap: LineCap::Butt,
        }
    }

    pub fn dashed(width: f64, color: Color, dash: &[f64]) -> Self {
        Self {
            dash: SmallVec::from_slice(dash),
            ..Self::solid(width, color)
        }
    }
}

/// Drop shadow applied to subsequent fills until cleared. Offset and blur
/// are in surface units and ignore the current transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Color,
    pub blur: f64,
    pub offset: Vec2,
}

// ─── Target ──────────────────────────────────────────────────────────────

/// A 2D drawing surface.
///
/// Every call is total: backend failures are swallowed (and at most logged)
/// so a draw pass never aborts half way.
pub trait DrawTarget {
    /// Clear `rect` to transparent.
    fn clear_rect(&mut self, transform: Affine, rect: Rect);

    fn fill_rect(&mut self, transform: Affine, rect: Rect, brush: &Brush);

    fn fill_path(&mut self, transform: Affine, path: &BezPath, brush: &Brush);

    fn stroke_path(&mut self, transform: Affine, path: &BezPath, style: &StrokeStyle);

    /// Set or clear the drop shadow. Backends without shadows ignore it.
    fn set_shadow(&mut self, _shadow: Option<&Shadow>) {}
}

impl<T: DrawTarget + ?Sized> DrawTarget for &mut T {
    fn clear_rect(&mut self, transform: Affine, rect: Rect) {
        (**self).clear_rect(transform, rect);
    }

    fn fill_rect(&mut self, transform: Affine, rect: Rect, brush: &Brush) {
        (**self).fill_rect(transform, rect, brush);
    }

    fn fill_path(&mut self, transform: Affine, path: &BezPath, brush: &Brush) {
        (**self).fill_path(transform, path, brush);
    }

    fn stroke_path(&mut self, transform: Affine, path: &BezPath, style: &StrokeStyle) {
        (**self).stroke_path(transform, path, style);
    }

    fn set_shadow(&mut self, shadow: Option<&Shadow>) {
        (**self).set_shadow(shadow);
    }
}
