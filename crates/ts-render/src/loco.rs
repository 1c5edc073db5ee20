//! Top-down steam locomotive marker.

use crate::painter::Painter;
use crate::target::{Brush, DrawTarget, GradientStop, StrokeStyle};
use crate::theme::Theme;
use kurbo::{BezPath, Circle, Ellipse, Point, Rect, Shape};
use smallvec::smallvec;
use ts_core::Color;
use ts_core::catalog::ARC_TOLERANCE;

pub const LOCO_LENGTH: f64 = 102.0;
pub const LOCO_WIDTH: f64 = 34.0;

/// Draw a locomotive centered on the current origin, facing +x.
pub fn draw_locomotive<T: DrawTarget + ?Sized>(painter: &mut Painter<'_, T>, theme: &Theme) {
    let (w, h) = (LOCO_LENGTH, LOCO_WIDTH);
    let (left, top) = (-w / 2.0, -h / 2.0);
    let body = Brush::Solid(theme.loco_black);

    // Ground shadow
    painter.fill_rect(
        Rect::from_origin_size((left + 2.0, top + 2.0), (w, h)),
        &Brush::Solid(Color::rgba8(0, 0, 0, 153)),
    );

    // Front platform
    painter.fill_rect(Rect::from_origin_size((left, top), (15.0, h)), &body);

    // Boiler, shaded across its width
    let boiler = Brush::LinearGradient {
        start: Point::new(0.0, -h / 3.0),
        end: Point::new(0.0, h / 3.0),
        stops: smallvec![
            GradientStop::new(0.0, Color::BLACK),
            GradientStop::new(0.5, Color::rgb8(0x33, 0x33, 0x33)),
            GradientStop::new(1.0, Color::BLACK),
        ],
    };
    painter.fill_rect(
        Rect::from_origin_size((left + 15.0, -h / 3.0), (60.0, h * 2.0 / 3.0)),
        &boiler,
    );

    // Cab
    let cab = Rect::from_origin_size((w / 2.0 - 35.0, top), (35.0, h));
    painter.fill_rect(cab, &body);
    painter.stroke_path(
        &cab.to_path(ARC_TOLERANCE),
        &StrokeStyle::solid(1.0, Color::rgb8(0x44, 0x44, 0x44)),
    );

    // Chimney and steam dome
    let copper = Brush::Solid(theme.loco_copper);
    let chimney = Circle::new((left + 25.0, 0.0), 4.0).to_path(ARC_TOLERANCE);
    painter.fill_path(&chimney, &copper);
    painter.stroke_path(&chimney, &StrokeStyle::solid(1.0, theme.loco_brass));
    let dome = Ellipse::new((left + 55.0, 0.0), (6.0, 4.0), 0.0).to_path(ARC_TOLERANCE);
    painter.fill_path(&dome, &copper);

    // Side tanks
    let tank = Brush::Solid(Color::rgb8(0x22, 0x22, 0x22));
    painter.fill_rect(Rect::from_origin_size((left + 20.0, top), (40.0, 4.0)), &tank);
    painter.fill_rect(
        Rect::from_origin_size((left + 20.0, h / 2.0 - 4.0), (40.0, 4.0)),
        &tank,
    );

    // Highlight along the boiler
    let mut glint = BezPath::new();
    glint.move_to((left + 15.0, -h / 6.0));
    glint.line_to((10.0, -h / 6.0));
    painter.stroke_path(
        &glint,
        &StrokeStyle::solid(2.0, Color::rgba8(255, 255, 255, 38)),
    );

    // Cab windows
    let window = Brush::Solid(theme.loco_window);
    painter.fill_rect(
        Rect::from_origin_size((w / 2.0 - 30.0, top + 4.0), (10.0, 5.0)),
        &window,
    );
    painter.fill_rect(
        Rect::from_origin_size((w / 2.0 - 30.0, h / 2.0 - 9.0), (10.0, 5.0)),
        &window,
    );
}
