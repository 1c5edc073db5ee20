pub mod loco;
pub mod overlay;
#[cfg(feature = "vello")]
pub mod paint;
pub mod painter;
pub mod record;
pub mod renderer;
pub mod svg;
pub mod target;
pub mod texture;
pub mod theme;
pub mod track;

pub use overlay::{INDICATOR_GAUGE, OverlayRenderer};
#[cfg(feature = "vello")]
pub use paint::VelloTarget;
pub use painter::{Frame, Painter};
pub use record::RecordingTarget;
pub use renderer::{RenderStats, SchemeRenderer};
pub use svg::{SvgTarget, render_svg};
pub use target::{Brush, DrawTarget, GradientStop, LineCap, Shadow, StrokeStyle};
pub use theme::Theme;
