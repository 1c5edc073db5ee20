pub mod catalog;
pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod id;
pub mod model;
pub mod scene;
pub mod surface;
pub mod view;

pub use catalog::{GeometryPiece, RailPath, Segment, SleeperPose, SwitchIndicator, TrackKind};
pub use color::Color;
pub use config::{SchemeConfig, ZoomConfig};
pub use controller::{Redraw, SchemeState};
pub use error::LoadError;
pub use id::ItemId;
pub use model::*;
pub use scene::{Placement, Scene, SceneBuilder, SceneFrame, ScenePiece};
pub use surface::{
    OverlayProps, SchemeProps, SurfaceMetrics, SurfaceState, overlay_should_redraw,
    scheme_should_redraw,
};
pub use view::{ViewTransform, ZoomController};

// Re-export kurbo so downstream crates share one geometry version
pub use kurbo;
