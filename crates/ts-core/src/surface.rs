//! Surface lifecycle, independent of any windowing or DOM API.
//!
//! A host binds [`SurfaceState`] to a real drawable: it reports mounts and
//! container resizes, asks whether a frame must be scheduled, and asks again
//! when the frame fires whether drawing is still allowed. The redraw
//! predicates decide which input changes are worth a frame at all.

use crate::model::LiveItem;
use crate::scene::Scene;
use crate::view::ViewTransform;
use std::rc::Rc;

// ─── Metrics ──────────────────────────────────────────────────────────────

/// Backing-store pixel size for a container box: the box is floored to whole
/// logical pixels, then scaled by the device pixel ratio.
pub fn backing_size(box_width: f64, box_height: f64, dpr: f64) -> (u32, u32) {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    let side = |logical: f64| (logical.max(0.0).floor() * dpr).round() as u32;
    (side(box_width), side(box_height))
}

/// Size of a mounted surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    /// Logical (CSS) size, floored.
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl SurfaceMetrics {
    pub fn measure(box_width: f64, box_height: f64, dpr: f64) -> Self {
        let (pixel_width, pixel_height) = backing_size(box_width, box_height, dpr);
        Self {
            width: box_width.max(0.0).floor(),
            height: box_height.max(0.0).floor(),
            dpr: if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 },
            pixel_width,
            pixel_height,
        }
    }

    fn same_backing(&self, other: &SurfaceMetrics) -> bool {
        self.pixel_width == other.pixel_width && self.pixel_height == other.pixel_height
    }
}

// ─── State machine ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct SurfaceState {
    metrics: Option<SurfaceMetrics>,
    frame_pending: bool,
    frames_drawn: u64,
}

impl SurfaceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mounted(&self) -> bool {
        self.metrics.is_some()
    }

    pub fn metrics(&self) -> Option<SurfaceMetrics> {
        self.metrics
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    /// Number of frames that passed [`begin_frame`](Self::begin_frame).
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Attach to a container of the given size. Returns `true` when a frame
    /// must be scheduled for the initial draw.
    pub fn mount(&mut self, box_width: f64, box_height: f64, dpr: f64) -> bool {
        self.metrics = Some(SurfaceMetrics::measure(box_width, box_height, dpr));
        self.request_redraw()
    }

    /// Record a new container size. Returns the new metrics when the backing
    /// size actually changed, `None` for jitter below one pixel or when the
    /// surface is not mounted.
    pub fn resize(&mut self, box_width: f64, box_height: f64, dpr: f64) -> Option<SurfaceMetrics> {
        let current = self.metrics.as_mut()?;
        let next = SurfaceMetrics::measure(box_width, box_height, dpr);
        if current.same_backing(&next) {
            return None;
        }
        *current = next;
        Some(next)
    }

    /// Ask for a redraw. Returns `true` when the caller must schedule a
    /// frame; requests made while one is already pending are absorbed.
    pub fn request_redraw(&mut self) -> bool {
        if !self.is_mounted() {
            log::debug!("redraw requested on an unmounted surface");
            return false;
        }
        if self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    /// Resize followed by a redraw request when the size changed. Returns
    /// `true` when a frame must be scheduled.
    pub fn resize_and_request(&mut self, box_width: f64, box_height: f64, dpr: f64) -> bool {
        self.resize(box_width, box_height, dpr).is_some() && self.request_redraw()
    }

    /// Called from the frame callback. Returns the metrics to draw with, or
    /// `None` if the surface was unmounted since the frame was scheduled.
    pub fn begin_frame(&mut self) -> Option<SurfaceMetrics> {
        self.frame_pending = false;
        let metrics = self.metrics?;
        self.frames_drawn += 1;
        Some(metrics)
    }

    /// Detach. Returns `true` when a scheduled frame must be cancelled.
    pub fn unmount(&mut self) -> bool {
        self.metrics = None;
        std::mem::take(&mut self.frame_pending)
    }
}

// ─── Redraw predicates ────────────────────────────────────────────────────

/// Inputs of the track surface.
#[derive(Debug, Clone)]
pub struct SchemeProps {
    pub scene: Rc<Scene>,
    pub view: Option<ViewTransform>,
}

/// Inputs of the live-state overlay.
#[derive(Debug, Clone)]
pub struct OverlayProps {
    pub scene: Rc<Scene>,
    pub live: Rc<Vec<LiveItem>>,
    pub view: Option<ViewTransform>,
}

/// The track surface redraws for a new scene object or a new scale. Live
/// item updates never touch it.
pub fn scheme_should_redraw(prev: &SchemeProps, next: &SchemeProps) -> bool {
    !Rc::ptr_eq(&prev.scene, &next.scene) || prev.view != next.view
}

/// The overlay redraws for a new scene, a new live item list or a new scale.
pub fn overlay_should_redraw(prev: &OverlayProps, next: &OverlayProps) -> bool {
    !Rc::ptr_eq(&prev.scene, &next.scene)
        || !Rc::ptr_eq(&prev.live, &next.live)
        || prev.view != next.view
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mounted() -> SurfaceState {
        let mut surface = SurfaceState::new();
        assert!(surface.mount(800.0, 600.0, 1.0));
        assert!(surface.begin_frame().is_some());
        surface
    }

    #[test]
    fn backing_size_floors_then_scales() {
        assert_eq!(backing_size(800.7, 600.2, 1.0), (800, 600));
        assert_eq!(backing_size(800.7, 600.2, 2.0), (1600, 1200));
        assert_eq!(backing_size(100.0, 50.0, 1.25), (125, 63));
        assert_eq!(backing_size(100.0, 50.0, f64::NAN), (100, 50));
    }

    #[test]
    fn one_pixel_resize_redraws_once() {
        let mut surface = mounted();
        assert!(surface.resize_and_request(801.0, 600.0, 1.0));
        assert_eq!(surface.metrics().map(|m| m.pixel_width), Some(801));
        assert!(surface.begin_frame().is_some());
        assert_eq!(surface.frames_drawn(), 2);
    }

    #[test]
    fn same_size_resize_never_redraws() {
        let mut surface = mounted();
        assert!(!surface.resize_and_request(800.0, 600.0, 1.0));
        assert!(!surface.resize_and_request(800.4, 600.9, 1.0));
        assert!(!surface.frame_pending());
        assert_eq!(surface.frames_drawn(), 1);
    }

    #[test]
    fn requests_within_a_frame_coalesce() {
        let mut surface = mounted();
        let scheduled = (0..5).filter(|_| surface.request_redraw()).count();
        assert_eq!(scheduled, 1);
        assert!(surface.begin_frame().is_some());
        assert!(surface.request_redraw());
    }

    #[test]
    fn unmount_cancels_and_stale_frames_are_ignored() {
        let mut surface = mounted();
        assert!(surface.request_redraw());
        assert!(surface.unmount());
        assert!(surface.begin_frame().is_none());
        assert!(!surface.request_redraw());
        assert!(surface.resize(900.0, 600.0, 1.0).is_none());
        assert_eq!(surface.frames_drawn(), 1);
    }

    #[test]
    fn live_updates_only_redraw_the_overlay() {
        let scene = Rc::new(Scene::empty());
        let view = Some(ViewTransform::new(1.0));
        let scheme = SchemeProps {
            scene: Rc::clone(&scene),
            view,
        };
        let overlay = OverlayProps {
            scene: Rc::clone(&scene),
            live: Rc::new(Vec::new()),
            view,
        };

        let polled = OverlayProps {
            live: Rc::new(Vec::new()),
            ..overlay.clone()
        };
        assert!(overlay_should_redraw(&overlay, &polled));
        assert!(!scheme_should_redraw(&scheme, &scheme.clone()));

        let zoomed = SchemeProps {
            view: Some(ViewTransform::new(1.5)),
            ..scheme.clone()
        };
        assert!(scheme_should_redraw(&scheme, &zoomed));
        assert!(!overlay_should_redraw(&overlay, &overlay.clone()));
    }
}
