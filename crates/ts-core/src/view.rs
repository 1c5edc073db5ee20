//! View transform and wheel zoom.
//!
//! World units are Y-up; surfaces are Y-down. The flip lives here, in
//! [`ViewTransform::world_affine`], and is applied once per draw pass.

use crate::config::ZoomConfig;
use crate::scene::SceneFrame;
use kurbo::Affine;

/// Current world → logical-pixel mapping, shared by every surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f64,
}

impl ViewTransform {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    /// Largest scale at which the whole layout fits the container box.
    pub fn fit(box_width: f64, box_height: f64, frame: &SceneFrame) -> Self {
        let scale = (box_width / frame.width).min(box_height / frame.height);
        if scale.is_finite() && scale > 0.0 {
            Self { scale }
        } else {
            Self { scale: 1.0 }
        }
    }

    /// World → logical-pixel transform: scale with the Y axis flipped, then
    /// move the layout origin into place.
    pub fn world_affine(&self, frame: &SceneFrame) -> Affine {
        let s = self.scale;
        Affine::scale_non_uniform(s, -s)
            * Affine::translate((frame.origin_x, -frame.height + frame.origin_y))
    }
}

// ─── Zoom ─────────────────────────────────────────────────────────────────

/// Accumulates wheel input and commits a new scale only once the change is
/// large enough to be worth a redraw.
#[derive(Debug, Clone, Default)]
pub struct ZoomController {
    view: Option<ViewTransform>,
    pending: f64,
    config: ZoomConfig,
}

impl ZoomController {
    pub fn new(config: ZoomConfig) -> Self {
        Self {
            view: None,
            pending: 0.0,
            config,
        }
    }

    /// The committed view, if one has been established yet.
    pub fn view(&self) -> Option<ViewTransform> {
        self.view
    }

    pub fn set_config(&mut self, config: ZoomConfig) {
        self.config = config;
        if let Some(view) = self.view {
            let scale = self.clamp(view.scale);
            self.view = Some(ViewTransform::new(scale));
            self.pending = scale;
        }
    }

    /// Return the committed view, fitting it with `fit` on first use.
    pub fn ensure_fitted(&mut self, fit: impl FnOnce() -> ViewTransform) -> ViewTransform {
        match self.view {
            Some(view) => view,
            None => {
                let view = ViewTransform::new(self.clamp(fit().scale));
                self.view = Some(view);
                self.pending = view.scale;
                view
            }
        }
    }

    /// Apply one wheel event. Returns `true` when the committed scale changed
    /// and both surfaces must redraw.
    pub fn wheel(&mut self, delta_y: f64, fit: impl FnOnce() -> ViewTransform) -> bool {
        let committed = self.ensure_fitted(fit).scale;
        let pending = self.pending + self.pending * self.config.sensitivity * -delta_y;
        self.pending = self.clamp(pending);

        // A clamp bound is committed even when the last step to it is small.
        let at_bound = self.pending != committed
            && (self.pending == self.config.min_scale || self.pending == self.config.max_scale);
        if at_bound || (committed - self.pending).abs() >= self.config.threshold {
            log::trace!("zoom {committed:.3} -> {:.3}", self.pending);
            self.view = Some(ViewTransform::new(self.pending));
            true
        } else {
            false
        }
    }

    /// Drop the committed view so the next render fits again.
    pub fn reset(&mut self) {
        self.view = None;
        self.pending = 0.0;
    }

    fn clamp(&self, scale: f64) -> f64 {
        if scale.is_finite() {
            scale.clamp(self.config.min_scale, self.config.max_scale)
        } else {
            self.config.min_scale
        }
    }
}
