//! DOM binding of [`SurfaceState`]: one `<canvas>` sized to its container.

use ts_core::{SurfaceMetrics, SurfaceState};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement};

/// Container box in CSS pixels and the device pixel ratio.
pub fn measure(container: &Element) -> (f64, f64, f64) {
    let rect = container.get_bounding_client_rect();
    let dpr = web_sys::window()
        .map(|window| window.device_pixel_ratio())
        .unwrap_or(1.0);
    (rect.width(), rect.height(), dpr)
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    state: SurfaceState,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            canvas,
            ctx,
            state: SurfaceState::new(),
        })
    }

    pub fn state(&self) -> &SurfaceState {
        &self.state
    }

    /// Returns `true` when a frame must be scheduled.
    pub fn mount(&mut self, width: f64, height: f64, dpr: f64) -> bool {
        let schedule = self.state.mount(width, height, dpr);
        if let Some(metrics) = self.state.metrics() {
            self.apply_backing(&metrics);
        }
        schedule
    }

    /// Returns `true` when the backing size changed and a frame must be
    /// scheduled.
    pub fn resize(&mut self, width: f64, height: f64, dpr: f64) -> bool {
        match self.state.resize(width, height, dpr) {
            Some(metrics) => {
                self.apply_backing(&metrics);
                self.state.request_redraw()
            }
            None => false,
        }
    }

    pub fn request_redraw(&mut self) -> bool {
        self.state.request_redraw()
    }

    /// Metrics and context for a due frame. `None` when no redraw was
    /// requested or the canvas can no longer be drawn to.
    pub fn begin_frame(&mut self) -> Option<(SurfaceMetrics, &CanvasRenderingContext2d)> {
        if !self.state.frame_pending() {
            return None;
        }
        let metrics = self.state.begin_frame()?;
        if !self.canvas.is_connected() {
            log::debug!("skipping frame: canvas is detached");
            return None;
        }
        Some((metrics, &self.ctx))
    }

    /// Returns `true` when this surface still had a frame pending.
    pub fn unmount(&mut self) -> bool {
        self.state.unmount()
    }

    // Resizing the backing store also resets the context state.
    fn apply_backing(&self, metrics: &SurfaceMetrics) {
        self.canvas.set_width(metrics.pixel_width);
        self.canvas.set_height(metrics.pixel_height);
        log::debug!(
            "canvas backing {}x{} (dpr {})",
            metrics.pixel_width,
            metrics.pixel_height,
            metrics.dpr
        );
    }
}
