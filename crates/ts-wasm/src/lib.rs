//! WASM bridge for the track scheme: draws a layout and the live state of
//! its switches into two stacked HTML canvases.
//!
//! Compiled via `wasm-pack build --target web`. The host page polls the
//! layout and live-item endpoints and hands the JSON bodies to
//! [`SchemeView`]; everything else (sizing, zoom, frame scheduling) happens
//! here.

mod canvas2d;
mod logger;
mod surface;

use canvas2d::CanvasTarget;
use log::LevelFilter;
use std::cell::RefCell;
use std::rc::Rc;
use surface::CanvasSurface;
use ts_core::{LayoutDescription, Scene, SchemeConfig, SchemeState, ViewTransform};
use ts_render::{OverlayRenderer, SchemeRenderer, Theme, render_svg};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, HtmlElement, ResizeObserver, WheelEvent};

// ─── Shared state ────────────────────────────────────────────────────────

/// DOM callbacks owned while mounted.
struct Listeners {
    wheel: Closure<dyn FnMut(WheelEvent)>,
    _resize: Closure<dyn FnMut(js_sys::Array)>,
    observer: ResizeObserver,
}

/// DOM binding of a [`SchemeState`]: the DOM callbacks and the exported
/// methods share it.
struct Shared {
    container: HtmlElement,
    scheme: CanvasSurface,
    overlay: CanvasSurface,
    state: SchemeState,
    renderer: SchemeRenderer,
    overlay_renderer: OverlayRenderer,
    /// Handle of the scheduled animation frame.
    frame: Option<i32>,
    /// Cleared on unmount; stale frame and DOM callbacks check it.
    alive: bool,
    listeners: Option<Listeners>,
}

impl Shared {
    fn new(
        container: HtmlElement,
        scheme: CanvasSurface,
        overlay: CanvasSurface,
        seed: u64,
    ) -> Self {
        let config = SchemeConfig::default();
        let theme = Theme::default();
        Self {
            container,
            scheme,
            overlay,
            state: SchemeState::new(config.clone()),
            renderer: SchemeRenderer::new(theme.clone(), config, seed),
            overlay_renderer: OverlayRenderer::new(theme),
            frame: None,
            alive: false,
            listeners: None,
        }
    }

    /// Logical size of the drawing box.
    fn box_size(&self) -> (f64, f64) {
        match self.scheme.state().metrics() {
            Some(metrics) => (metrics.width, metrics.height),
            None => {
                let (width, height, _) = surface::measure(&self.container);
                (width, height)
            }
        }
    }

    fn current_view(&mut self) -> ViewTransform {
        let (width, height) = self.box_size();
        self.state.current_view(width, height)
    }

    /// Request redraws for the surfaces whose inputs changed. Returns `true`
    /// when a frame must be scheduled.
    fn invalidate(&mut self) -> bool {
        let redraw = self.state.pending_redraws();
        let mut schedule = false;
        if redraw.scheme {
            schedule |= self.scheme.request_redraw();
        }
        if redraw.overlay {
            schedule |= self.overlay.request_redraw();
        }
        schedule
    }

    fn set_config(&mut self, config: SchemeConfig) {
        self.renderer.set_config(config.clone());
        self.state.set_config(config);
    }

    fn set_theme(&mut self, theme: Theme) {
        self.overlay_renderer.set_theme(theme.clone());
        self.renderer.set_theme(theme);
        self.state.invalidate_all();
    }

    /// Returns `true` when the committed scale changed.
    fn wheel(&mut self, delta_y: f64) -> bool {
        let (width, height) = self.box_size();
        self.state.wheel(delta_y, width, height)
    }

    /// Returns `true` when a frame must be scheduled.
    fn resize(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        let (width, height, dpr) = surface::measure(&self.container);
        let scheme = self.scheme.resize(width, height, dpr);
        let overlay = self.overlay.resize(width, height, dpr);
        scheme || overlay
    }

    fn on_frame(&mut self) {
        self.frame = None;
        if !self.alive {
            return;
        }
        let view = self.current_view();

        if let Some((metrics, ctx)) = self.scheme.begin_frame() {
            let mut target = CanvasTarget::new(ctx);
            let stats = self
                .renderer
                .draw(&mut target, &metrics, self.state.scene(), view);
            log::debug!(
                "scheme drawn: {} pieces, {} sleepers at scale {:.3}",
                stats.pieces,
                stats.sleepers,
                view.scale
            );
            self.state.mark_scheme_drawn();
        }

        if let Some((metrics, ctx)) = self.overlay.begin_frame() {
            let mut target = CanvasTarget::new(ctx);
            let drawn = self.overlay_renderer.draw(
                &mut target,
                &metrics,
                self.state.scene(),
                self.state.live(),
                view,
            );
            log::trace!("overlay drawn: {drawn} indicators");
            self.state.mark_overlay_drawn();
        }
    }
}

// ─── Scheduling ──────────────────────────────────────────────────────────

/// Run `f` on the shared state, then schedule a frame if any surface needs
/// one.
fn update<R>(shared: &Rc<RefCell<Shared>>, f: impl FnOnce(&mut Shared) -> R) -> R {
    let (result, schedule) = {
        let mut guard = shared.borrow_mut();
        let result = f(&mut guard);
        (result, guard.invalidate())
    };
    if schedule {
        schedule_frame(shared);
    }
    result
}

/// Request one animation frame for both surfaces unless one is pending.
fn schedule_frame(shared: &Rc<RefCell<Shared>>) {
    let mut state = shared.borrow_mut();
    if !state.alive || state.frame.is_some() {
        return;
    }
    let Some(window) = web_sys::window() else {
        log::warn!("no window: cannot schedule a frame");
        return;
    };
    let weak = Rc::downgrade(shared);
    let callback = Closure::once_into_js(move |_timestamp: f64| {
        if let Some(shared) = weak.upgrade() {
            shared.borrow_mut().on_frame();
        }
    });
    match window.request_animation_frame(callback.unchecked_ref()) {
        Ok(handle) => state.frame = Some(handle),
        Err(err) => log::warn!("requestAnimationFrame failed: {err:?}"),
    }
}

fn attach_listeners(
    shared: &Rc<RefCell<Shared>>,
    container: &HtmlElement,
) -> Result<Listeners, JsValue> {
    let weak = Rc::downgrade(shared);
    let resize = Closure::<dyn FnMut(js_sys::Array)>::new(move |_entries: js_sys::Array| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let schedule = shared.borrow_mut().resize();
        if schedule {
            schedule_frame(&shared);
        }
    });
    let observer = ResizeObserver::new(resize.as_ref().unchecked_ref())?;

    let weak = Rc::downgrade(shared);
    let wheel = Closure::<dyn FnMut(WheelEvent)>::new(move |event: WheelEvent| {
        if let Some(shared) = weak.upgrade() {
            update(&shared, |shared| shared.alive && shared.wheel(event.delta_y()));
        }
    });
    // Nothing is registered until every fallible step has succeeded.
    container.add_event_listener_with_callback("wheel", wheel.as_ref().unchecked_ref())?;
    observer.observe(container);

    Ok(Listeners {
        wheel,
        _resize: resize,
        observer,
    })
}

// ─── Exported controller ─────────────────────────────────────────────────

/// Live track scheme bound to a container and its two canvases: the track
/// below, the switch overlay above.
#[wasm_bindgen]
pub struct SchemeView {
    shared: Rc<RefCell<Shared>>,
}

#[wasm_bindgen]
impl SchemeView {
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: HtmlElement,
        scheme_canvas: HtmlCanvasElement,
        overlay_canvas: HtmlCanvasElement,
    ) -> Result<SchemeView, JsValue> {
        console_error_panic_hook_setup();
        logger::install(LevelFilter::Warn);

        let scheme = CanvasSurface::new(scheme_canvas)?;
        let overlay = CanvasSurface::new(overlay_canvas)?;
        let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
        let shared = Shared::new(container, scheme, overlay, seed);
        Ok(Self {
            shared: Rc::new(RefCell::new(shared)),
        })
    }

    /// Size both canvases to the container, start listening for wheel and
    /// resize events and schedule the first draw.
    pub fn mount(&self) -> Result<(), JsValue> {
        let schedule = {
            let mut shared = self.shared.borrow_mut();
            if shared.alive {
                return Ok(());
            }
            let container = shared.container.clone();
            shared.listeners = Some(attach_listeners(&self.shared, &container)?);
            shared.alive = true;
            shared.state.invalidate_all();

            let (width, height, dpr) = surface::measure(&container);
            let scheme = shared.scheme.mount(width, height, dpr);
            let overlay = shared.overlay.mount(width, height, dpr);
            scheme || overlay
        };
        if schedule {
            schedule_frame(&self.shared);
        }
        Ok(())
    }

    /// Stop listening, cancel any pending frame and leave the canvases as
    /// they are.
    pub fn unmount(&self) {
        let mut shared = self.shared.borrow_mut();
        if !shared.alive {
            log::debug!("unmount on a scheme that is not mounted");
            return;
        }
        shared.alive = false;
        let scheme_pending = shared.scheme.unmount();
        let overlay_pending = shared.overlay.unmount();
        if let Some(handle) = shared.frame.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(handle);
            }
        } else if scheme_pending || overlay_pending {
            log::debug!("surface frame pending without a scheduled callback");
        }
        if let Some(listeners) = shared.listeners.take() {
            let _ = shared
                .container
                .remove_event_listener_with_callback("wheel", listeners.wheel.as_ref().unchecked_ref());
            listeners.observer.disconnect();
        }
    }

    /// Load a polled layout body. Returns JSON: `{"ok":true}` or
    /// `{"ok":false,"error":"..."}`; on failure the scheme is emptied.
    #[wasm_bindgen(js_name = setLayoutJson)]
    pub fn set_layout_json(&self, json: &str) -> String {
        update(&self.shared, |shared| status(shared.state.load_layout_json(json)))
    }

    /// Load a polled live-item body. On failure no switch states are shown.
    #[wasm_bindgen(js_name = setLiveItemsJson)]
    pub fn set_live_items_json(&self, json: &str) -> String {
        update(&self.shared, |shared| status(shared.state.load_live_json(json)))
    }

    /// Replace the engine configuration. A rejected configuration leaves the
    /// current one in place.
    #[wasm_bindgen(js_name = setConfigJson)]
    pub fn set_config_json(&self, json: &str) -> String {
        update(&self.shared, |shared| match SchemeConfig::from_json(json) {
            Ok(config) => {
                shared.set_config(config);
                status_ok()
            }
            Err(err) => {
                log::warn!("configuration rejected: {err}");
                status_error(&err.to_string())
            }
        })
    }

    /// Replace the colors with a theme object, or with a preset when `json`
    /// is a preset name (`steampunk`, `blueprint`).
    #[wasm_bindgen(js_name = setThemeJson)]
    pub fn set_theme_json(&self, json: &str) -> String {
        let theme = match Theme::preset(json.trim()) {
            Some(theme) => Ok(theme),
            None => Theme::from_json(json),
        };
        update(&self.shared, |shared| match theme {
            Ok(theme) => {
                shared.set_theme(theme);
                status_ok()
            }
            Err(err) => {
                log::warn!("theme rejected: {err}");
                status_error(&err.to_string())
            }
        })
    }

    /// Feed a wheel delta from a host-managed listener. Returns `true` when
    /// the scale was committed and a redraw scheduled.
    pub fn wheel(&self, delta_y: f64) -> bool {
        update(&self.shared, |shared| shared.wheel(delta_y))
    }

    /// Committed scale, once the view has been fitted.
    pub fn scale(&self) -> Option<f64> {
        self.shared.borrow().state.view().map(|view| view.scale)
    }

    /// The current scheme and switch states as a standalone SVG document.
    #[wasm_bindgen(js_name = exportSvg)]
    pub fn export_svg(&self) -> String {
        let mut guard = self.shared.borrow_mut();
        let view = guard.current_view();
        let shared = &mut *guard;
        render_svg(
            &mut shared.renderer,
            &shared.overlay_renderer,
            shared.state.scene(),
            shared.state.live(),
            view,
        )
    }
}

impl Drop for SchemeView {
    fn drop(&mut self) {
        self.unmount();
    }
}

// ─── Panic hook and logging ──────────────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Track scheme WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

/// Set the console log level (`off`, `error`, `warn`, `info`, `debug`,
/// `trace`).
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) {
    logger::set_level(logger::parse_level(level));
}

// ─── Standalone validation (no canvas needed) ────────────────────────────

/// Check a layout body. Returns JSON: `{"ok":true,"pieces":N}` with the
/// number of drawable pieces, or `{"ok":false,"error":"..."}`.
#[wasm_bindgen(js_name = validateLayout)]
pub fn validate_layout(json: &str) -> String {
    match LayoutDescription::from_json(json) {
        Ok(layout) => {
            let pieces = Scene::build(&layout, &SchemeConfig::default()).len();
            format!(r#"{{"ok":true,"pieces":{pieces}}}"#)
        }
        Err(err) => status_error(&err.to_string()),
    }
}

fn status(result: Result<(), ts_core::LoadError>) -> String {
    match result {
        Ok(()) => status_ok(),
        Err(err) => status_error(&err.to_string()),
    }
}

fn status_ok() -> String {
    r#"{"ok":true}"#.to_string()
}

fn status_error(message: &str) -> String {
    let escaped = message.replace('\\', "\\\\").replace('"', "\\\"");
    format!(r#"{{"ok":false,"error":"{escaped}"}}"#)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_status_is_escaped_json() {
        let status = status_error(r#"expected "," at C:\layout"#);
        let value: serde_json::Value = serde_json::from_str(&status).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"], r#"expected "," at C:\layout"#);
    }

    #[test]
    fn validate_counts_drawable_pieces() {
        let status = validate_layout(
            r#"{
                "width": 1000, "height": 500, "offsetX": 0, "offsetY": 0,
                "items": [
                    { "id": 1, "type": "G231", "x": 0, "y": 0, "angle": 0 },
                    { "id": 2, "type": "SIGNAL_BRIDGE", "x": 10, "y": 0, "angle": 0 }
                ]
            }"#,
        );
        assert_eq!(status, r#"{"ok":true,"pieces":1}"#);

        let value: serde_json::Value = serde_json::from_str(&validate_layout("{")).unwrap();
        assert_eq!(value["ok"], false);
    }
}
