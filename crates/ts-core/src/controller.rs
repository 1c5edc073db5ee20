//! Platform-free state of a live scheme view.
//!
//! Holds the loaded layout, the scene built from it, the latest live items
//! and the zoom, and remembers what each surface last drew. A host feeds it
//! polled JSON bodies and wheel input, asks [`SchemeState::pending_redraws`]
//! which surfaces must be redrawn, and reports finished draws back.

use crate::config::SchemeConfig;
use crate::error::LoadError;
use crate::model::{LayoutDescription, LiveItem, parse_live_items};
use crate::scene::{Scene, SceneBuilder};
use crate::surface::{OverlayProps, SchemeProps, overlay_should_redraw, scheme_should_redraw};
use crate::view::{ViewTransform, ZoomController};
use std::rc::Rc;

/// Surfaces whose inputs changed since their last draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Redraw {
    pub scheme: bool,
    pub overlay: bool,
}

impl Redraw {
    pub fn any(&self) -> bool {
        self.scheme || self.overlay
    }
}

#[derive(Debug)]
pub struct SchemeState {
    builder: SceneBuilder,
    config: SchemeConfig,
    /// Last layout that loaded; `None` before the first one or after a
    /// failed poll.
    layout: Option<Rc<LayoutDescription>>,
    scene: Rc<Scene>,
    live: Rc<Vec<LiveItem>>,
    zoom: ZoomController,
    drawn_scheme: Option<SchemeProps>,
    drawn_overlay: Option<OverlayProps>,
}

impl Default for SchemeState {
    fn default() -> Self {
        Self::new(SchemeConfig::default())
    }
}

impl SchemeState {
    pub fn new(config: SchemeConfig) -> Self {
        Self {
            builder: SceneBuilder::new(config.clone()),
            zoom: ZoomController::new(config.zoom.clone()),
            config,
            layout: None,
            scene: Rc::new(Scene::empty()),
            live: Rc::new(Vec::new()),
            drawn_scheme: None,
            drawn_overlay: None,
        }
    }

    pub fn config(&self) -> &SchemeConfig {
        &self.config
    }

    pub fn has_layout(&self) -> bool {
        self.layout.is_some()
    }

    pub fn scene(&self) -> &Rc<Scene> {
        &self.scene
    }

    pub fn live(&self) -> &Rc<Vec<LiveItem>> {
        &self.live
    }

    /// The committed view, once fitted.
    pub fn view(&self) -> Option<ViewTransform> {
        self.zoom.view()
    }

    // ─── Inputs ──────────────────────────────────────────────────────────

    /// Load a polled layout body. A malformed body empties the scene.
    pub fn load_layout_json(&mut self, json: &str) -> Result<(), LoadError> {
        match LayoutDescription::from_json(json) {
            Ok(layout) => {
                self.set_layout(Some(layout));
                Ok(())
            }
            Err(err) => {
                log::warn!("layout rejected, showing an empty scheme: {err}");
                self.set_layout(None);
                Err(err)
            }
        }
    }

    /// Load a polled live-item body. A malformed body clears the live items.
    pub fn load_live_json(&mut self, json: &str) -> Result<(), LoadError> {
        match parse_live_items(json) {
            Ok(items) => {
                self.set_live(items);
                Ok(())
            }
            Err(err) => {
                log::warn!("live items rejected, hiding switch states: {err}");
                self.set_live(Vec::new());
                Err(err)
            }
        }
    }

    /// Replace the layout. An equal layout keeps the current scene object,
    /// so a re-poll of unchanged data redraws nothing.
    pub fn set_layout(&mut self, layout: Option<LayoutDescription>) {
        let unchanged = match (&layout, &self.layout) {
            (Some(next), Some(current)) => next == current.as_ref(),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        match layout {
            Some(next) => {
                let layout = Rc::new(next);
                self.scene = self.builder.build(&layout);
                log::debug!("layout loaded: {} pieces", self.scene.len());
                self.layout = Some(layout);
            }
            None => {
                self.builder.clear();
                self.scene = Rc::new(Scene::empty());
                self.layout = None;
            }
        }
    }

    /// Replace the live items. An equal list keeps the current object.
    pub fn set_live(&mut self, live: Vec<LiveItem>) {
        if live != *self.live {
            self.live = Rc::new(live);
        }
    }

    /// Replace the configuration; both surfaces redraw.
    pub fn set_config(&mut self, config: SchemeConfig) {
        self.builder.set_config(config.clone());
        self.zoom.set_config(config.zoom.clone());
        if let Some(layout) = &self.layout {
            self.scene = self.builder.build(layout);
        }
        self.config = config;
        self.invalidate_all();
    }

    /// Apply one wheel event for a drawing box of the given logical size.
    /// Returns `true` when the committed scale changed. Ignored until a
    /// layout has loaded.
    pub fn wheel(&mut self, delta_y: f64, box_width: f64, box_height: f64) -> bool {
        if self.layout.is_none() {
            return false;
        }
        let frame = *self.scene.frame();
        self.zoom
            .wheel(delta_y, || ViewTransform::fit(box_width, box_height, &frame))
    }

    /// View to draw with. The scale is fitted to the box once a layout is
    /// known; until then a unit scale is used without committing it.
    pub fn current_view(&mut self, box_width: f64, box_height: f64) -> ViewTransform {
        if self.layout.is_none() {
            return self.zoom.view().unwrap_or(ViewTransform::new(1.0));
        }
        let frame = *self.scene.frame();
        self.zoom
            .ensure_fitted(|| ViewTransform::fit(box_width, box_height, &frame))
    }

    // ─── Redraw bookkeeping ──────────────────────────────────────────────

    /// Compare current inputs with what each surface last drew.
    pub fn pending_redraws(&self) -> Redraw {
        let view = self.zoom.view();
        let scheme = SchemeProps {
            scene: Rc::clone(&self.scene),
            view,
        };
        let overlay = OverlayProps {
            scene: Rc::clone(&self.scene),
            live: Rc::clone(&self.live),
            view,
        };
        Redraw {
            scheme: self
                .drawn_scheme
                .as_ref()
                .is_none_or(|prev| scheme_should_redraw(prev, &scheme)),
            overlay: self
                .drawn_overlay
                .as_ref()
                .is_none_or(|prev| overlay_should_redraw(prev, &overlay)),
        }
    }

    /// Forget what was drawn so both surfaces redraw, e.g. after a theme
    /// change.
    pub fn invalidate_all(&mut self) {
        self.drawn_scheme = None;
        self.drawn_overlay = None;
    }

    pub fn mark_scheme_drawn(&mut self) {
        self.drawn_scheme = Some(SchemeProps {
            scene: Rc::clone(&self.scene),
            view: self.zoom.view(),
        });
    }

    pub fn mark_overlay_drawn(&mut self) {
        self.drawn_overlay = Some(OverlayProps {
            scene: Rc::clone(&self.scene),
            live: Rc::clone(&self.live),
            view: self.zoom.view(),
        });
    }
}
