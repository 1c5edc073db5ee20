//! Scene construction: layout description → instantiated geometry.
//!
//! The scene is the static half of the picture. It is rebuilt only when a new
//! layout object arrives (compared by `Rc` identity, never field by field),
//! while live items and zoom merely redraw the existing scene.

use crate::catalog::{GeometryPiece, TrackKind};
use crate::config::SchemeConfig;
use crate::id::ItemId;
use crate::model::{LayoutDescription, PlacedItem};
use kurbo::{Affine, Rect};
use std::collections::HashMap;
use std::rc::Rc;

/// World extents and drawing origin of a built scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneFrame {
    pub width: f64,
    pub height: f64,
    /// Layout origin after the build-time nudge.
    pub origin_x: f64,
    pub origin_y: f64,
}

/// A recognized item together with its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenePiece {
    pub item: PlacedItem,
    pub kind: TrackKind,
    pub geometry: GeometryPiece,
}

impl ScenePiece {
    /// Local → world transform: translate to the item position, then rotate.
    pub fn placement(&self) -> Affine {
        Affine::translate((self.item.x, self.item.y)) * Affine::rotate(self.item.angle)
    }

    /// World-space bounding box.
    pub fn world_bounds(&self) -> Rect {
        self.placement().transform_rect_bbox(self.geometry.extent())
    }
}

/// Lookup entry for one layout item.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub item: PlacedItem,
    /// Index into [`Scene::pieces`], `None` when the kind is unknown.
    pub piece: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    frame: SceneFrame,
    pieces: Vec<ScenePiece>,
    placements: HashMap<ItemId, Placement>,
}

impl Scene {
    /// Scene shown while no layout is available.
    pub fn empty() -> Self {
        Self {
            frame: SceneFrame {
                width: 1.0,
                height: 1.0,
                origin_x: 0.0,
                origin_y: 0.0,
            },
            pieces: Vec::new(),
            placements: HashMap::new(),
        }
    }

    /// Instantiate geometry for every recognized item. Items whose kind is
    /// not in the catalog are kept in the lookup but produce no piece.
    pub fn build(layout: &LayoutDescription, config: &SchemeConfig) -> Self {
        let [nudge_x, nudge_y] = config.origin_nudge;
        let frame = SceneFrame {
            width: layout.width,
            height: layout.height,
            origin_x: layout.offset_x + nudge_x,
            origin_y: layout.offset_y + nudge_y,
        };

        let mut pieces = Vec::with_capacity(layout.items.len());
        let mut placements = HashMap::with_capacity(layout.items.len());

        for item in &layout.items {
            let piece = match TrackKind::from_tag(&item.kind) {
                Some(kind) => {
                    pieces.push(ScenePiece {
                        item: item.clone(),
                        kind,
                        geometry: kind.geometry(),
                    });
                    Some(pieces.len() - 1)
                }
                None => {
                    log::debug!("skipping {} with unknown kind {:?}", item.id, item.kind);
                    None
                }
            };
            let previous = placements.insert(
                item.id,
                Placement {
                    item: item.clone(),
                    piece,
                },
            );
            if previous.is_some() {
                log::debug!("duplicate item id {}, keeping the last one", item.id);
            }
        }

        log::debug!(
            "built scene: {} pieces from {} items",
            pieces.len(),
            layout.items.len()
        );

        Self {
            frame,
            pieces,
            placements,
        }
    }

    pub fn frame(&self) -> &SceneFrame {
        &self.frame
    }

    pub fn pieces(&self) -> &[ScenePiece] {
        &self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn placement(&self, id: ItemId) -> Option<&Placement> {
        self.placements.get(&id)
    }

    /// The built piece for a layout id, if its kind was recognized.
    pub fn piece_for(&self, id: ItemId) -> Option<&ScenePiece> {
        self.placement(id)
            .and_then(|placement| placement.piece)
            .map(|index| &self.pieces[index])
    }

    /// Union of all piece bounds in world units.
    pub fn world_bounds(&self) -> Option<Rect> {
        self.pieces
            .iter()
            .map(ScenePiece::world_bounds)
            .reduce(|a, b| a.union(b))
    }
}

/// Caches the scene for the last layout object it was given.
#[derive(Debug, Default)]
pub struct SceneBuilder {
    config: SchemeConfig,
    cached: Option<(Rc<LayoutDescription>, Rc<Scene>)>,
}

impl SceneBuilder {
    pub fn new(config: SchemeConfig) -> Self {
        Self {
            config,
            cached: None,
        }
    }

    /// Build the scene for `layout`, reusing the cached scene when the very
    /// same layout object is passed again.
    pub fn build(&mut self, layout: &Rc<LayoutDescription>) -> Rc<Scene> {
        if let Some((cached_layout, scene)) = &self.cached
            && Rc::ptr_eq(cached_layout, layout)
        {
            return Rc::clone(scene);
        }
        let scene = Rc::new(Scene::build(layout, &self.config));
        self.cached = Some((Rc::clone(layout), Rc::clone(&scene)));
        scene
    }

    /// Replace the configuration. A changed origin nudge invalidates the
    /// cached scene.
    pub fn set_config(&mut self, config: SchemeConfig) {
        if config.origin_nudge != self.config.origin_nudge {
            self.cached = None;
        }
        self.config = config;
    }

    /// Forget the cached scene.
    pub fn clear(&mut self) {
        self.cached = None;
    }
}
