//! Colors used by the track renderer and the overlay.
//!
//! Passed explicitly to the renderers; nothing reads ambient style state.
//! Serialized as hex strings, every slot optional in JSON.

use serde::{Deserialize, Serialize};
use ts_core::{Color, LoadError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    // Ties
    pub wood: Color,
    pub grain: Color,
    pub crack: Color,
    pub tie_shadow: Color,
    pub bolt: Color,

    // Rails, dark base / bright core / highlight
    pub dark: Color,
    pub gold: Color,
    pub shine: Color,

    // Reference grid
    pub grid: Color,
    pub grid_origin: Color,

    /// Switch state indicator on the overlay.
    pub indicator: Color,

    // Locomotive marker
    pub loco_black: Color,
    pub loco_copper: Color,
    pub loco_brass: Color,
    pub loco_window: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::steampunk()
    }
}

impl Theme {
    /// Aged wood and brass rails.
    pub fn steampunk() -> Self {
        Self {
            wood: Color::rgb8(0x5C, 0x40, 0x33),
            grain: Color::rgb8(0x4A, 0x32, 0x28),
            crack: Color::rgb8(0x2E, 0x1F, 0x18),
            tie_shadow: Color::rgba8(0, 0, 0, 179),
            bolt: Color::rgb8(0x3B, 0x3B, 0x3B),
            dark: Color::rgb8(0x3D, 0x2B, 0x1F),
            gold: Color::rgb8(0xB8, 0x86, 0x0B),
            shine: Color::rgba8(0xFF, 0xF1, 0xC1, 204),
            grid: Color::rgb8(180, 180, 180),
            grid_origin: Color::rgb8(110, 110, 110),
            indicator: Color::rgb8(200, 70, 70),
            loco_black: Color::rgb8(0x1A, 0x1A, 0x1A),
            loco_copper: Color::rgb8(0xB8, 0x73, 0x33),
            loco_brass: Color::rgb8(0xD4, 0xAF, 0x37),
            loco_window: Color::rgba8(135, 206, 235, 77),
        }
    }

    /// Flat white-on-blue technical drawing.
    pub fn blueprint() -> Self {
        Self {
            wood: Color::rgb8(0x2B, 0x4F, 0x8C),
            grain: Color::rgb8(0x24, 0x44, 0x7A),
            crack: Color::rgb8(0x1E, 0x3A, 0x6B),
            tie_shadow: Color::TRANSPARENT,
            bolt: Color::rgb8(0xCF, 0xE0, 0xFF),
            dark: Color::rgb8(0xE8, 0xF0, 0xFF),
            gold: Color::rgb8(0xFF, 0xFF, 0xFF),
            shine: Color::rgba8(0xFF, 0xFF, 0xFF, 0),
            grid: Color::rgba8(0xFF, 0xFF, 0xFF, 64),
            grid_origin: Color::rgba8(0xFF, 0xFF, 0xFF, 140),
            indicator: Color::rgb8(0xFF, 0xC8, 0x3D),
            loco_black: Color::rgb8(0x0F, 0x24, 0x4A),
            loco_copper: Color::rgb8(0xCF, 0xE0, 0xFF),
            loco_brass: Color::rgb8(0xFF, 0xFF, 0xFF),
            loco_window: Color::rgba8(0xFF, 0xFF, 0xFF, 77),
        }
    }

    /// Parse a theme object; missing slots keep the steampunk defaults.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "steampunk" => Some(Self::steampunk()),
            "blueprint" => Some(Self::blueprint()),
            _ => None,
        }
    }
}
