//! Input data model: the static layout description and the polled live items.
//!
//! Both arrive as JSON from the backend. The layout is loaded once and then
//! treated as immutable; live items are replaced wholesale on every poll.

use crate::error::LoadError;
use crate::id::ItemId;
use serde::{Deserialize, Serialize};

// ─── Layout ──────────────────────────────────────────────────────────────

/// One track piece placed on the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub id: ItemId,
    /// Catalog kind tag, e.g. `G239` or `SWITCH_R2_RIGHT`. Unknown tags are
    /// kept here and skipped by the scene builder.
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    /// Rotation in radians, counter-clockwise in world units.
    #[serde(default)]
    pub angle: f64,
}

/// The full layout: world extents, drawing origin and placed items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDescription {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
    #[serde(default)]
    pub items: Vec<PlacedItem>,
}

impl LayoutDescription {
    /// Parse and validate a layout from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let layout: LayoutDescription = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        // Written so that NaN extents are rejected too.
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(LoadError::InvalidExtent {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

// ─── Live items ──────────────────────────────────────────────────────────

/// Equipment category reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemType {
    Train,
    Switch,
    Semaphore,
    #[serde(other)]
    Other,
}

impl ItemType {
    /// Whether items of this type carry a state drawn on the overlay.
    pub fn is_state_visualizable(&self) -> bool {
        matches!(self, ItemType::Switch)
    }
}

/// Raw state value as sent by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Flag(bool),
    Code(i64),
    Name(String),
}

/// Switch position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SwitchState {
    #[default]
    Normal,
    Diverging,
}

impl From<&StateValue> for SwitchState {
    fn from(value: &StateValue) -> Self {
        let diverging = match value {
            StateValue::Flag(flag) => *flag,
            StateValue::Code(code) => *code != 0,
            StateValue::Name(name) => matches!(
                name.to_ascii_uppercase().as_str(),
                "DIVERGING" | "THROWN" | "REVERSE" | "TRUE" | "1"
            ),
        };
        if diverging {
            SwitchState::Diverging
        } else {
            SwitchState::Normal
        }
    }
}

/// One entry of the polled live item list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveItem {
    pub id: ItemId,
    pub item_type: ItemType,
    #[serde(default)]
    pub state: Option<StateValue>,
}

impl LiveItem {
    /// The switch position this item reports; a missing state reads as Normal.
    pub fn switch_state(&self) -> SwitchState {
        self.state.as_ref().map(SwitchState::from).unwrap_or_default()
    }
}

/// Parse a live item list from its JSON array form.
pub fn parse_live_items(json: &str) -> Result<Vec<LiveItem>, LoadError> {
    Ok(serde_json::from_str(json)?)
}
