//! Engine configuration.
//!
//! Every field has a default, so a partial JSON object (or `{}`) is a valid
//! configuration. Colors live in the renderer's theme, not here.

use crate::error::LoadError;
use serde::{Deserialize, Serialize};

// ─── Zoom ─────────────────────────────────────────────────────────────────

/// Wheel-zoom tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoomConfig {
    /// Scale change per wheel delta unit, relative to the current scale.
    /// Default: **0.001**.
    pub sensitivity: f64,

    /// Absolute difference between the pending and the committed scale
    /// required before the new scale is committed and a redraw is issued.
    /// Default: **0.05**.
    pub threshold: f64,

    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.001,
            threshold: 0.05,
            min_scale: 0.02,
            max_scale: 50.0,
        }
    }
}

// ─── Scheme ───────────────────────────────────────────────────────────────

/// Configuration shared by the scene builder and both surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemeConfig {
    /// Reference grid spacing in world units. Default: **150**.
    pub grid_spacing: f64,

    /// Shift applied once to the layout origin when the scene is built, so
    /// pieces placed on the layout edge are not clipped. Default: **(30, -30)**.
    pub origin_nudge: [f64; 2],

    pub zoom: ZoomConfig,

    /// Draw a top-down locomotive on every straight piece. Default: **false**.
    pub show_locomotives: bool,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            grid_spacing: 150.0,
            origin_nudge: [30.0, -30.0],
            zoom: ZoomConfig::default(),
            show_locomotives: false,
        }
    }
}

impl SchemeConfig {
    /// Parse a configuration object; missing fields keep their defaults.
    ///
    /// # Errors
    /// Malformed JSON or values the engine cannot work with.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let config: SchemeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        let zoom = &self.zoom;
        if !(self.grid_spacing > 0.0) {
            return Err(LoadError::InvalidConfig(format!(
                "gridSpacing must be positive, got {}",
                self.grid_spacing
            )));
        }
        if !(zoom.sensitivity > 0.0) || !(zoom.threshold >= 0.0) {
            return Err(LoadError::InvalidConfig(
                "zoom sensitivity must be positive and threshold non-negative".to_string(),
            ));
        }
        if !(zoom.min_scale > 0.0 && zoom.min_scale <= zoom.max_scale) {
            return Err(LoadError::InvalidConfig(format!(
                "zoom range {}..{} is empty",
                zoom.min_scale, zoom.max_scale
            )));
        }
        Ok(())
    }
}
