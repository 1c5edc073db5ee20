use thiserror::Error;

/// Failure to load one of the externally supplied inputs.
///
/// None of these are fatal to rendering: callers fall back to an empty
/// dataset and draw an empty scene.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("layout extent must be positive, got {width} x {height}")]
    InvalidExtent { width: f64, height: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
