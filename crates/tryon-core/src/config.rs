//! Tunable session parameters.

use crate::geometry::MIN_ELEMENT_SIZE;
use serde::{Deserialize, Serialize};

/// Default export file name.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "bracelet-tryon.png";

/// Parameters that control placement, interaction and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Minimum width of a resized element.
    pub min_width: f64,
    /// Minimum height of a resized element.
    pub min_height: f64,
    /// Initial overlay width as a fraction of the canvas width.
    pub overlay_width_ratio: f64,
    /// Upper bound on the initial overlay width.
    pub overlay_max_width: f64,
    /// Initial overlay top edge as a fraction of the canvas height.
    pub overlay_top_ratio: f64,
    /// Export resolution multiplier relative to the canvas.
    pub export_pixel_ratio: f64,
    /// File name attached to exported blobs.
    pub export_file_name: String,
    /// Corner resizes preserve the element's aspect ratio.
    pub keep_ratio: bool,
    /// Handle hit radius in canvas units.
    pub handle_tolerance: f64,
    /// Distance of the rotate handle above the top edge.
    pub rotate_handle_offset: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_width: MIN_ELEMENT_SIZE,
            min_height: MIN_ELEMENT_SIZE,
            overlay_width_ratio: 0.55,
            overlay_max_width: 520.0,
            overlay_top_ratio: 0.62,
            export_pixel_ratio: 2.0,
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            keep_ratio: true,
            handle_tolerance: 10.0,
            rotate_handle_offset: 50.0,
        }
    }
}

impl SessionConfig {
    /// Deserialize a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the config to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
