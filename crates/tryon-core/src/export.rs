//! Flattening seam: the session hands the scene to a [`Compositor`] and
//! wraps the encoded result in an [`ExportBlob`].

use crate::element::RasterImage;
use crate::error::ExportResult;
use crate::scene::{CanvasSize, SceneGraph};

/// MIME type of exported images.
pub const PNG_MIME_TYPE: &str = "image/png";

/// Trait for rasterization backends.
///
/// `render` must draw every element in z-order (back to front) and nothing
/// else: no selection chrome. It must be deterministic for a given scene.
pub trait Compositor: Send {
    /// Flatten the scene into an RGBA8 image of
    /// [`export_dimensions`]`(canvas, pixel_ratio)`.
    fn render(&mut self, scene: &SceneGraph, canvas: CanvasSize, pixel_ratio: f64) -> ExportResult<RasterImage>;

    /// Encode a flattened image as PNG.
    fn encode_png(&self, image: &RasterImage) -> ExportResult<Vec<u8>>;
}

/// Output pixel size for a canvas at the given pixel ratio.
pub fn export_dimensions(canvas: CanvasSize, pixel_ratio: f64) -> (u32, u32) {
    let w = (canvas.width_f64() * pixel_ratio).round().max(1.0) as u32;
    let h = (canvas.height_f64() * pixel_ratio).round().max(1.0) as u32;
    (w, h)
}

/// A self-contained exported image, ready to be downloaded or written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBlob {
    pub file_name: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl ExportBlob {
    /// Size of the encoded data in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
