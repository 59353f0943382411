//! Visual elements: positioned, scaled, optionally rotated image layers.

use crate::geometry::BoundingBox;
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// An immutable, decoded RGBA8 pixel buffer (straight alpha, row-major).
///
/// Cloning is cheap: pixels are shared, never mutated after decode.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl RasterImage {
    /// Wrap an RGBA8 buffer. Returns `None` if the buffer length does not
    /// match the dimensions or either dimension is zero.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        if pixels.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self { width, height, pixels: pixels.into() })
    }

    /// A single-color image, mostly useful for tests and placeholders.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Option<Self> {
        let count = width as usize * height as usize;
        let pixels = rgba.iter().copied().cycle().take(count * 4).collect();
        Self::from_rgba8(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA value at a pixel, or `None` if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Role of an element in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// The hand photo. At most one exists and it is always bottommost.
    Background,
    /// A bracelet layered over the photo.
    Overlay,
}

/// A positioned image layer in the scene.
#[derive(Debug, Clone)]
pub struct VisualElement {
    pub(crate) id: ElementId,
    pub(crate) kind: ElementKind,
    /// Source pixels.
    pub image: RasterImage,
    /// Position, size and rotation in canvas units.
    pub bounds: BoundingBox,
    /// Whether the element can be moved by dragging its body.
    pub draggable: bool,
    /// Whether pointer interaction can select the element.
    pub selectable: bool,
}

impl VisualElement {
    /// Create the background photo layer. Never draggable or selectable.
    pub fn background(image: RasterImage, bounds: BoundingBox) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ElementKind::Background,
            image,
            bounds,
            draggable: false,
            selectable: false,
        }
    }

    /// Create an overlay layer. Draggable and selectable.
    pub fn overlay(image: RasterImage, bounds: BoundingBox) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ElementKind::Overlay,
            image,
            bounds,
            draggable: true,
            selectable: true,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn is_background(&self) -> bool {
        self.kind == ElementKind::Background
    }

    /// Intrinsic pixel width of the source image.
    pub fn intrinsic_width(&self) -> u32 {
        self.image.width()
    }

    /// Intrinsic pixel height of the source image.
    pub fn intrinsic_height(&self) -> u32 {
        self.image.height()
    }

    /// Transform mapping source image pixels onto the canvas.
    pub fn image_transform(&self) -> Affine {
        let sx = self.bounds.width / f64::from(self.image.width());
        let sy = self.bounds.height / f64::from(self.image.height());
        self.bounds.local_to_canvas() * Affine::scale_non_uniform(sx, sy)
    }

    /// Axis-aligned bounds on the canvas.
    pub fn aabb(&self) -> Rect {
        self.bounds.aabb()
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds.contains(point, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_image_rejects_bad_buffers() {
        assert!(RasterImage::from_rgba8(2, 2, vec![0; 15]).is_none());
        assert!(RasterImage::from_rgba8(0, 2, vec![]).is_none());
        assert!(RasterImage::from_rgba8(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn test_solid_pixel() {
        let img = RasterImage::solid(3, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(img.pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(img.pixel(3, 0), None);
    }

    #[test]
    fn test_background_flags() {
        let img = RasterImage::solid(4, 4, [0, 0, 0, 255]).unwrap();
        let bg = VisualElement::background(img.clone(), BoundingBox::new(0.0, 0.0, 4.0, 4.0));
        let ov = VisualElement::overlay(img, BoundingBox::new(0.0, 0.0, 4.0, 4.0));
        assert!(bg.is_background() && !bg.selectable && !bg.draggable);
        assert!(!ov.is_background() && ov.selectable && ov.draggable);
        assert_ne!(bg.id(), ov.id());
    }

    #[test]
    fn test_image_transform_maps_corners() {
        let img = RasterImage::solid(300, 300, [0, 0, 0, 255]).unwrap();
        let el = VisualElement::overlay(img, BoundingBox::new(180.0, 372.0, 440.0, 440.0));
        let t = el.image_transform();
        let tl = t * Point::new(0.0, 0.0);
        let br = t * Point::new(300.0, 300.0);
        assert!((tl.x - 180.0).abs() < 1e-9 && (tl.y - 372.0).abs() < 1e-9);
        assert!((br.x - 620.0).abs() < 1e-9 && (br.y - 812.0).abs() < 1e-9);
    }
}
