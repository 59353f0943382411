//! tiny-skia implementation of the flattening seam.

use crate::decode::encode_png;
use crate::error::{RenderError, RenderResult};
use kurbo::Affine;
use std::collections::HashMap;
use tiny_skia::{Color, ColorU8, FilterQuality, Pixmap, PixmapPaint, Transform};
use tryon_core::error::ExportResult;
use tryon_core::{export_dimensions, CanvasSize, Compositor, ElementId, RasterImage, SceneGraph};

/// Convert a kurbo affine to a tiny-skia transform.
pub fn to_skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

/// Copy a straight-alpha RGBA image into a premultiplied pixmap.
pub fn raster_to_pixmap(image: &RasterImage) -> RenderResult<Pixmap> {
    let mut pixmap =
        Pixmap::new(image.width(), image.height()).ok_or(RenderError::Allocation(image.width(), image.height()))?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels().chunks_exact(4)) {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Ok(pixmap)
}

/// Copy a premultiplied pixmap out as a straight-alpha RGBA image.
pub fn pixmap_to_raster(pixmap: &Pixmap) -> RenderResult<RasterImage> {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RasterImage::from_rgba8(pixmap.width(), pixmap.height(), data)
        .ok_or(RenderError::Allocation(pixmap.width(), pixmap.height()))
}

/// CPU compositor that draws scene elements with bilinear sampling.
///
/// Source pixmaps are cached per element; element images never change
/// after insertion so entries only need pruning, not invalidation.
pub struct SkiaCompositor {
    /// Color the output is cleared to before drawing (None = transparent).
    clear_color: Option<[u8; 4]>,
    quality: FilterQuality,
    image_cache: HashMap<ElementId, Pixmap>,
}

impl Default for SkiaCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl SkiaCompositor {
    pub fn new() -> Self {
        Self {
            clear_color: None,
            quality: FilterQuality::Bilinear,
            image_cache: HashMap::new(),
        }
    }

    /// Clear exports to an opaque color instead of transparency.
    pub fn with_background(mut self, rgba: [u8; 4]) -> Self {
        self.clear_color = Some(rgba);
        self
    }

    /// Number of cached source pixmaps.
    pub fn cached_images(&self) -> usize {
        self.image_cache.len()
    }

    /// Clear `target` and draw every element in z-order, mapped through `view`.
    pub fn draw_elements(&mut self, target: &mut Pixmap, scene: &SceneGraph, view: Affine) -> RenderResult<()> {
        match self.clear_color {
            Some([r, g, b, a]) => target.fill(Color::from_rgba8(r, g, b, a)),
            None => target.fill(Color::TRANSPARENT),
        }

        self.image_cache.retain(|id, _| scene.get(*id).is_some());

        let paint = PixmapPaint {
            quality: self.quality,
            ..PixmapPaint::default()
        };
        for element in scene.elements_ordered() {
            let source = match self.image_cache.entry(element.id()) {
                std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
                std::collections::hash_map::Entry::Vacant(entry) => entry.insert(raster_to_pixmap(&element.image)?),
            };
            let transform = to_skia_transform(view * element.image_transform());
            target.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
        }
        Ok(())
    }
}

impl Compositor for SkiaCompositor {
    fn render(&mut self, scene: &SceneGraph, canvas: CanvasSize, pixel_ratio: f64) -> ExportResult<RasterImage> {
        let (width, height) = export_dimensions(canvas, pixel_ratio);
        let mut target = Pixmap::new(width, height).ok_or(RenderError::Allocation(width, height))?;
        self.draw_elements(&mut target, scene, Affine::scale(pixel_ratio))?;
        log::debug!("Flattened {} element(s) into {}x{}", scene.len(), width, height);
        Ok(pixmap_to_raster(&target)?)
    }

    fn encode_png(&self, image: &RasterImage) -> ExportResult<Vec<u8>> {
        Ok(encode_png(image)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tryon_core::{BoundingBox, SessionConfig};

    const SKIN: [u8; 4] = [210, 170, 140, 255];
    const GOLD: [u8; 4] = [230, 200, 60, 255];

    /// Bilinear sampling of a solid source may be off by one per channel.
    fn assert_close(actual: Option<[u8; 4]>, expected: [u8; 4]) {
        let actual = actual.expect("pixel in bounds");
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!(a.abs_diff(*e) <= 1, "{:?} != {:?}", actual, expected);
        }
    }

    fn scene() -> (SceneGraph, ElementId, CanvasSize) {
        let canvas = CanvasSize::new(800, 600).unwrap();
        let mut scene = SceneGraph::new();
        scene.set_background(RasterImage::solid(160, 120, SKIN).unwrap(), canvas);
        let id = scene
            .add_overlay(RasterImage::solid(30, 30, GOLD).unwrap(), canvas, &SessionConfig::default())
            .unwrap();
        (scene, id, canvas)
    }

    #[test]
    fn test_render_dimensions_and_layers() {
        let (scene, _, canvas) = scene();
        let mut compositor = SkiaCompositor::new();
        let out = compositor.render(&scene, canvas, 2.0).unwrap();
        assert_eq!((out.width(), out.height()), (1600, 1200));
        assert_close(out.pixel(100, 100), SKIN);
        // Overlay covers (180..620, 372..) in canvas units.
        assert_close(out.pixel(800, 1000), GOLD);
        assert_eq!(compositor.cached_images(), 2);
    }

    #[test]
    fn test_render_is_deterministic() {
        let (scene, _, canvas) = scene();
        let a = SkiaCompositor::new().render(&scene, canvas, 2.0).unwrap();
        let b = SkiaCompositor::new().render(&scene, canvas, 2.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_uncovered_area_is_transparent() {
        let canvas = CanvasSize::new(800, 600).unwrap();
        let mut scene = SceneGraph::new();
        // Tall photo leaves bars on the left and right.
        scene.set_background(RasterImage::solid(100, 200, SKIN).unwrap(), canvas);
        let out = SkiaCompositor::new().render(&scene, canvas, 1.0).unwrap();
        assert_eq!(out.pixel(10, 300), Some([0, 0, 0, 0]));
        assert_close(out.pixel(400, 300), SKIN);

        let out = SkiaCompositor::new().with_background([255, 255, 255, 255]).render(&scene, canvas, 1.0).unwrap();
        assert_close(out.pixel(10, 300), [255, 255, 255, 255]);
    }

    #[test]
    fn test_rotation_is_applied() {
        let (mut scene, id, canvas) = scene();
        let element = scene.get_mut(id).unwrap();
        element.bounds = BoundingBox::new(300.0, 100.0, 200.0, 20.0).with_rotation(90.0);
        let out = SkiaCompositor::new().render(&scene, canvas, 1.0).unwrap();
        // Rotated about (400, 110): vertical bar spanning y 10..210.
        assert_close(out.pixel(400, 30), GOLD);
        assert_close(out.pixel(320, 110), SKIN);
    }

    #[test]
    fn test_cache_pruned_after_removal() {
        let (mut scene, _, canvas) = scene();
        let mut compositor = SkiaCompositor::new();
        compositor.render(&scene, canvas, 1.0).unwrap();
        scene.remove_all();
        scene.set_background(RasterImage::solid(8, 6, SKIN).unwrap(), canvas);
        compositor.render(&scene, canvas, 1.0).unwrap();
        assert_eq!(compositor.cached_images(), 1);
    }
}
