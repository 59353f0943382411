//! Placement math: aspect-fit scaling, centering and the minimum-size rule.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest width and height an element may be resized to.
pub const MIN_ELEMENT_SIZE: f64 = 40.0;

/// Largest scale that fits an `intrinsic_w` x `intrinsic_h` image inside the
/// container on both axes while preserving its aspect ratio.
pub fn compute_aspect_fit_scale(
    container_w: f64,
    container_h: f64,
    intrinsic_w: f64,
    intrinsic_h: f64,
) -> f64 {
    (container_w / intrinsic_w).min(container_h / intrinsic_h)
}

/// Top-left position that centers a `scaled_w` x `scaled_h` box in the container.
pub fn compute_centered_placement(
    container_w: f64,
    container_h: f64,
    scaled_w: f64,
    scaled_h: f64,
) -> Point {
    Point::new((container_w - scaled_w) / 2.0, (container_h - scaled_h) / 2.0)
}

/// Position, size and rotation of an element.
///
/// `x`/`y` is the top-left corner of the unrotated box. Rotation is in
/// degrees and applied about the box center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height, rotation: 0.0 }
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// The unrotated box as a rectangle.
    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Whether both dimensions meet the given minimum.
    pub fn meets_minimum(&self, min_w: f64, min_h: f64) -> bool {
        self.width >= min_w && self.height >= min_h
    }

    /// Transform from the element's local frame (origin at its top-left,
    /// unrotated) to canvas coordinates.
    pub fn local_to_canvas(&self) -> Affine {
        let half = Vec2::new(self.width / 2.0, self.height / 2.0);
        Affine::translate(self.center().to_vec2())
            * Affine::rotate(self.rotation.to_radians())
            * Affine::translate(-half)
    }

    /// Map a canvas point into the element's local frame.
    pub fn canvas_to_local(&self, point: Point) -> Point {
        self.local_to_canvas().inverse() * point
    }

    /// Whether a canvas point lies inside the (rotated) box, grown by `tolerance`.
    pub fn contains(&self, point: Point, tolerance: f64) -> bool {
        let local = self.canvas_to_local(point);
        Rect::new(0.0, 0.0, self.width, self.height)
            .inflate(tolerance, tolerance)
            .contains(local)
    }

    /// Corners of the rotated box in canvas coordinates:
    /// top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Point; 4] {
        let t = self.local_to_canvas();
        [
            t * Point::new(0.0, 0.0),
            t * Point::new(self.width, 0.0),
            t * Point::new(self.width, self.height),
            t * Point::new(0.0, self.height),
        ]
    }

    /// Axis-aligned bounds of the rotated box.
    pub fn aabb(&self) -> Rect {
        if self.rotation.abs() < 1e-9 {
            return self.as_rect();
        }
        let corners = self.corners();
        let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        Rect::new(min_x, min_y, max_x, max_y)
    }
}

/// Accept `proposed` if both of its dimensions meet the minimum, otherwise
/// keep `prior`.
pub fn clamp_bounding_box(
    prior: BoundingBox,
    proposed: BoundingBox,
    min_w: f64,
    min_h: f64,
) -> BoundingBox {
    if proposed.meets_minimum(min_w, min_h) {
        proposed
    } else {
        prior
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: [(f64, f64); 8] = [
        (800.0, 600.0),
        (1600.0, 1200.0),
        (300.0, 300.0),
        (1920.0, 1080.0),
        (333.0, 777.0),
        (1.0, 1000.0),
        (4032.0, 3024.0),
        (641.0, 359.0),
    ];

    #[test]
    fn test_aspect_fit_fits_and_touches_one_axis() {
        for &(cw, ch) in &DIMS {
            for &(iw, ih) in &DIMS {
                let scale = compute_aspect_fit_scale(cw, ch, iw, ih);
                let w = (iw * scale).round();
                let h = (ih * scale).round();
                assert!(w <= cw && h <= ch, "{iw}x{ih} in {cw}x{ch} -> {w}x{h}");
                assert!(w == cw || h == ch, "{iw}x{ih} in {cw}x{ch} touches neither axis");
            }
        }
    }

    #[test]
    fn test_aspect_fit_hand_photo() {
        let scale = compute_aspect_fit_scale(800.0, 600.0, 1600.0, 1200.0);
        assert!((scale - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_centered_placement_centers() {
        for &(cw, ch) in &DIMS {
            for &(sw, sh) in &DIMS {
                let p = compute_centered_placement(cw, ch, sw, sh);
                let center = Point::new(p.x + sw / 2.0, p.y + sh / 2.0);
                assert!((center.x - cw / 2.0).abs() < 1e-9);
                assert!((center.y - ch / 2.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_clamp_rejects_below_minimum() {
        let prior = BoundingBox::new(10.0, 10.0, 100.0, 100.0);
        let too_narrow = BoundingBox::new(10.0, 10.0, 39.9, 100.0);
        let too_short = BoundingBox::new(10.0, 10.0, 100.0, 20.0);
        assert_eq!(clamp_bounding_box(prior, too_narrow, 40.0, 40.0), prior);
        assert_eq!(clamp_bounding_box(prior, too_short, 40.0, 40.0), prior);
    }

    #[test]
    fn test_clamp_accepts_at_minimum() {
        let prior = BoundingBox::new(10.0, 10.0, 100.0, 100.0);
        let exact = BoundingBox::new(5.0, 5.0, 40.0, 40.0);
        assert_eq!(clamp_bounding_box(prior, exact, 40.0, 40.0), exact);
    }

    #[test]
    fn test_rotated_contains() {
        let b = BoundingBox::new(0.0, 0.0, 100.0, 20.0).with_rotation(90.0);
        // Rotated 90° about (50, 10): now spans x 40..60, y -40..60.
        assert!(b.contains(Point::new(50.0, -30.0), 0.0));
        assert!(!b.contains(Point::new(90.0, 10.0), 0.0));
        let aabb = b.aabb();
        assert!((aabb.width() - 20.0).abs() < 1e-9);
        assert!((aabb.height() - 100.0).abs() < 1e-9);
    }
}
