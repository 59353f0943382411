//! Selection handles and the select/transform state machine.

use crate::config::SessionConfig;
use crate::element::{ElementId, VisualElement};
use crate::geometry::{clamp_bounding_box, BoundingBox};
use crate::scene::SceneGraph;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::TopLeft, Corner::TopRight, Corner::BottomLeft, Corner::BottomRight];

    /// Direction the corner moves outward along each local axis (+1 or -1).
    fn outward(self) -> (f64, f64) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomLeft => (-1.0, 1.0),
            Corner::BottomRight => (1.0, 1.0),
        }
    }

    /// Position of this corner in a local box of the given size.
    fn local_point(self, width: f64, height: f64) -> Point {
        match self {
            Corner::TopLeft => Point::new(0.0, 0.0),
            Corner::TopRight => Point::new(width, 0.0),
            Corner::BottomLeft => Point::new(0.0, height),
            Corner::BottomRight => Point::new(width, height),
        }
    }
}

/// Type of transform handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Corner resize handle.
    Corner(Corner),
    /// Rotation handle (above the top edge).
    Rotate,
}

/// A transform handle with its position.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in canvas coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point hits this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// Handles exposed by an element: four corners plus a rotate grip.
/// Non-selectable elements expose none.
pub fn handles_for(element: &VisualElement, config: &SessionConfig) -> Vec<Handle> {
    if !element.selectable {
        return Vec::new();
    }
    let b = element.bounds;
    let t = b.local_to_canvas();
    let mut handles: Vec<Handle> = Corner::ALL
        .iter()
        .map(|&c| Handle::new(t * c.local_point(b.width, b.height), HandleKind::Corner(c)))
        .collect();
    handles.push(Handle::new(
        t * Point::new(b.width / 2.0, -config.rotate_handle_offset),
        HandleKind::Rotate,
    ));
    handles
}

/// Find which handle (if any) is hit at the given point.
pub fn hit_test_handles(element: &VisualElement, point: Point, config: &SessionConfig) -> Option<HandleKind> {
    handles_for(element, config)
        .into_iter()
        .find(|h| h.hit_test(point, config.handle_tolerance))
        .map(|h| h.kind)
}

/// Compute the geometry a drag would produce, without any size check.
///
/// `handle` of `None` moves the whole element.
pub fn propose_transform(
    original: BoundingBox,
    handle: Option<HandleKind>,
    start: Point,
    current: Point,
    keep_ratio: bool,
) -> BoundingBox {
    let delta = current - start;
    match handle {
        None => BoundingBox { x: original.x + delta.x, y: original.y + delta.y, ..original },
        Some(HandleKind::Rotate) => {
            let center = original.center();
            let angle = (current.y - center.y).atan2(current.x - center.x) + std::f64::consts::FRAC_PI_2;
            original.with_rotation(angle.to_degrees())
        }
        Some(HandleKind::Corner(corner)) => resize_from_corner(original, corner, delta, keep_ratio),
    }
}

/// Resize in the element's local frame, keeping the opposite corner fixed.
fn resize_from_corner(original: BoundingBox, corner: Corner, delta: Vec2, keep_ratio: bool) -> BoundingBox {
    let local_delta = Affine::rotate(-original.rotation.to_radians()) * delta.to_point();
    let (sx, sy) = corner.outward();
    let (w, h) = (original.width, original.height);

    let mut new_w = w + sx * local_delta.x;
    let mut new_h = h + sy * local_delta.y;
    if keep_ratio && w > 0.0 && h > 0.0 {
        // Follow whichever axis grew more; derive the other from the ratio.
        if new_w / w >= new_h / h {
            new_h = new_w * h / w;
        } else {
            new_w = new_h * w / h;
        }
    }

    // Top-left of the new box in the old local frame.
    let x0 = if sx > 0.0 { 0.0 } else { w - new_w };
    let y0 = if sy > 0.0 { 0.0 } else { h - new_h };
    let center = original.local_to_canvas() * Point::new(x0 + new_w / 2.0, y0 + new_h / 2.0);

    BoundingBox {
        x: center.x - new_w / 2.0,
        y: center.y - new_h / 2.0,
        width: new_w,
        height: new_h,
        rotation: original.rotation,
    }
}

/// Only corner drags change the size, so only they are held to the minimum.
fn is_resize(handle: Option<HandleKind>) -> bool {
    matches!(handle, Some(HandleKind::Corner(_)))
}

/// An in-progress drag of the selected element.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformState {
    pub element_id: ElementId,
    /// The handle being dragged (None = moving the whole element).
    pub handle: Option<HandleKind>,
    pub start_point: Point,
    /// Geometry when the drag started, restored on rejection.
    pub original: BoundingBox,
    /// Geometry currently shown. For resizes, the last one that met the
    /// minimum size.
    pub preview: BoundingBox,
}

/// Observable controller state.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerState {
    Idle,
    Selected(ElementId),
    Transforming(TransformState),
}

/// Result of finishing a transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOutcome {
    /// The new geometry was applied.
    Committed(BoundingBox),
    /// The final geometry violated the minimum size; the original was restored.
    Rejected(BoundingBox),
}

/// What a pointer-down did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerDownResult {
    pub selection_changed: bool,
    pub transform_started: bool,
}

/// Tracks drags on top of the scene graph's selection.
///
/// The scene graph owns the selection reference; the controller adds the
/// Transforming state on top of it.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    transform: Option<TransformState>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, scene: &SceneGraph) -> ControllerState {
        match (&self.transform, scene.selected()) {
            (Some(t), _) => ControllerState::Transforming(t.clone()),
            (None, Some(id)) => ControllerState::Selected(id),
            (None, None) => ControllerState::Idle,
        }
    }

    pub fn is_transforming(&self) -> bool {
        self.transform.is_some()
    }

    pub fn transform(&self) -> Option<&TransformState> {
        self.transform.as_ref()
    }

    /// Route a pointer-down: handles of the selected element first, then the
    /// topmost element under the pointer. A selectable element is selected;
    /// a non-selectable one (the photo) leaves the selection alone; empty
    /// canvas deselects.
    pub fn pointer_down(&mut self, scene: &mut SceneGraph, point: Point, config: &SessionConfig) -> PointerDownResult {
        self.abandon(scene);

        if let Some(selected) = scene.selected_element() {
            if let Some(handle) = hit_test_handles(selected, point, config) {
                let id = selected.id();
                let started = self.begin_transform(scene, Some(handle), point);
                log::debug!("Handle {:?} grabbed on {}", handle, id);
                return PointerDownResult { selection_changed: false, transform_started: started };
            }
        }

        match scene.element_at(point, 0.0) {
            Some(element) if !element.selectable => PointerDownResult::default(),
            Some(element) => {
                let id = element.id();
                let selection_changed = scene.select(Some(id));
                let draggable = scene.get(id).is_some_and(|e| e.draggable);
                let transform_started = draggable && self.begin_transform(scene, None, point);
                PointerDownResult { selection_changed, transform_started }
            }
            None => PointerDownResult { selection_changed: scene.select(None), transform_started: false },
        }
    }

    /// Start dragging the selected element. Returns false if nothing is selected.
    pub fn begin_transform(&mut self, scene: &SceneGraph, handle: Option<HandleKind>, point: Point) -> bool {
        let Some(element) = scene.selected_element() else {
            return false;
        };
        if handle.is_none() && !element.draggable {
            return false;
        }
        self.transform = Some(TransformState {
            element_id: element.id(),
            handle,
            start_point: point,
            original: element.bounds,
            preview: element.bounds,
        });
        true
    }

    /// Update the live preview. Resizes below the minimum size keep the
    /// previous preview. Returns true if the element geometry changed.
    pub fn update_transform(&mut self, scene: &mut SceneGraph, point: Point, config: &SessionConfig) -> bool {
        let Some(t) = self.transform.as_mut() else {
            return false;
        };
        let proposed = propose_transform(t.original, t.handle, t.start_point, point, config.keep_ratio);
        let next = if is_resize(t.handle) {
            clamp_bounding_box(t.preview, proposed, config.min_width, config.min_height)
        } else {
            proposed
        };
        let changed = next != t.preview;
        t.preview = next;

        let Some(element) = scene.get_mut(t.element_id) else {
            debug_assert!(false, "transform target {} vanished", t.element_id);
            self.transform = None;
            return false;
        };
        element.bounds = next;
        changed
    }

    /// Finish the drag at `point`. Resizes below the minimum size are
    /// rejected and the original geometry restored; moves and rotations
    /// always commit.
    pub fn commit_transform(
        &mut self,
        scene: &mut SceneGraph,
        point: Point,
        config: &SessionConfig,
    ) -> Option<(ElementId, TransformOutcome)> {
        let t = self.transform.take()?;
        let proposed = propose_transform(t.original, t.handle, t.start_point, point, config.keep_ratio);
        let outcome = if !is_resize(t.handle) || proposed.meets_minimum(config.min_width, config.min_height) {
            TransformOutcome::Committed(proposed)
        } else {
            log::debug!(
                "Rejected transform of {}: {}x{} below minimum",
                t.element_id, proposed.width, proposed.height
            );
            TransformOutcome::Rejected(t.original)
        };

        let Some(element) = scene.get_mut(t.element_id) else {
            debug_assert!(false, "transform target {} vanished", t.element_id);
            return None;
        };
        element.bounds = match outcome {
            TransformOutcome::Committed(b) | TransformOutcome::Rejected(b) => b,
        };
        Some((t.element_id, outcome))
    }

    /// Drop any in-progress drag, restoring the original geometry.
    pub fn abandon(&mut self, scene: &mut SceneGraph) {
        if let Some(t) = self.transform.take() {
            if let Some(element) = scene.get_mut(t.element_id) {
                element.bounds = t.original;
            }
        }
    }

    /// Forget any drag without touching the scene (used when the scene
    /// itself is being replaced).
    pub fn reset(&mut self) {
        self.transform = None;
    }
}
