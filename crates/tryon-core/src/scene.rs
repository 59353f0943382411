//! Canvas and scene graph: the ordered layer stack and the selection.

use crate::config::SessionConfig;
use crate::element::{ElementId, ElementKind, RasterImage, VisualElement};
use crate::error::{SceneError, SceneResult};
use crate::geometry::{compute_aspect_fit_scale, compute_centered_placement, BoundingBox};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Logical size of the drawing surface. Both dimensions are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    width: u32,
    height: u32,
}

impl CanvasSize {
    /// Returns `None` if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width_f64(&self) -> f64 {
        f64::from(self.width)
    }

    pub fn height_f64(&self) -> f64 {
        f64::from(self.height)
    }
}

/// All elements on the canvas in z-order, plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    /// Elements keyed by ID.
    elements: HashMap<ElementId, VisualElement>,
    /// Z-order of elements (back to front).
    z_order: Vec<ElementId>,
    /// The background element, if any.
    background: Option<ElementId>,
    /// The selected element, if any.
    selected: Option<ElementId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the background photo. The new element is aspect-fitted and
    /// centered, placed bottommost, and the selection is cleared.
    pub fn set_background(&mut self, image: RasterImage, canvas: CanvasSize) -> ElementId {
        if let Some(old) = self.background.take() {
            self.remove(old);
            log::debug!("Removed previous background {}", old);
        }

        let (cw, ch) = (canvas.width_f64(), canvas.height_f64());
        let (iw, ih) = (f64::from(image.width()), f64::from(image.height()));
        let scale = compute_aspect_fit_scale(cw, ch, iw, ih);
        let (w, h) = (iw * scale, ih * scale);
        let origin = compute_centered_placement(cw, ch, w, h);

        let element = VisualElement::background(image, BoundingBox::new(origin.x, origin.y, w, h));
        let id = element.id();
        self.insert_at_bottom(element);
        self.background = Some(id);
        self.selected = None;

        log::debug!("Background {} placed at ({}, {}) size {}x{} scale {}", id, origin.x, origin.y, w, h, scale);
        self.check_invariants();
        id
    }

    /// Add a bracelet overlay on top of the stack and select it.
    ///
    /// Fails without touching the scene if no background is present.
    pub fn add_overlay(
        &mut self,
        image: RasterImage,
        canvas: CanvasSize,
        config: &SessionConfig,
    ) -> SceneResult<ElementId> {
        if self.background.is_none() {
            return Err(SceneError::Precondition);
        }

        let (cw, ch) = (canvas.width_f64(), canvas.height_f64());
        let width = (cw * config.overlay_width_ratio).min(config.overlay_max_width);
        let scale = width / f64::from(image.width());
        let height = f64::from(image.height()) * scale;
        let x = (cw - width) / 2.0;
        let y = ch * config.overlay_top_ratio;

        let element = VisualElement::overlay(image, BoundingBox::new(x, y, width, height));
        let id = element.id();
        self.insert_at_top(element);
        self.selected = Some(id);

        log::debug!("Overlay {} placed at ({}, {}) size {}x{}", id, x, y, width, height);
        self.check_invariants();
        Ok(id)
    }

    /// Remove every element and clear the selection.
    pub fn remove_all(&mut self) {
        self.elements.clear();
        self.z_order.clear();
        self.background = None;
        self.selected = None;
    }

    /// Set or clear the selection. Returns true if the selection changed.
    ///
    /// Selecting a missing or non-selectable element is ignored.
    pub fn select(&mut self, id: Option<ElementId>) -> bool {
        if let Some(id) = id {
            match self.elements.get(&id) {
                Some(element) if element.selectable => {}
                Some(_) => {
                    log::debug!("Ignoring selection of non-selectable element {}", id);
                    return false;
                }
                None => {
                    log::warn!("Ignoring selection of unknown element {}", id);
                    return false;
                }
            }
        }
        let changed = self.selected != id;
        self.selected = id;
        changed
    }

    /// The currently selected element ID.
    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    /// The currently selected element.
    pub fn selected_element(&self) -> Option<&VisualElement> {
        self.selected.and_then(|id| self.elements.get(&id))
    }

    pub fn background(&self) -> Option<&VisualElement> {
        self.background.and_then(|id| self.elements.get(&id))
    }

    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    pub fn get(&self, id: ElementId) -> Option<&VisualElement> {
        self.elements.get(&id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut VisualElement> {
        self.elements.get_mut(&id)
    }

    /// Elements in z-order (back to front).
    pub fn elements_ordered(&self) -> impl Iterator<Item = &VisualElement> {
        self.z_order.iter().filter_map(|id| self.elements.get(id))
    }

    fn elements_ordered_rev(&self) -> impl Iterator<Item = &VisualElement> {
        self.z_order.iter().rev().filter_map(|id| self.elements.get(id))
    }

    /// Z-order of element IDs (back to front).
    pub fn z_order(&self) -> &[ElementId] {
        &self.z_order
    }

    /// Number of elements of the given kind.
    pub fn count(&self, kind: ElementKind) -> usize {
        self.elements.values().filter(|e| e.kind() == kind).count()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Topmost element under a point, selectable or not.
    pub fn element_at(&self, point: Point, tolerance: f64) -> Option<&VisualElement> {
        self.elements_ordered_rev().find(|e| e.hit_test(point, tolerance))
    }

    /// Insert an element bottommost.
    fn insert_at_bottom(&mut self, element: VisualElement) {
        let id = element.id();
        self.z_order.insert(0, id);
        self.elements.insert(id, element);
    }

    /// Insert an element topmost.
    fn insert_at_top(&mut self, element: VisualElement) {
        let id = element.id();
        self.z_order.push(id);
        self.elements.insert(id, element);
    }

    fn remove(&mut self, id: ElementId) -> Option<VisualElement> {
        self.z_order.retain(|&z| z != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.elements.remove(&id)
    }

    fn check_invariants(&self) {
        debug_assert_eq!(self.elements.len(), self.z_order.len());
        debug_assert!(self.count(ElementKind::Background) <= 1);
        debug_assert!(
            self.background.is_none() || self.z_order.first() == self.background.as_ref(),
            "background must be bottommost"
        );
        debug_assert!(
            self.selected.is_none_or(|id| self.elements.contains_key(&id)),
            "selection must reference a live element"
        );
    }
}
