//! Editor session: owns the canvas, scene graph and selection controller,
//! and turns user intents into scene mutations plus side-effect requests.

use crate::config::SessionConfig;
use crate::element::{ElementId, RasterImage};
use crate::error::{ExportError, SceneError, SessionError, SessionResult};
use crate::export::{export_dimensions, Compositor, ExportBlob, PNG_MIME_TYPE};
use crate::input::PointerEvent;
use crate::scene::{CanvasSize, SceneGraph};
use crate::selection::{handles_for, ControllerState, Handle, HandleKind, SelectionController, TransformOutcome};
use kurbo::Point;

/// A discrete user intent.
#[derive(Debug, Clone)]
pub enum Command {
    /// Replace the hand photo with a decoded image.
    SetBackground(RasterImage),
    /// Add a decoded bracelet image on top.
    AddOverlay(RasterImage),
    /// Select an element, or deselect with `None`.
    Select(Option<ElementId>),
    /// Raw pointer input from the host surface.
    Pointer(PointerEvent),
    /// Start dragging a handle (or the body, with `None`) of the selection.
    BeginTransform { handle: Option<HandleKind>, at: Point },
    UpdateTransform(Point),
    CommitTransform(Point),
    /// Flatten the scene and deliver it as a PNG blob.
    Export,
    /// Clear the whole scene.
    Reset,
    /// The host surface changed size. Destroys the scene.
    Resize(CanvasSize),
}

/// A side effect the host should perform after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// The live view is stale.
    Redraw,
    /// The selection changed to the given element (or none).
    SelectionChanged(Option<ElementId>),
    /// A resize was dropped because it violated the minimum size.
    TransformRejected(ElementId),
    /// A precondition failed; the host should warn the user.
    PromptUser(SessionError),
    /// An export finished; the host should hand the blob to the user.
    DeliverBlob(ExportBlob),
}

/// One editing session over a single canvas.
pub struct EditorSession {
    canvas: CanvasSize,
    scene: SceneGraph,
    controller: SelectionController,
    config: SessionConfig,
    compositor: Box<dyn Compositor>,
    effects: Vec<Effect>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("canvas", &self.canvas)
            .field("scene", &self.scene)
            .field("controller", &self.controller)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    pub fn new(canvas: CanvasSize, config: SessionConfig, compositor: Box<dyn Compositor>) -> Self {
        Self {
            canvas,
            scene: SceneGraph::new(),
            controller: SelectionController::new(),
            config,
            compositor,
            effects: Vec::new(),
        }
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn controller_state(&self) -> ControllerState {
        self.controller.state(&self.scene)
    }

    /// Handles of the selected element, derived from its current geometry.
    pub fn handles(&self) -> Vec<Handle> {
        self.scene
            .selected_element()
            .map(|e| handles_for(e, &self.config))
            .unwrap_or_default()
    }

    /// Drain side effects queued by the typed operations.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Handle one command and return the side effects it produced.
    ///
    /// Precondition failures come back as [`Effect::PromptUser`]; only
    /// unexpected render or encode failures are returned as errors. Effects
    /// queued before such a failure (an export's deselection) stay queued
    /// for [`take_effects`](Self::take_effects).
    pub fn dispatch(&mut self, command: Command) -> SessionResult<Vec<Effect>> {
        let result = match command {
            Command::SetBackground(image) => {
                self.set_background(image);
                Ok(())
            }
            Command::AddOverlay(image) => self.add_overlay(image).map(|_| ()),
            Command::Select(id) => {
                self.select(id);
                Ok(())
            }
            Command::Pointer(event) => {
                self.pointer(event);
                Ok(())
            }
            Command::BeginTransform { handle, at } => {
                self.begin_transform(handle, at);
                Ok(())
            }
            Command::UpdateTransform(at) => {
                self.update_transform(at);
                Ok(())
            }
            Command::CommitTransform(at) => {
                self.commit_transform(at);
                Ok(())
            }
            Command::Export => self.export().map(|blob| self.effects.push(Effect::DeliverBlob(blob))),
            Command::Reset => {
                self.reset();
                Ok(())
            }
            Command::Resize(size) => {
                self.resize(size);
                Ok(())
            }
        };

        match result {
            Ok(()) => Ok(self.take_effects()),
            Err(err) if err.is_missing_background() => {
                log::warn!("{}", err);
                self.effects.push(Effect::PromptUser(err));
                Ok(self.take_effects())
            }
            Err(err) => {
                log::error!("{}", err);
                Err(err)
            }
        }
    }

    /// Replace the background photo.
    pub fn set_background(&mut self, image: RasterImage) -> ElementId {
        self.controller.abandon(&mut self.scene);
        let had_selection = self.scene.selected().is_some();
        let replaced = self.scene.has_background();
        let id = self.scene.set_background(image, self.canvas);
        if replaced {
            log::info!("Replaced background photo with {}", id);
        } else {
            log::info!("Set background photo {}", id);
        }
        if had_selection {
            self.effects.push(Effect::SelectionChanged(None));
        }
        self.effects.push(Effect::Redraw);
        id
    }

    /// Add a bracelet overlay and select it.
    pub fn add_overlay(&mut self, image: RasterImage) -> SessionResult<ElementId> {
        if !self.scene.has_background() {
            return Err(SceneError::Precondition.into());
        }
        self.controller.abandon(&mut self.scene);
        let id = self.scene.add_overlay(image, self.canvas, &self.config)?;
        log::info!("Added overlay {}", id);
        self.effects.push(Effect::SelectionChanged(Some(id)));
        self.effects.push(Effect::Redraw);
        Ok(id)
    }

    /// Set or clear the selection. Returns true if it changed.
    pub fn select(&mut self, id: Option<ElementId>) -> bool {
        self.controller.abandon(&mut self.scene);
        let changed = self.scene.select(id);
        if changed {
            self.effects.push(Effect::SelectionChanged(self.scene.selected()));
            self.effects.push(Effect::Redraw);
        }
        changed
    }

    /// Route a pointer event through the selection controller.
    pub fn pointer(&mut self, event: PointerEvent) {
        let at = event.position();
        match event {
            PointerEvent::Down { .. } => {
                let result = self.controller.pointer_down(&mut self.scene, at, &self.config);
                if result.selection_changed {
                    self.effects.push(Effect::SelectionChanged(self.scene.selected()));
                }
                if result.selection_changed || result.transform_started {
                    self.effects.push(Effect::Redraw);
                }
            }
            PointerEvent::Move { .. } => self.update_transform(at),
            PointerEvent::Up { .. } => {
                self.commit_transform(at);
            }
        }
    }

    /// Start dragging a handle of the selected element.
    pub fn begin_transform(&mut self, handle: Option<HandleKind>, at: Point) -> bool {
        self.controller.abandon(&mut self.scene);
        self.controller.begin_transform(&self.scene, handle, at)
    }

    pub fn update_transform(&mut self, at: Point) {
        if self.controller.update_transform(&mut self.scene, at, &self.config) {
            self.effects.push(Effect::Redraw);
        }
    }

    /// Finish the current drag. Returns `None` if nothing was being dragged.
    pub fn commit_transform(&mut self, at: Point) -> Option<TransformOutcome> {
        let (id, outcome) = self.controller.commit_transform(&mut self.scene, at, &self.config)?;
        if let TransformOutcome::Rejected(_) = outcome {
            self.effects.push(Effect::TransformRejected(id));
        }
        self.effects.push(Effect::Redraw);
        Some(outcome)
    }

    /// Flatten the scene at the configured pixel ratio and encode it as PNG.
    ///
    /// Clears the selection first so no handles are sampled, and requests a
    /// redraw so the live view shows the deselection.
    pub fn export(&mut self) -> SessionResult<ExportBlob> {
        if !self.scene.has_background() {
            return Err(ExportError::Precondition.into());
        }

        self.controller.abandon(&mut self.scene);
        if self.scene.select(None) {
            self.effects.push(Effect::SelectionChanged(None));
        }
        self.effects.push(Effect::Redraw);

        let ratio = self.config.export_pixel_ratio;
        let image = self.compositor.render(&self.scene, self.canvas, ratio)?;
        let expected = export_dimensions(self.canvas, ratio);
        if (image.width(), image.height()) != expected {
            return Err(ExportError::Render(format!(
                "compositor produced {}x{}, expected {}x{}",
                image.width(),
                image.height(),
                expected.0,
                expected.1
            ))
            .into());
        }
        let bytes = self.compositor.encode_png(&image)?;
        log::info!(
            "Exported {} ({}x{}, {} bytes)",
            self.config.export_file_name,
            image.width(),
            image.height(),
            bytes.len()
        );

        Ok(ExportBlob {
            file_name: self.config.export_file_name.clone(),
            mime_type: PNG_MIME_TYPE,
            width: image.width(),
            height: image.height(),
            bytes,
        })
    }

    /// Remove every element and clear the selection.
    pub fn reset(&mut self) {
        self.controller.reset();
        let had_selection = self.scene.selected().is_some();
        self.scene.remove_all();
        log::info!("Scene reset");
        if had_selection {
            self.effects.push(Effect::SelectionChanged(None));
        }
        self.effects.push(Effect::Redraw);
    }

    /// Rebuild the canvas at a new size. The scene is discarded rather than
    /// reflowed.
    pub fn resize(&mut self, size: CanvasSize) {
        let had_selection = self.scene.selected().is_some();
        if !self.scene.is_empty() {
            log::warn!(
                "Canvas resized to {}x{}; discarding {} element(s)",
                size.width(),
                size.height(),
                self.scene.len()
            );
        }
        self.canvas = size;
        self.scene = SceneGraph::new();
        self.controller = SelectionController::new();
        if had_selection {
            self.effects.push(Effect::SelectionChanged(None));
        }
        self.effects.push(Effect::Redraw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use crate::error::ExportResult;
    use crate::geometry::BoundingBox;
    use std::sync::{Arc, Mutex};

    /// Records what it was asked to draw and returns a blank image.
    #[derive(Default)]
    struct RecordingCompositor {
        calls: Arc<Mutex<Vec<(usize, Option<ElementId>)>>>,
    }

    impl Compositor for RecordingCompositor {
        fn render(&mut self, scene: &SceneGraph, canvas: CanvasSize, pixel_ratio: f64) -> ExportResult<RasterImage> {
            self.calls.lock().unwrap().push((scene.len(), scene.selected()));
            let (w, h) = export_dimensions(canvas, pixel_ratio);
            Ok(RasterImage::solid(w, h, [0, 0, 0, 0]).unwrap())
        }

        fn encode_png(&self, image: &RasterImage) -> ExportResult<Vec<u8>> {
            Ok(vec![image.width() as u8; 8])
        }
    }

    struct FailingCompositor;

    impl Compositor for FailingCompositor {
        fn render(&mut self, _: &SceneGraph, canvas: CanvasSize, pixel_ratio: f64) -> ExportResult<RasterImage> {
            let (w, h) = export_dimensions(canvas, pixel_ratio);
            Ok(RasterImage::solid(w, h, [0, 0, 0, 0]).unwrap())
        }

        fn encode_png(&self, _: &RasterImage) -> ExportResult<Vec<u8>> {
            Err(ExportError::Encode("disk full".into()))
        }
    }

    fn session() -> (EditorSession, Arc<Mutex<Vec<(usize, Option<ElementId>)>>>) {
        let compositor = RecordingCompositor::default();
        let calls = compositor.calls.clone();
        let canvas = CanvasSize::new(800, 600).unwrap();
        (EditorSession::new(canvas, SessionConfig::default(), Box::new(compositor)), calls)
    }

    fn hand() -> RasterImage {
        RasterImage::solid(1600, 1200, [210, 170, 140, 255]).unwrap()
    }

    fn bracelet() -> RasterImage {
        RasterImage::solid(300, 300, [230, 200, 60, 255]).unwrap()
    }

    #[test]
    fn test_add_overlay_without_background_prompts() {
        let (mut s, _) = session();
        let effects = s.dispatch(Command::AddOverlay(bracelet())).unwrap();
        assert_eq!(effects, vec![Effect::PromptUser(SessionError::Scene(SceneError::Precondition))]);
        assert!(s.scene().is_empty());
        assert_eq!(s.add_overlay(bracelet()), Err(SessionError::Scene(SceneError::Precondition)));
    }

    #[test]
    fn test_export_without_background_fails_without_rendering() {
        let (mut s, calls) = session();
        let effects = s.dispatch(Command::Export).unwrap();
        assert_eq!(effects, vec![Effect::PromptUser(SessionError::Export(ExportError::Precondition))]);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_set_background_effects() {
        let (mut s, _) = session();
        let effects = s.dispatch(Command::SetBackground(hand())).unwrap();
        assert_eq!(effects, vec![Effect::Redraw]);
        assert_eq!(s.scene().count(ElementKind::Background), 1);
    }

    #[test]
    fn test_add_overlay_selects() {
        let (mut s, _) = session();
        s.set_background(hand());
        s.take_effects();
        let id = s.add_overlay(bracelet()).unwrap();
        assert_eq!(s.take_effects(), vec![Effect::SelectionChanged(Some(id)), Effect::Redraw]);
        assert_eq!(s.controller_state(), ControllerState::Selected(id));
        assert_eq!(s.handles().len(), 5);
    }

    #[test]
    fn test_export_deselects_before_render() {
        let (mut s, calls) = session();
        s.set_background(hand());
        let id = s.add_overlay(bracelet()).unwrap();
        s.add_overlay(bracelet()).unwrap();
        s.select(Some(id));
        s.take_effects();

        let effects = s.dispatch(Command::Export).unwrap();
        assert_eq!(effects[0], Effect::SelectionChanged(None));
        assert_eq!(effects[1], Effect::Redraw);
        match &effects[2] {
            Effect::DeliverBlob(blob) => {
                assert_eq!(blob.file_name, "bracelet-tryon.png");
                assert_eq!((blob.width, blob.height), (1600, 1200));
                assert_eq!(blob.mime_type, "image/png");
            }
            other => panic!("expected blob, got {:?}", other),
        }
        let recorded = calls.lock().unwrap().clone();
        assert_eq!(recorded, vec![(3_usize, None::<ElementId>)]);
        assert_eq!(s.scene().selected(), None);
    }

    #[test]
    fn test_pointer_resize_scenario() {
        let (mut s, _) = session();
        s.set_background(hand());
        let id = s.add_overlay(bracelet()).unwrap();
        s.take_effects();

        s.pointer(PointerEvent::Down { x: 620.0, y: 812.0 });
        s.pointer(PointerEvent::Move { x: 200.0, y: 392.0 });
        s.pointer(PointerEvent::Up { x: 200.0, y: 392.0 });
        assert!(s.take_effects().contains(&Effect::TransformRejected(id)));
        assert_eq!(s.scene().get(id).unwrap().bounds, BoundingBox::new(180.0, 372.0, 440.0, 440.0));

        let effects = s
            .dispatch(Command::BeginTransform {
                handle: Some(HandleKind::Corner(crate::selection::Corner::BottomRight)),
                at: Point::new(620.0, 812.0),
            })
            .unwrap();
        assert!(effects.is_empty());
        s.dispatch(Command::CommitTransform(Point::new(240.0, 432.0))).unwrap();
        assert_eq!(s.scene().get(id).unwrap().bounds, BoundingBox::new(180.0, 372.0, 60.0, 60.0));
    }

    #[test]
    fn test_reset_clears_everything() {
        let (mut s, _) = session();
        s.set_background(hand());
        s.add_overlay(bracelet()).unwrap();
        s.pointer(PointerEvent::Down { x: 400.0, y: 500.0 });
        let effects = s.dispatch(Command::Reset).unwrap();
        assert!(effects.contains(&Effect::Redraw));
        assert!(s.scene().is_empty());
        assert_eq!(s.controller_state(), ControllerState::Idle);
    }

    #[test]
    fn test_resize_discards_scene() {
        let (mut s, _) = session();
        s.set_background(hand());
        s.add_overlay(bracelet()).unwrap();
        let size = CanvasSize::new(1024, 768).unwrap();
        s.dispatch(Command::Resize(size)).unwrap();
        assert_eq!(s.canvas(), size);
        assert!(s.scene().is_empty());
    }

    #[test]
    fn test_background_click_keeps_selection() {
        let (mut s, _) = session();
        s.set_background(hand());
        let id = s.add_overlay(bracelet()).unwrap();
        s.take_effects();
        s.pointer(PointerEvent::Down { x: 50.0, y: 50.0 });
        s.pointer(PointerEvent::Up { x: 50.0, y: 50.0 });
        assert!(s.take_effects().is_empty());
        assert_eq!(s.controller_state(), ControllerState::Selected(id));
    }

    #[test]
    fn test_empty_canvas_click_deselects() {
        let (mut s, _) = session();
        // Portrait photo fitted to 300x600 at x = 250.
        s.set_background(RasterImage::solid(400, 800, [210, 170, 140, 255]).unwrap());
        s.add_overlay(bracelet()).unwrap();
        s.take_effects();
        s.pointer(PointerEvent::Down { x: 50.0, y: 50.0 });
        assert_eq!(s.take_effects(), vec![Effect::SelectionChanged(None), Effect::Redraw]);
        s.pointer(PointerEvent::Up { x: 50.0, y: 50.0 });
        assert!(s.take_effects().is_empty());
        assert_eq!(s.controller_state(), ControllerState::Idle);
    }

    #[test]
    fn test_failed_export_keeps_deselection_effects() {
        let canvas = CanvasSize::new(800, 600).unwrap();
        let mut s = EditorSession::new(canvas, SessionConfig::default(), Box::new(FailingCompositor));
        s.set_background(hand());
        s.add_overlay(bracelet()).unwrap();
        s.take_effects();

        let err = s.dispatch(Command::Export).unwrap_err();
        assert_eq!(err, SessionError::Export(ExportError::Encode("disk full".into())));
        assert_eq!(s.scene().selected(), None);
        assert_eq!(s.take_effects(), vec![Effect::SelectionChanged(None), Effect::Redraw]);
    }
}
