//! Scene host: owns the live drawing surface, feeds user input to the
//! editor session and carries out the effects it requests.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use kurbo::Affine;
use std::path::PathBuf;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};
use tryon_core::{
    CanvasSize, Command, Compositor, EditorSession, Effect, ElementId, ExportBlob, HandleKind, PointerEvent, RasterImage,
    SceneError,
};
use tryon_render::{pixmap_to_raster, ImageLoader, ImageSource, RenderError, SkiaCompositor};

/// Shown when an action needs a hand photo and none is loaded.
pub const NO_PHOTO_WARNING: &str = "Please upload a hand photo first!";

const CHROME_COLOR: [u8; 4] = [0, 161, 255, 255];
const HANDLE_SIZE: f32 = 10.0;

fn new_surface(canvas: CanvasSize) -> AppResult<Pixmap> {
    Pixmap::new(canvas.width(), canvas.height())
        .ok_or(AppError::Render(RenderError::Allocation(canvas.width(), canvas.height())))
}

/// Hosts one [`EditorSession`] and its 1x live view.
pub struct SceneHost {
    session: EditorSession,
    live: SkiaCompositor,
    surface: Pixmap,
    redraw_count: u64,
    warnings: Vec<String>,
    delivered: Vec<ExportBlob>,
    download_dir: Option<PathBuf>,
}

impl SceneHost {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        Self::with_compositor(config, Box::new(SkiaCompositor::new()))
    }

    /// Host whose exports are flattened by `compositor`.
    pub fn with_compositor(config: &AppConfig, compositor: Box<dyn Compositor>) -> AppResult<Self> {
        let canvas = config.canvas()?;
        let session = EditorSession::new(canvas, config.session.clone(), compositor);
        Ok(Self {
            session,
            live: SkiaCompositor::new().with_background(config.live_background),
            surface: new_surface(canvas)?,
            redraw_count: 0,
            warnings: Vec::new(),
            delivered: Vec::new(),
            download_dir: None,
        })
    }

    /// Write delivered exports into `dir` as well as keeping them.
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// The live view as last drawn.
    pub fn surface(&self) -> &Pixmap {
        &self.surface
    }

    /// Copy of the live view as straight-alpha RGBA.
    pub fn snapshot(&self) -> AppResult<RasterImage> {
        Ok(pixmap_to_raster(&self.surface)?)
    }

    pub fn redraw_count(&self) -> u64 {
        self.redraw_count
    }

    /// User-facing warnings raised so far.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Exports handed to the user so far.
    pub fn delivered(&self) -> &[ExportBlob] {
        &self.delivered
    }

    /// Send a command to the session and perform the resulting effects.
    pub fn dispatch(&mut self, command: Command) -> AppResult<Vec<Effect>> {
        let resized = match &command {
            Command::Resize(size) => Some(*size),
            _ => None,
        };
        let effects = match self.session.dispatch(command) {
            Ok(effects) => effects,
            Err(err) => {
                // The session may have changed (an export deselects) before failing.
                let pending = self.session.take_effects();
                self.apply(&pending)?;
                return Err(err.into());
            }
        };
        if let Some(size) = resized {
            self.surface = new_surface(size)?;
        }
        self.apply(&effects)?;
        Ok(effects)
    }

    pub fn pointer(&mut self, event: PointerEvent) -> AppResult<Vec<Effect>> {
        self.dispatch(Command::Pointer(event))
    }

    /// Load and decode a hand photo, then make it the background.
    ///
    /// A load failure leaves the scene untouched.
    pub async fn load_background(&mut self, loader: &dyn ImageLoader, source: &ImageSource) -> AppResult<()> {
        let image = loader
            .load(source)
            .await
            .inspect_err(|e| log::warn!("Failed to load hand photo {}: {}", source.describe(), e))?;
        self.dispatch(Command::SetBackground(image))?;
        Ok(())
    }

    /// Load a bracelet picture and add it over the photo.
    ///
    /// Returns the new overlay, or `None` if the user was told to upload a
    /// photo first.
    pub async fn add_overlay_from(
        &mut self,
        loader: &dyn ImageLoader,
        source: &ImageSource,
    ) -> AppResult<Option<ElementId>> {
        if !self.session.scene().has_background() {
            log::warn!("Bracelet {} requested without a hand photo", source.describe());
            self.apply(&[Effect::PromptUser(SceneError::Precondition.into())])?;
            return Ok(None);
        }
        let image = loader
            .load(source)
            .await
            .inspect_err(|e| log::warn!("Failed to load bracelet {}: {}", source.describe(), e))?;
        self.dispatch(Command::AddOverlay(image))?;
        Ok(self.session.scene().selected())
    }

    /// Export the composition. Returns `None` if the user was prompted instead.
    pub fn export(&mut self) -> AppResult<Option<ExportBlob>> {
        let effects = self.dispatch(Command::Export)?;
        Ok(effects.into_iter().find_map(|effect| match effect {
            Effect::DeliverBlob(blob) => Some(blob),
            _ => None,
        }))
    }

    fn apply(&mut self, effects: &[Effect]) -> AppResult<()> {
        let mut needs_redraw = false;
        for effect in effects {
            match effect {
                Effect::Redraw => needs_redraw = true,
                Effect::SelectionChanged(id) => log::debug!("Selection is now {:?}", id),
                Effect::TransformRejected(id) => log::debug!("Kept previous geometry of {}", id),
                Effect::PromptUser(err) => {
                    let message = if err.is_missing_background() {
                        NO_PHOTO_WARNING.to_string()
                    } else {
                        err.to_string()
                    };
                    self.warnings.push(message);
                }
                Effect::DeliverBlob(blob) => self.deliver(blob.clone())?,
            }
        }
        // Several redraw requests in one batch collapse into one draw.
        if needs_redraw {
            self.redraw()?;
        }
        Ok(())
    }

    fn deliver(&mut self, blob: ExportBlob) -> AppResult<()> {
        if let Some(dir) = &self.download_dir {
            let path = dir.join(&blob.file_name);
            std::fs::write(&path, &blob.bytes)?;
            log::info!("Saved {} ({} bytes)", path.display(), blob.len());
        }
        self.delivered.push(blob);
        Ok(())
    }

    /// Redraw the live view: all elements, then the selection chrome.
    pub fn redraw(&mut self) -> AppResult<()> {
        self.live
            .draw_elements(&mut self.surface, self.session.scene(), Affine::IDENTITY)?;
        draw_selection_chrome(&mut self.surface, &self.session);
        self.redraw_count += 1;
        Ok(())
    }
}

fn draw_selection_chrome(surface: &mut Pixmap, session: &EditorSession) {
    let Some(element) = session.scene().selected_element() else {
        return;
    };

    let [r, g, b, a] = CHROME_COLOR;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: 1.0,
        ..Stroke::default()
    };

    let corners = element.bounds.corners();
    let mut pb = PathBuilder::new();
    pb.move_to(corners[0].x as f32, corners[0].y as f32);
    for corner in &corners[1..] {
        pb.line_to(corner.x as f32, corner.y as f32);
    }
    pb.close();
    if let Some(outline) = pb.finish() {
        surface.stroke_path(&outline, &paint, &stroke, Transform::identity(), None);
    }

    let top_mid = corners[0].midpoint(corners[1]);
    let half = HANDLE_SIZE / 2.0;
    for handle in session.handles() {
        let (x, y) = (handle.position.x as f32, handle.position.y as f32);
        match handle.kind {
            HandleKind::Corner(_) => {
                if let Some(rect) = Rect::from_xywh(x - half, y - half, HANDLE_SIZE, HANDLE_SIZE) {
                    surface.fill_rect(rect, &paint, Transform::identity(), None);
                }
            }
            HandleKind::Rotate => {
                let mut pb = PathBuilder::new();
                pb.move_to(top_mid.x as f32, top_mid.y as f32);
                pb.line_to(x, y);
                if let Some(stem) = pb.finish() {
                    surface.stroke_path(&stem, &paint, &stroke, Transform::identity(), None);
                }
                if let Some(knob) = PathBuilder::from_circle(x, y, half) {
                    surface.fill_path(&knob, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
        }
    }
}
