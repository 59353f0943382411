//! Bracelet Try-On Core Library
//!
//! Platform-agnostic scene composition engine: layered image elements,
//! placement math, selection and transform handling, and the export seam.

pub mod config;
pub mod element;
pub mod error;
pub mod export;
pub mod geometry;
pub mod input;
pub mod scene;
pub mod selection;
pub mod session;

pub use config::{SessionConfig, DEFAULT_EXPORT_FILE_NAME};
pub use element::{ElementId, ElementKind, RasterImage, VisualElement};
pub use error::{DecodeError, ExportError, SceneError, SessionError, SessionResult};
pub use export::{export_dimensions, Compositor, ExportBlob, PNG_MIME_TYPE};
pub use geometry::{
    clamp_bounding_box, compute_aspect_fit_scale, compute_centered_placement, BoundingBox, MIN_ELEMENT_SIZE,
};
pub use input::PointerEvent;
pub use scene::{CanvasSize, SceneGraph};
pub use selection::{ControllerState, Corner, Handle, HandleKind, SelectionController, TransformOutcome};
pub use session::{Command, EditorSession, Effect};
