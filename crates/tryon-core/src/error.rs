//! Error taxonomy for the composition engine.

use thiserror::Error;

/// An image resource could not be turned into a displayable image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Unsupported or corrupt image data: {0}")]
    Format(String),
    #[error("Image has zero width or height")]
    Empty,
    #[error("Image source not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Scene graph mutation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SceneError {
    /// An overlay was inserted before any background photo was set.
    #[error("No background photo is set")]
    Precondition,
}

/// Export errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// Export was requested before any background photo was set.
    #[error("Cannot export without a background photo")]
    Precondition,
    #[error("Render failed: {0}")]
    Render(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Errors returned from [`EditorSession`](crate::session::EditorSession) dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Result type for scene graph operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

impl SessionError {
    /// Whether this error is one of the "no background" preconditions the
    /// boundary surfaces to the user as a warning.
    pub fn is_missing_background(&self) -> bool {
        matches!(
            self,
            SessionError::Scene(SceneError::Precondition)
                | SessionError::Export(ExportError::Precondition)
        )
    }
}
