//! Render errors.

use thiserror::Error;
use tryon_core::ExportError;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot allocate a {0}x{1} pixmap")]
    Allocation(u32, u32),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

impl From<RenderError> for ExportError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Allocation(..) => ExportError::Render(err.to_string()),
            RenderError::Encode(msg) => ExportError::Encode(msg),
        }
    }
}
