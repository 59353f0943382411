//! App errors.

use thiserror::Error;
use tryon_core::{DecodeError, SessionError};
use tryon_render::RenderError;

/// Errors surfaced by the scene host and configuration layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid config {path}: {message}")]
    Config { path: String, message: String },
    #[error("Unknown bracelet: {0}")]
    UnknownBracelet(String),
    #[error("Invalid canvas size {0}x{1}")]
    CanvasSize(u32, u32),
    #[error("Invalid pointer script: {0}")]
    Script(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for app operations.
pub type AppResult<T> = Result<T, AppError>;
