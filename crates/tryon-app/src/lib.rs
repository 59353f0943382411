//! Bracelet Try-On App Library
//!
//! Scene host, bracelet catalog and configuration for the `bracelet-tryon`
//! binary.

pub mod catalog;
pub mod config;
mod error;
pub mod host;
pub mod script;

pub use catalog::{BraceletCatalog, CatalogEntry};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use host::{SceneHost, NO_PHOTO_WARNING};
pub use script::PointerScript;
