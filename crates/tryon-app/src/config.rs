//! App configuration file.

use crate::catalog::{BraceletCatalog, CatalogEntry};
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tryon_core::{CanvasSize, SessionConfig};

/// Contents of the optional JSON config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Clear color of the live view.
    pub live_background: [u8; 4],
    pub session: SessionConfig,
    pub bracelets: Vec<CatalogEntry>,
    /// Directory relative catalog paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 600,
            live_background: [245, 245, 245, 255],
            session: SessionConfig::default(),
            bracelets: Vec::new(),
            base_dir: None,
        }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> AppResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let mut config: AppConfig = serde_json::from_str(&text).map_err(|e| AppError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn canvas(&self) -> AppResult<CanvasSize> {
        CanvasSize::new(self.canvas_width, self.canvas_height)
            .ok_or(AppError::CanvasSize(self.canvas_width, self.canvas_height))
    }

    /// Catalog with paths resolved against the config file's directory.
    pub fn catalog(&self) -> BraceletCatalog {
        let entries = self
            .bracelets
            .iter()
            .map(|entry| match &self.base_dir {
                Some(base) if entry.path.is_relative() => {
                    CatalogEntry::new(entry.id.clone(), entry.name.clone(), base.join(&entry.path))
                }
                _ => entry.clone(),
            })
            .collect();
        BraceletCatalog::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("tryon.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.canvas().unwrap(), CanvasSize::new(800, 600).unwrap());
    }

    #[test]
    fn test_partial_file_and_catalog_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tryon.json");
        std::fs::write(
            &path,
            r#"{
                "canvas_width": 1024,
                "session": { "export_pixel_ratio": 3.0 },
                "bracelets": [ { "id": "gold", "name": "Gold", "path": "gold.png" } ]
            }"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.canvas_width, 1024);
        assert_eq!(config.canvas_height, 600);
        assert!((config.session.export_pixel_ratio - 3.0).abs() < 1e-9);
        assert!((config.session.min_width - 40.0).abs() < 1e-9);
        assert_eq!(config.catalog().get("gold").unwrap().path, dir.path().join("gold.png"));
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tryon.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(AppError::Config { .. })));
    }

    #[test]
    fn test_zero_canvas_rejected() {
        let config = AppConfig {
            canvas_height: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.canvas(), Err(AppError::CanvasSize(800, 0))));
    }
}
