//! The fixed list of bracelets a user can try on.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tryon_render::ImageSource;

/// One selectable bracelet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    /// Display name.
    pub name: String,
    /// Image file, relative to the config file's directory.
    pub path: PathBuf,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn source(&self) -> ImageSource {
        ImageSource::Path(self.path.clone())
    }
}

/// Bracelet catalog, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BraceletCatalog {
    entries: Vec<CatalogEntry>,
}

impl BraceletCatalog {
    /// Build a catalog. Later entries with a duplicate id are dropped.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut unique: Vec<CatalogEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            if unique.iter().any(|e| e.id == entry.id) {
                log::warn!("Ignoring duplicate bracelet id {:?}", entry.id);
                continue;
            }
            unique.push(entry);
        }
        Self { entries: unique }
    }

    pub fn get(&self, id: &str) -> AppResult<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::UnknownBracelet(id.to_string()))
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
