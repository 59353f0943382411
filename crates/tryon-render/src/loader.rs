//! Asynchronous image loading.
//!
//! Photos and bracelet pictures arrive from wherever the host gets them:
//! raw upload bytes, a file on disk or a URI. Loaders fetch and decode
//! them off the scene; the scene only ever sees a decoded [`RasterImage`].

use crate::decode::decode_image;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::RwLock;
use tryon_core::{DecodeError, RasterImage};

/// Boxed future returned by loaders.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Encoded bytes already in memory, e.g. an upload.
    Bytes(Vec<u8>),
    /// A file on disk.
    Path(PathBuf),
    /// A URI such as `file:///...` or a catalog asset key.
    Uri(String),
}

impl ImageSource {
    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Uri(uri) => uri.clone(),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

/// Trait for image loading backends.
pub trait ImageLoader: Send + Sync {
    /// Fetch and decode an image.
    fn load(&self, source: &ImageSource) -> BoxFuture<'_, Result<RasterImage, DecodeError>>;
}

/// Loads images from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsImageLoader {
    base_dir: Option<PathBuf>,
}

impl FsImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `dir`.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, DecodeError> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DecodeError::NotFound(path.display().to_string()),
        _ => DecodeError::Io(e.to_string()),
    })
}

impl ImageLoader for FsImageLoader {
    fn load(&self, source: &ImageSource) -> BoxFuture<'_, Result<RasterImage, DecodeError>> {
        let source = source.clone();
        Box::pin(async move {
            let bytes = match source {
                ImageSource::Bytes(bytes) => bytes,
                ImageSource::Path(path) => read_file(&self.resolve(&path))?,
                ImageSource::Uri(uri) => {
                    let path = uri.strip_prefix("file://").unwrap_or(&uri);
                    read_file(&self.resolve(Path::new(path)))?
                }
            };
            decode_image(&bytes)
        })
    }
}

/// In-memory asset store for tests and bundled assets.
#[derive(Default)]
pub struct MemoryImageLoader {
    assets: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded bytes under `key`. Paths are keyed by their display form.
    pub fn register(&self, key: impl Into<String>, bytes: Vec<u8>) -> Result<(), DecodeError> {
        let mut assets = self
            .assets
            .write()
            .map_err(|e| DecodeError::Io(format!("Lock error: {}", e)))?;
        assets.insert(key.into(), bytes);
        Ok(())
    }
}

impl ImageLoader for MemoryImageLoader {
    fn load(&self, source: &ImageSource) -> BoxFuture<'_, Result<RasterImage, DecodeError>> {
        let source = source.clone();
        Box::pin(async move {
            let key = match source {
                ImageSource::Bytes(bytes) => return decode_image(&bytes),
                ImageSource::Path(path) => path.display().to_string(),
                ImageSource::Uri(uri) => uri,
            };
            let bytes = {
                let assets = self
                    .assets
                    .read()
                    .map_err(|e| DecodeError::Io(format!("Lock error: {}", e)))?;
                assets.get(&key).cloned().ok_or(DecodeError::NotFound(key))?
            };
            decode_image(&bytes)
        })
    }
}
