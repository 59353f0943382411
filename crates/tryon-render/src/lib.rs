//! Bracelet Try-On Render Library
//!
//! CPU compositor, image decoding and PNG encoding for the try-on editor.
//! The compositor rasterizes with tiny-skia so exports are deterministic
//! and need no GPU.

mod compositor;
mod decode;
mod error;
pub mod loader;

pub use compositor::{pixmap_to_raster, raster_to_pixmap, to_skia_transform, SkiaCompositor};
pub use decode::{decode_image, encode_png, ImageFormat};
pub use error::{RenderError, RenderResult};
pub use loader::{BoxFuture, FsImageLoader, ImageLoader, ImageSource, MemoryImageLoader};
