//! Image decoding and PNG encoding.

use crate::error::{RenderError, RenderResult};
use tryon_core::{DecodeError, RasterImage};

/// Supported input image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        // RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }

    fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::WebP => image::ImageFormat::WebP,
        }
    }
}

/// Decode PNG, JPEG or WebP bytes into a straight-alpha RGBA image.
pub fn decode_image(data: &[u8]) -> Result<RasterImage, DecodeError> {
    if data.is_empty() {
        return Err(DecodeError::Empty);
    }
    let format = ImageFormat::from_magic_bytes(data)
        .ok_or_else(|| DecodeError::Format("unrecognized image signature".to_string()))?;

    let decoded = image::load_from_memory_with_format(data, format.to_image_format())
        .map_err(|e| DecodeError::Format(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let image = RasterImage::from_rgba8(width, height, rgba.into_raw()).ok_or(DecodeError::Empty)?;

    log::debug!("Decoded {} image {}x{}", format.mime_type(), width, height);
    Ok(image)
}

/// Encode an RGBA image as an 8-bit PNG.
pub fn encode_png(image: &RasterImage) -> RenderResult<Vec<u8>> {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        writer
            .write_image_data(image.pixels())
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        writer.finish().map_err(|e| RenderError::Encode(e.to_string()))?;
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes() {
        assert_eq!(ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D]), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic_bytes(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), None);
    }

    #[test]
    fn test_png_encode_then_decode_keeps_pixels() {
        let image = RasterImage::solid(7, 3, [10, 20, 30, 128]).unwrap();
        let bytes = encode_png(&image).unwrap();
        assert_eq!(ImageFormat::from_magic_bytes(&bytes), Some(ImageFormat::Png));
        let back = decode_image(&bytes).unwrap();
        assert_eq!(back, image);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode_image(&[]), Err(DecodeError::Empty));
        assert!(matches!(decode_image(b"not an image at all"), Err(DecodeError::Format(_))));
        // Valid signature, truncated body.
        assert!(matches!(
            decode_image(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00]),
            Err(DecodeError::Format(_))
        ));
    }
}
