//! Image decoding helpers for hosts.
//!
//! The engine only needs an image's pixel dimensions; hosts that draw the
//! image themselves can also take the decoded RGBA pixels from here.

use crate::renderer::{RenderResult, RendererError};
use std::path::Path;

/// A decoded image in straight-alpha RGBA8.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    /// Size in image units, as the engine expects it.
    pub fn size(&self) -> kurbo::Size {
        kurbo::Size::new(self.width as f64, self.height as f64)
    }
}

impl From<::image::ImageError> for RendererError {
    fn from(err: ::image::ImageError) -> Self {
        match err {
            ::image::ImageError::Unsupported(e) => RendererError::Unsupported(e.to_string()),
            ::image::ImageError::IoError(e) => RendererError::Io(e),
            other => RendererError::Decode(other.to_string()),
        }
    }
}

/// Decode an encoded image (PNG, JPEG or WebP) from memory.
pub fn decode_image(bytes: &[u8]) -> RenderResult<DecodedImage> {
    let decoded = ::image::load_from_memory(bytes)?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("decoded {}x{} image ({} bytes)", width, height, bytes.len());
    Ok(DecodedImage {
        width,
        height,
        rgba: rgba.into_vec(),
    })
}

/// Read only the header of an image file to get its dimensions.
pub fn probe_dimensions(path: impl AsRef<Path>) -> RenderResult<(u32, u32)> {
    let path = path.as_ref();
    let dimensions = ::image::image_dimensions(path)?;
    log::debug!("{} is {}x{}", path.display(), dimensions.0, dimensions.1);
    Ok(dimensions)
}
