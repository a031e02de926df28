//! Texture image decoding
//!
//! Decodes common raster formats to tightly packed 8-bit RGBA, the only
//! pixel layout the upload pipeline accepts.

use std::path::Path;
use thiserror::Error;

/// Image decoding errors
#[derive(Error, Debug)]
pub enum ImageError {
    /// File could not be opened or decoded
    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decoded RGBA8 pixel data.
pub struct ImageData {
    /// Tightly packed RGBA8 pixels, row-major
    pub pixels: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ImageData {
    /// Total byte size of the pixel data.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }
}

/// Decode the image at `path` to RGBA8.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ImageData, ImageError> {
    let decoded = image::open(path)?.to_rgba8();
    let (width, height) = decoded.dimensions();

    Ok(ImageData {
        pixels: decoded.into_raw(),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_image("does/not/exist.png").is_err());
    }
}
