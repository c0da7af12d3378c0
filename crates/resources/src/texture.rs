//! CPU-side texture data.
//!
//! Decoded RGBA8 pixels ready for upload. Models without an assigned
//! texture fall back to a generated checkerboard.

use std::path::Path;

use tracing::info;

use crate::error::{ResourceError, ResourceResult};

/// Side length of the generated fallback checkerboard.
const CHECKERBOARD_SIZE: u32 = 256;
/// Cell size of the fallback checkerboard in pixels.
const CHECKERBOARD_CELL: u32 = 32;

/// Decoded RGBA8 image data.
#[derive(Clone, Debug)]
pub struct TextureData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 pixels, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Loads and decodes an image file to RGBA8.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be decoded.
    pub fn load(path: &Path) -> ResourceResult<Self> {
        if !path.exists() {
            return Err(ResourceError::FileNotFound(path.to_path_buf()));
        }

        let decoded = image::open(path)?.to_rgba8();
        let (width, height) = decoded.dimensions();

        info!(path = %path.display(), width, height, "Loaded texture");

        Ok(Self {
            width,
            height,
            pixels: decoded.into_raw(),
        })
    }

    /// Generates the gray checkerboard used when no texture is assigned.
    pub fn checkerboard() -> Self {
        let size = CHECKERBOARD_SIZE;
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);

        for y in 0..size {
            for x in 0..size {
                let even = ((x / CHECKERBOARD_CELL) + (y / CHECKERBOARD_CELL)) % 2 == 0;
                let shade = if even { 200 } else { 80 };
                pixels.extend_from_slice(&[shade, shade, shade, 255]);
            }
        }

        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    /// Returns the size of the pixel data in bytes.
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkerboard_dimensions() {
        let tex = TextureData::checkerboard();
        assert_eq!(tex.width, CHECKERBOARD_SIZE);
        assert_eq!(tex.height, CHECKERBOARD_SIZE);
        assert_eq!(tex.byte_len(), (tex.width * tex.height * 4) as usize);
    }

    #[test]
    fn test_checkerboard_alternates() {
        let tex = TextureData::checkerboard();
        let pixel = |x: u32, y: u32| {
            let i = ((y * tex.width + x) * 4) as usize;
            tex.pixels[i]
        };
        // Adjacent cells differ, diagonal cells match.
        assert_ne!(pixel(0, 0), pixel(CHECKERBOARD_CELL, 0));
        assert_eq!(pixel(0, 0), pixel(CHECKERBOARD_CELL, CHECKERBOARD_CELL));
        // Alpha is opaque.
        assert_eq!(tex.pixels[3], 255);
    }

    #[test]
    fn test_load_missing_file() {
        let result = TextureData::load(Path::new("no/such/texture.png"));
        assert!(matches!(result, Err(ResourceError::FileNotFound(_))));
    }
}
