//! RGBA8 pixel buffers exchanged with decoders, renderers and workers.

use crate::error::GradeError;

/// An sRGB-encoded RGBA8 image, stored row-major with no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// One `[R, G, B, A]` entry per pixel. Length = width × height.
    pub pixels: Vec<[u8; 4]>,
}

impl PixelBuffer {
    /// Wrap already-unpacked pixels, checking the length against the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<[u8; 4]>) -> Result<Self, GradeError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(GradeError::BufferSize {
                width,
                height,
                len: pixels.len() * 4,
                expected: expected * 4,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a buffer from interleaved RGBA bytes (canvas `ImageData` layout).
    pub fn from_raw(width: u32, height: u32, bytes: &[u8]) -> Result<Self, GradeError> {
        let expected = width as usize * height as usize * 4;
        if bytes.len() != expected {
            return Err(GradeError::BufferSize {
                width,
                height,
                len: bytes.len(),
                expected,
            });
        }
        let pixels: &[[u8; 4]] = bytemuck::cast_slice(bytes);
        Ok(Self {
            width,
            height,
            pixels: pixels.to_vec(),
        })
    }

    /// A `width × height` buffer filled with one color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![rgba; width as usize * height as usize],
        }
    }

    /// Interleaved RGBA bytes, without copying.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// True when the buffer holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Copy out of a decoded `image` crate buffer.
    pub fn from_rgba_image(img: &image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.pixels().map(|p| p.0).collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Convert into an `image` crate buffer for encoding by the caller.
    pub fn into_rgba_image(self) -> image::RgbaImage {
        let mut out = image::RgbaImage::new(self.width, self.height);
        for (dst, src) in out.pixels_mut().zip(self.pixels) {
            dst.0 = src;
        }
        out
    }
}
