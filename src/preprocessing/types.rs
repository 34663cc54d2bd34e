//! # Shared Types for Image Preprocessing
//!
//! This module contains the pixel buffer value type and the enums shared across
//! the preprocessing sub-modules.

use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};

/// Number of bytes per pixel (red, green, blue, alpha).
pub const CHANNELS: usize = 4;

/// Errors that can occur during image preprocessing operations.
#[derive(Debug, Clone, PartialEq)]
pub enum PreprocessingError {
    /// Byte length does not match `width * height * 4`
    InvalidDimensions { width: u32, height: u32, len: usize },
    /// Failed to load or decode image
    ImageLoad { message: String },
    /// Failed to encode the buffer into an image format
    ImageEncode { message: String },
}

impl std::fmt::Display for PreprocessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreprocessingError::InvalidDimensions { width, height, len } => {
                write!(
                    f,
                    "Invalid pixel buffer: {}x{} RGBA requires {} bytes, got {}",
                    width,
                    height,
                    *width as usize * *height as usize * CHANNELS,
                    len
                )
            }
            PreprocessingError::ImageLoad { message } => {
                write!(f, "Failed to load image: {}", message)
            }
            PreprocessingError::ImageEncode { message } => {
                write!(f, "Failed to encode image: {}", message)
            }
        }
    }
}

impl std::error::Error for PreprocessingError {}

/// An owned RGBA frame, row-major, four bytes per pixel.
///
/// The length invariant `data.len() == width * height * 4` is checked once in
/// [`PixelBuffer::new`]; every transform relies on it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps raw RGBA bytes, rejecting buffers whose length does not match the dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use nutrition_label_ocr::preprocessing::PixelBuffer;
    ///
    /// let buffer = PixelBuffer::new(2, 1, vec![0, 0, 0, 255, 255, 255, 255, 255]).unwrap();
    /// assert_eq!(buffer.pixel(1, 0), [255, 255, 255, 255]);
    /// assert!(PixelBuffer::new(2, 2, vec![0; 3]).is_err());
    /// ```
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, PreprocessingError> {
        if data.len() != width as usize * height as usize * CHANNELS {
            return Err(PreprocessingError::InvalidDimensions {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates a buffer where every pixel has the given RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels in the buffer.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the buffer, returning the raw RGBA bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Byte offset of pixel `(x, y)`.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// RGBA value at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Builds a buffer from any decoded image, converting it to RGBA8.
    pub fn from_image(image: &DynamicImage) -> Self {
        Self::from(image.to_rgba8())
    }

    /// Loads and decodes an image file into a buffer.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PreprocessingError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| PreprocessingError::ImageLoad {
            message: format!("Failed to load image '{}': {}", path.display(), e),
        })?;
        Ok(Self::from_image(&image))
    }

    /// Converts the buffer into an `image` crate RGBA image.
    pub fn into_rgba_image(self) -> RgbaImage {
        let (width, height) = (self.width, self.height);
        RgbaImage::from_raw(width, height, self.data)
            .unwrap_or_else(|| unreachable!("length checked at construction"))
    }

    /// Encodes the buffer as PNG, the format handed to Tesseract.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, PreprocessingError> {
        let image = DynamicImage::ImageRgba8(self.clone().into_rgba_image());
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| PreprocessingError::ImageEncode {
                message: format!(
                    "PNG encoding of {}x{} buffer failed: {}",
                    self.width, self.height, e
                ),
            })?;
        Ok(bytes)
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }
}

/// Binarization kernel applied before OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreprocessMode {
    /// Leave the pixels untouched
    None,
    /// Luma, contrast stretch ×1.5, global threshold at 128
    #[default]
    GrayscaleThreshold,
    /// Luma compared against the 15×15 local mean minus 10
    AdaptiveThreshold,
}

impl PreprocessMode {
    /// Stable name used in configuration and metrics labels
    pub fn as_str(&self) -> &'static str {
        match self {
            PreprocessMode::None => "none",
            PreprocessMode::GrayscaleThreshold => "grayscale-threshold",
            PreprocessMode::AdaptiveThreshold => "adaptive-threshold",
        }
    }
}

impl std::fmt::Display for PreprocessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreprocessMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(PreprocessMode::None),
            "grayscale-threshold" | "grayscale" => Ok(PreprocessMode::GrayscaleThreshold),
            "adaptive-threshold" | "adaptive" => Ok(PreprocessMode::AdaptiveThreshold),
            other => Err(format!("unknown preprocess mode '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_length_mismatch() {
        let err = PixelBuffer::new(3, 2, vec![0; 23]).expect_err("23 bytes cannot hold 3x2 RGBA");
        assert_eq!(
            err,
            PreprocessingError::InvalidDimensions {
                width: 3,
                height: 2,
                len: 23
            }
        );
        assert!(err.to_string().contains("requires 24 bytes"));
    }

    #[test]
    fn test_zero_sized_buffer_is_valid() {
        let buffer = PixelBuffer::new(0, 5, Vec::new()).expect("0x5 buffer holds no bytes");
        assert!(buffer.is_empty());
        assert_eq!(buffer.pixel_count(), 0);
    }

    #[test]
    fn test_pixel_addressing_is_row_major() {
        let mut data = vec![0u8; 3 * 2 * 4];
        // pixel (2, 1) is the last one
        data[20..24].copy_from_slice(&[1, 2, 3, 4]);
        let buffer = PixelBuffer::new(3, 2, data).expect("valid buffer");
        assert_eq!(buffer.offset(2, 1), 20);
        assert_eq!(buffer.pixel(2, 1), [1, 2, 3, 4]);
    }

    #[test]
    fn test_rgba_image_round_trip_keeps_bytes() {
        let buffer = PixelBuffer::filled(4, 3, [10, 20, 30, 40]);
        let image = buffer.clone().into_rgba_image();
        assert_eq!(image.dimensions(), (4, 3));
        assert_eq!(PixelBuffer::from(image), buffer);
    }

    #[test]
    fn test_png_encoding_decodes_back() {
        let buffer = PixelBuffer::filled(5, 4, [200, 100, 50, 255]);
        let png = buffer.to_png_bytes().expect("PNG encoding should succeed");
        assert_eq!(
            image::guess_format(&png).expect("format should be detectable"),
            ImageFormat::Png
        );
        let decoded = image::load_from_memory(&png).expect("PNG should decode");
        assert_eq!(PixelBuffer::from_image(&decoded), buffer);
    }

    #[test]
    fn test_preprocess_mode_parsing() {
        assert_eq!("none".parse::<PreprocessMode>(), Ok(PreprocessMode::None));
        assert_eq!(
            " Adaptive-Threshold ".parse::<PreprocessMode>(),
            Ok(PreprocessMode::AdaptiveThreshold)
        );
        assert!("sharpen".parse::<PreprocessMode>().is_err());
        assert_eq!(PreprocessMode::default(), PreprocessMode::GrayscaleThreshold);
    }
}
