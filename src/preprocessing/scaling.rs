//! # Image Scaling Module
//!
//! Bounds the longest side of a frame before OCR. Large camera frames slow
//! Tesseract down without improving recognition of label-sized text.

use image::imageops::{self, FilterType};

use super::types::PixelBuffer;

/// Default bound on the longest side of a frame handed to OCR.
pub const DEFAULT_MAX_DIMENSION: u32 = 1200;

/// Scales the frame down so that neither side exceeds `max_dimension`.
///
/// The scale factor is `min(max/width, max/height, 1)`. When it is at least 1
/// the input buffer is returned as-is; otherwise a new buffer of
/// `floor(width * scale) x floor(height * scale)` is resampled with a single
/// triangle-filter pass.
///
/// # Examples
///
/// ```
/// use nutrition_label_ocr::preprocessing::{downscale, PixelBuffer};
///
/// let frame = PixelBuffer::filled(240, 180, [0, 0, 0, 255]);
/// let scaled = downscale(frame, 120);
/// assert_eq!((scaled.width(), scaled.height()), (120, 90));
/// ```
pub fn downscale(buffer: PixelBuffer, max_dimension: u32) -> PixelBuffer {
    let (width, height) = (buffer.width(), buffer.height());
    let Some((new_width, new_height)) = downscaled_dimensions(width, height, max_dimension) else {
        return buffer;
    };

    let start_time = std::time::Instant::now();
    let scaled = if new_width == 0 || new_height == 0 {
        PixelBuffer::filled(new_width, new_height, [0, 0, 0, 0])
    } else {
        let source = buffer.into_rgba_image();
        PixelBuffer::from(imageops::resize(
            &source,
            new_width,
            new_height,
            FilterType::Triangle,
        ))
    };

    tracing::debug!(
        target: "ocr_preprocessing",
        "Downscaled {}x{} frame to {}x{} (max dimension {}) in {}ms",
        width,
        height,
        new_width,
        new_height,
        max_dimension,
        start_time.elapsed().as_millis()
    );

    scaled
}

/// Target dimensions for [`downscale`], or `None` when no scaling is needed.
///
/// The floors are taken on the exact ratio `dim * max / longest`, so the
/// longest side lands on `max_dimension` exactly.
pub fn downscaled_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if longest <= max_dimension || longest == 0 {
        return None;
    }
    let scale = |dim: u32| (u64::from(dim) * u64::from(max_dimension) / u64::from(longest)) as u32;
    Some((scale(width), scale(height)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_frame_is_returned_untouched() {
        let frame = PixelBuffer::filled(800, 600, [1, 2, 3, 4]);
        let ptr = frame.as_bytes().as_ptr();
        let result = downscale(frame, 1200);
        assert_eq!((result.width(), result.height()), (800, 600));
        // same allocation moved through
        assert_eq!(result.as_bytes().as_ptr(), ptr);
    }

    #[test]
    fn test_exact_bound_is_not_scaled() {
        assert_eq!(downscaled_dimensions(1200, 1200, 1200), None);
        assert_eq!(downscaled_dimensions(1200, 10, 1200), None);
    }

    #[test]
    fn test_portrait_frame_bounded_by_height() {
        assert_eq!(downscaled_dimensions(1080, 1920, 1200), Some((675, 1200)));
    }

    #[test]
    fn test_landscape_frame_bounded_by_width() {
        assert_eq!(downscaled_dimensions(1920, 1080, 1200), Some((1200, 675)));
    }

    #[test]
    fn test_downscale_preserves_uniform_color() {
        let frame = PixelBuffer::filled(300, 150, [90, 120, 200, 255]);
        let scaled = downscale(frame, 100);
        assert_eq!((scaled.width(), scaled.height()), (100, 50));
        let expected = [90u8, 120, 200, 255];
        for y in 0..scaled.height() {
            for x in 0..scaled.width() {
                let pixel = scaled.pixel(x, y);
                for (got, want) in pixel.iter().zip(expected.iter()) {
                    assert!(got.abs_diff(*want) <= 1, "pixel ({x}, {y}) = {pixel:?}");
                }
            }
        }
    }

    #[test]
    fn test_extreme_aspect_ratio_can_floor_to_zero() {
        let frame = PixelBuffer::filled(1000, 1, [0, 0, 0, 255]);
        let scaled = downscale(frame, 100);
        assert_eq!((scaled.width(), scaled.height()), (100, 0));
        assert!(scaled.is_empty());
    }
}
