//! # Image Preprocessing Module
//!
//! Pure transforms that turn a captured camera frame into an OCR-ready buffer.
//!
//! The module is organized into focused sub-modules:
//! - `cropping`: centered crop keeping a percentage of the frame
//! - `scaling`: bound the longest side of the frame
//! - `thresholding`: global and adaptive binarization kernels
//! - `types`: the `PixelBuffer` value type, modes and errors
//!
//! Every transform takes a well-formed [`PixelBuffer`] and cannot fail.

pub mod cropping;
pub mod scaling;
pub mod thresholding;
pub mod types;

use std::time::Instant;

pub use cropping::{crop, cropped_dimensions};
pub use scaling::{downscale, downscaled_dimensions, DEFAULT_MAX_DIMENSION};
pub use thresholding::{apply_adaptive_threshold, apply_grayscale_threshold, luma};
pub use types::{PixelBuffer, PreprocessMode, PreprocessingError, CHANNELS};

/// Default percentage of each dimension kept by the centered crop.
pub const DEFAULT_CROP_PERCENTAGE: u32 = 70;

/// Applies the binarization kernel selected by `mode`, in place.
///
/// `PreprocessMode::None` hands the buffer back untouched.
///
/// # Examples
///
/// ```
/// use nutrition_label_ocr::preprocessing::{preprocess, PixelBuffer, PreprocessMode};
///
/// let frame = PixelBuffer::filled(4, 4, [200, 200, 200, 17]);
/// let binary = preprocess(frame, PreprocessMode::GrayscaleThreshold);
/// assert_eq!(binary.pixel(0, 0), [255, 255, 255, 17]);
/// ```
pub fn preprocess(mut buffer: PixelBuffer, mode: PreprocessMode) -> PixelBuffer {
    let start_time = Instant::now();
    match mode {
        PreprocessMode::None => return buffer,
        PreprocessMode::GrayscaleThreshold => apply_grayscale_threshold(&mut buffer),
        PreprocessMode::AdaptiveThreshold => apply_adaptive_threshold(&mut buffer),
    }
    let elapsed = start_time.elapsed();

    tracing::debug!(
        target: "ocr_preprocessing",
        mode = %mode,
        width = buffer.width(),
        height = buffer.height(),
        duration_ms = elapsed.as_millis() as u64,
        "Binarization completed"
    );
    crate::observability::record_preprocessing_metrics(mode, elapsed);

    buffer
}

/// Operator options for preparing a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOptions {
    /// Percentage of each dimension kept, expected in `50..=100`
    pub crop_percentage: u32,
    /// Bound on the longest side after cropping
    pub max_dimension: u32,
    /// Binarization kernel
    pub mode: PreprocessMode,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            crop_percentage: DEFAULT_CROP_PERCENTAGE,
            max_dimension: DEFAULT_MAX_DIMENSION,
            mode: PreprocessMode::default(),
        }
    }
}

/// Runs crop, downscale and binarization in order.
///
/// The captured frame is only read; the returned buffer is owned by the caller.
pub fn prepare_frame(frame: &PixelBuffer, options: &FrameOptions) -> PixelBuffer {
    let cropped = crop(frame, options.crop_percentage);
    let scaled = downscale(cropped, options.max_dimension);
    preprocess(scaled, options.mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_mode_is_identity() {
        let frame = PixelBuffer::new(2, 1, vec![12, 34, 56, 78, 90, 12, 34, 56])
            .expect("valid buffer");
        assert_eq!(preprocess(frame.clone(), PreprocessMode::None), frame);
    }

    #[test]
    fn test_prepare_frame_chains_transforms() {
        let frame = PixelBuffer::filled(400, 300, [240, 240, 240, 255]);
        let options = FrameOptions {
            max_dimension: 140,
            ..Default::default()
        };
        let prepared = prepare_frame(&frame, &options);

        // 70% crop -> 280x210, then bounded to 140x105
        assert_eq!((prepared.width(), prepared.height()), (140, 105));
        assert_eq!(prepared.pixel(70, 52), [255, 255, 255, 255]);
    }
}
