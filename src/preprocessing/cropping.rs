//! # Image Cropping Module
//!
//! Centered cropping of a captured frame so that the label fills most of the
//! image handed to OCR.

use std::time::Instant;

use super::types::{PixelBuffer, CHANNELS};

/// Crops the centered rectangle that keeps `percentage`% of each dimension.
///
/// The cropped size is `floor(dim * percentage / 100)` per axis and the
/// rectangle starts at `floor((dim - cropped) / 2)`. `percentage` is expected in
/// `50..=100`; callers clamp it. The result is always a fresh buffer, even at 100%.
///
/// # Examples
///
/// ```
/// use nutrition_label_ocr::preprocessing::{crop, PixelBuffer};
///
/// let frame = PixelBuffer::filled(100, 50, [255, 255, 255, 255]);
/// let cropped = crop(&frame, 70);
/// assert_eq!((cropped.width(), cropped.height()), (70, 35));
/// ```
pub fn crop(buffer: &PixelBuffer, percentage: u32) -> PixelBuffer {
    let start_time = Instant::now();

    let (crop_width, crop_height) = cropped_dimensions(buffer.width(), buffer.height(), percentage);
    let start_x = (buffer.width() - crop_width) / 2;
    let start_y = (buffer.height() - crop_height) / 2;

    let row_bytes = crop_width as usize * CHANNELS;
    let mut data = Vec::with_capacity(row_bytes * crop_height as usize);
    let source = buffer.as_bytes();
    for y in start_y..start_y + crop_height {
        let row_start = buffer.offset(start_x, y);
        data.extend_from_slice(&source[row_start..row_start + row_bytes]);
    }

    tracing::debug!(
        target: "ocr_preprocessing",
        "Cropped {}x{} frame to {}x{} at ({}, {}) in {}µs",
        buffer.width(),
        buffer.height(),
        crop_width,
        crop_height,
        start_x,
        start_y,
        start_time.elapsed().as_micros()
    );

    PixelBuffer::new(crop_width, crop_height, data)
        .unwrap_or_else(|e| unreachable!("crop produced a malformed buffer: {e}"))
}

/// Dimensions kept by a centered crop of `percentage`%.
pub fn cropped_dimensions(width: u32, height: u32, percentage: u32) -> (u32, u32) {
    let keep = |dim: u32| (u64::from(dim) * u64::from(percentage) / 100).min(u64::from(dim)) as u32;
    (keep(width), keep(height))
}
