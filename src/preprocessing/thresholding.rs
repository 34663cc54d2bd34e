//! # Image Thresholding Module
//!
//! Binarization kernels run before OCR:
//! - a global threshold on contrast-stretched luma
//! - an adaptive threshold against the local 15×15 mean
//!
//! Both write the same 0/255 value to the red, green and blue channels and leave
//! alpha untouched.

use super::types::{PixelBuffer, CHANNELS};

/// Side length of the adaptive-threshold window.
pub const ADAPTIVE_BLOCK_SIZE: u32 = 15;
/// Offset subtracted from the local mean before comparing.
pub const ADAPTIVE_OFFSET: u32 = 10;
/// Contrast factor applied around mid-gray by the global threshold.
pub const CONTRAST_FACTOR: f64 = 1.5;
/// Global threshold applied after contrast stretching.
pub const GLOBAL_THRESHOLD: f64 = 128.0;

/// ITU-R BT.601 luma.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
}

/// Luma stored as a byte: clamped, rounded half to even.
#[inline]
fn luma_byte(r: u8, g: u8, b: u8) -> u8 {
    luma(r, g, b).clamp(0.0, 255.0).round_ties_even() as u8
}

#[inline]
fn write_gray(pixel: &mut [u8], value: u8) {
    pixel[0] = value;
    pixel[1] = value;
    pixel[2] = value;
}

/// Converts each pixel to luma, stretches contrast by 1.5 around 128 and
/// thresholds at 128, in place.
pub fn apply_grayscale_threshold(buffer: &mut PixelBuffer) {
    for pixel in buffer.as_bytes_mut().chunks_exact_mut(CHANNELS) {
        let gray = luma(pixel[0], pixel[1], pixel[2]);
        let adjusted = (gray - GLOBAL_THRESHOLD) * CONTRAST_FACTOR + GLOBAL_THRESHOLD;
        write_gray(pixel, if adjusted > GLOBAL_THRESHOLD { 255 } else { 0 });
    }
}

/// Thresholds each pixel against the mean luma of its 15×15 neighborhood minus 10.
///
/// The window is clipped at the image edges: neighbors outside the image are
/// left out of both the sum and the count, so edge pixels are compared against
/// a smaller window rather than a zero-padded one. Neighbor values always come
/// from the grayscale plane computed up front, never from already-thresholded
/// output.
///
/// Window sums come from a summed-area table, so the cost per pixel does not
/// depend on the block size.
pub fn apply_adaptive_threshold(buffer: &mut PixelBuffer) {
    let width = buffer.width() as usize;
    let height = buffer.height() as usize;
    if width == 0 || height == 0 {
        return;
    }

    let gray: Vec<u8> = buffer
        .as_bytes()
        .chunks_exact(CHANNELS)
        .map(|p| luma_byte(p[0], p[1], p[2]))
        .collect();
    let table = IntegralImage::new(&gray, width, height);

    let half = (ADAPTIVE_BLOCK_SIZE / 2) as usize;
    let offset = u64::from(ADAPTIVE_OFFSET);
    let data = buffer.as_bytes_mut();

    for y in 0..height {
        let y0 = y.saturating_sub(half);
        let y1 = (y + half).min(height - 1);
        for x in 0..width {
            let x0 = x.saturating_sub(half);
            let x1 = (x + half).min(width - 1);

            let sum = table.window_sum(x0, y0, x1, y1);
            let count = ((x1 - x0 + 1) * (y1 - y0 + 1)) as u64;
            let pixel = u64::from(gray[y * width + x]);

            // pixel > sum / count - offset, kept in integers
            let value = if (pixel + offset) * count > sum { 255 } else { 0 };

            let i = (y * width + x) * CHANNELS;
            write_gray(&mut data[i..i + CHANNELS], value);
        }
    }
}

/// Summed-area table with a zero row and column in front.
struct IntegralImage {
    stride: usize,
    sums: Vec<u64>,
}

impl IntegralImage {
    fn new(gray: &[u8], width: usize, height: usize) -> Self {
        let stride = width + 1;
        let mut sums = vec![0u64; stride * (height + 1)];
        for y in 0..height {
            let mut row_sum = 0u64;
            for x in 0..width {
                row_sum += u64::from(gray[y * width + x]);
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_sum;
            }
        }
        Self { stride, sums }
    }

    /// Sum over the inclusive rectangle `[x0, x1] x [y0, y1]`.
    fn window_sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        let s = self.stride;
        self.sums[(y1 + 1) * s + x1 + 1] + self.sums[y0 * s + x0]
            - self.sums[y0 * s + x1 + 1]
            - self.sums[(y1 + 1) * s + x0]
    }
}
