//! # Image Transform Tests Module
//!
//! Property-style tests for the crop, downscale and binarization transforms,
//! plus loading frames from image files.

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use nutrition_label_ocr::preprocessing::{
        apply_adaptive_threshold, crop, downscale, preprocess, PixelBuffer, PreprocessMode,
        PreprocessingError,
    };

    /// Buffer where every pixel carries its coordinates
    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[
                    (x * 17 % 256) as u8,
                    (y * 29 % 256) as u8,
                    ((x + y) * 7 % 256) as u8,
                    (x * 3 + y * 5) as u8,
                ]);
            }
        }
        PixelBuffer::new(width, height, data).expect("valid gradient buffer")
    }

    fn assert_binary(buffer: &PixelBuffer) {
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                let [r, g, b, _] = buffer.pixel(x, y);
                assert!(r == 0 || r == 255, "pixel ({x}, {y}) not binary: {r}");
                assert_eq!(r, g);
                assert_eq!(g, b);
            }
        }
    }

    /// Test crop dimensions and sub-rectangle identity across percentages
    #[test]
    fn test_crop_matches_source_sub_rectangle() {
        let frame = gradient(13, 9);

        for percentage in 50..=100 {
            let cropped = crop(&frame, percentage);
            let expected_width = 13 * percentage / 100;
            let expected_height = 9 * percentage / 100;
            assert_eq!(
                (cropped.width(), cropped.height()),
                (expected_width, expected_height),
                "dimensions at {percentage}%"
            );

            let start_x = (13 - expected_width) / 2;
            let start_y = (9 - expected_height) / 2;
            for y in 0..cropped.height() {
                for x in 0..cropped.width() {
                    assert_eq!(cropped.pixel(x, y), frame.pixel(start_x + x, start_y + y));
                }
            }
        }
    }

    /// Test that cropping leaves the captured frame untouched
    #[test]
    fn test_crop_does_not_modify_input() {
        let frame = gradient(10, 10);
        let before = frame.clone();
        let _ = crop(&frame, 60);
        assert_eq!(frame, before);
    }

    /// Test downscale identity when the frame already fits
    #[test]
    fn test_downscale_identity_when_within_bound() {
        let frame = gradient(30, 20);
        assert_eq!(downscale(frame.clone(), 30), frame);
        assert_eq!(downscale(frame.clone(), 1200), frame);
    }

    /// Test downscale bounds the longest side and keeps the aspect ratio
    #[test]
    fn test_downscale_bounds_longest_side() {
        let landscape = downscale(PixelBuffer::filled(300, 100, [9, 9, 9, 255]), 90);
        assert_eq!((landscape.width(), landscape.height()), (90, 30));

        let portrait = downscale(PixelBuffer::filled(64, 200, [9, 9, 9, 255]), 50);
        assert_eq!((portrait.width(), portrait.height()), (16, 50));
    }

    /// Test that None mode is the identity transform
    #[test]
    fn test_preprocess_none_is_identity() {
        let frame = gradient(16, 12);
        assert_eq!(preprocess(frame.clone(), PreprocessMode::None), frame);
    }

    /// Test grayscale threshold output is binary gray with alpha preserved
    #[test]
    fn test_grayscale_threshold_binary_and_alpha_preserved() {
        let frame = gradient(24, 18);
        let output = preprocess(frame.clone(), PreprocessMode::GrayscaleThreshold);

        assert_binary(&output);
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                assert_eq!(output.pixel(x, y)[3], frame.pixel(x, y)[3]);
            }
        }
    }

    /// Test adaptive threshold output is binary gray with alpha preserved
    #[test]
    fn test_adaptive_threshold_binary() {
        let frame = gradient(40, 30);
        let output = preprocess(frame.clone(), PreprocessMode::AdaptiveThreshold);

        assert_binary(&output);
        assert_eq!(output.pixel(39, 29)[3], frame.pixel(39, 29)[3]);
    }

    /// Test a uniform image binarizes to all white under the adaptive kernel
    #[test]
    fn test_adaptive_threshold_uniform_image_is_white() {
        for value in [0u8, 37, 128, 255] {
            let mut frame = PixelBuffer::filled(25, 20, [value, value, value, 99]);
            apply_adaptive_threshold(&mut frame);
            assert_eq!(frame, PixelBuffer::filled(25, 20, [255, 255, 255, 99]));
        }
    }

    /// Test a dark stroke on a light background survives as black
    #[test]
    fn test_adaptive_threshold_keeps_dark_stroke() {
        let mut frame = PixelBuffer::filled(30, 30, [240, 240, 240, 255]);
        let mut data = frame.clone().into_raw();
        for x in 0..30usize {
            let offset = (15 * 30 + x) * 4;
            data[offset..offset + 3].copy_from_slice(&[20, 20, 20]);
        }
        frame = PixelBuffer::new(30, 30, data).expect("valid buffer");

        let output = preprocess(frame, PreprocessMode::AdaptiveThreshold);
        for x in 0..30 {
            assert_eq!(output.pixel(x, 15), [0, 0, 0, 255]);
            assert_eq!(output.pixel(x, 14), [255, 255, 255, 255]);
            assert_eq!(output.pixel(x, 0), [255, 255, 255, 255]);
        }
    }

    /// Test loading a frame from a PNG file
    #[test]
    fn test_open_png_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("label.png");
        let mut image = RgbaImage::from_pixel(6, 4, Rgba([10, 20, 30, 255]));
        image.put_pixel(5, 3, Rgba([200, 100, 50, 128]));
        image.save(&path).expect("write png");

        let frame = PixelBuffer::open(&path).expect("load png");
        assert_eq!((frame.width(), frame.height()), (6, 4));
        assert_eq!(frame.pixel(0, 0), [10, 20, 30, 255]);
        assert_eq!(frame.pixel(5, 3), [200, 100, 50, 128]);
    }

    /// Test that a missing file is reported as a load error
    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = PixelBuffer::open(dir.path().join("missing.png")).expect_err("no such file");
        assert!(matches!(err, PreprocessingError::ImageLoad { .. }));
    }

    /// Test the PNG handed to the engine decodes back to the same pixels
    #[test]
    fn test_png_encoding_preserves_pixels() {
        let frame = gradient(7, 5);
        let bytes = frame.to_png_bytes().expect("encode png");
        let decoded = image::load_from_memory(&bytes).expect("decode png").to_rgba8();
        assert_eq!(PixelBuffer::from(decoded), frame);
    }
}
