//! # Label Scanner
//!
//! Ties frame preparation and the OCR cascade together: one captured frame in,
//! one [`CascadeOutcome`] out.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{info, Instrument};

use crate::cascade::{CascadeController, CascadeOutcome};
use crate::config::AppConfig;
use crate::observability;
use crate::ocr_errors::OcrError;
use crate::preprocessing::{prepare_frame, FrameOptions, PixelBuffer};
use crate::recognizer::{CascadeObserver, TextRecognizer};

/// Prepares frames and runs them through the cascade.
pub struct LabelScanner<R> {
    controller: CascadeController<R>,
    options: FrameOptions,
}

impl<R: TextRecognizer> LabelScanner<R> {
    pub fn new(controller: CascadeController<R>, options: FrameOptions) -> Self {
        Self {
            controller,
            options,
        }
    }

    pub fn from_config(recognizer: R, config: &AppConfig) -> Self {
        Self::new(
            CascadeController::new(recognizer, &config.ocr),
            config.scan.frame_options(),
        )
    }

    pub fn options(&self) -> &FrameOptions {
        &self.options
    }

    pub fn controller(&self) -> &CascadeController<R> {
        &self.controller
    }

    /// Crops, downscales and binarizes `frame`, then runs the cascade on the
    /// result. The captured frame is left untouched.
    pub async fn scan(
        &self,
        frame: &PixelBuffer,
        observer: &dyn CascadeObserver,
        cancel: &CancellationToken,
    ) -> Result<CascadeOutcome, OcrError> {
        let span = observability::scan_span(frame.width(), frame.height());
        async {
            let start_time = Instant::now();
            let prepared = prepare_frame(frame, &self.options);
            info!(
                crop_percentage = self.options.crop_percentage,
                mode = %self.options.mode,
                prepared_width = prepared.width(),
                prepared_height = prepared.height(),
                duration_ms = start_time.elapsed().as_millis() as u64,
                "Frame prepared for OCR"
            );

            let result = self.controller.run(&prepared, observer, cancel).await;
            observability::record_scan_metrics(
                result.as_ref().is_ok_and(CascadeOutcome::is_successful),
                start_time.elapsed(),
            );
            result
        }
        .instrument(span)
        .await
    }
}
