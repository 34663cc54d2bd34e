//! # OCR Cascade Controller
//!
//! Runs the recognition capability over a fixed, ordered sequence of four
//! configurations, cheapest first, and stops at the first attempt whose text
//! parses into a usable label.
//!
//! ## State Machine
//!
//! ```text
//! EnglishBlock ──miss──► EnglishSparse ──miss──► BilingualBlock ──miss──► BilingualSparse
//!      │                      │                       │                         │
//!   success                success                 success                (always)
//!      ▼                      ▼                       ▼                         ▼
//!   outcome                outcome                 outcome                  outcome
//! ```
//!
//! - A parse miss moves to the next step. The last step returns its result
//!   whether or not it parsed; "nothing found" is an outcome, not an error.
//! - A recognition failure (session creation, configuration, recognition,
//!   disposal) aborts the whole cascade and propagates unchanged.
//! - Every session is disposed before the next decision, including when
//!   recognition failed.
//! - The cancellation token is checked before each attempt starts.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Instrument};

use crate::errors::error_logging;
use crate::nutrition::{self, ParsedNutrition};
use crate::observability;
use crate::ocr_config::{LanguageSet, OcrConfig, RecognitionConfig, SegmentationMode};
use crate::ocr_errors::OcrError;
use crate::preprocessing::PixelBuffer;
use crate::recognizer::{CascadeObserver, RecognitionSession, TextRecognizer};

/// The four configurations in the order they are tried.
pub const CASCADE_CONFIGS: [RecognitionConfig; 4] = [
    RecognitionConfig::new(LanguageSet::English, SegmentationMode::UniformBlock),
    RecognitionConfig::new(LanguageSet::English, SegmentationMode::SparseText),
    RecognitionConfig::new(LanguageSet::EnglishArabic, SegmentationMode::UniformBlock),
    RecognitionConfig::new(LanguageSet::EnglishArabic, SegmentationMode::SparseText),
];

/// One step of the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CascadeStep {
    /// English, uniform block: clean single-column Latin label
    EnglishBlock,
    /// English, sparse text: irregular or multi-column layout
    EnglishSparse,
    /// English + Arabic, uniform block: bilingual label
    BilingualBlock,
    /// English + Arabic, sparse text: final fallback
    BilingualSparse,
}

impl CascadeStep {
    pub const FIRST: CascadeStep = CascadeStep::EnglishBlock;

    pub const ALL: [CascadeStep; 4] = [
        CascadeStep::EnglishBlock,
        CascadeStep::EnglishSparse,
        CascadeStep::BilingualBlock,
        CascadeStep::BilingualSparse,
    ];

    fn index(self) -> usize {
        match self {
            CascadeStep::EnglishBlock => 0,
            CascadeStep::EnglishSparse => 1,
            CascadeStep::BilingualBlock => 2,
            CascadeStep::BilingualSparse => 3,
        }
    }

    /// 1-based attempt number.
    pub fn attempt_number(self) -> usize {
        self.index() + 1
    }

    pub fn config(self) -> RecognitionConfig {
        CASCADE_CONFIGS[self.index()]
    }

    /// The step tried after a parse miss, `None` for the final step.
    pub fn next(self) -> Option<CascadeStep> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn is_final(self) -> bool {
        self.next().is_none()
    }

    /// Status line emitted before the attempt starts.
    pub fn status_message(self) -> String {
        format!("OCR attempt #{}: {}...", self.attempt_number(), self.config())
    }
}

/// Raw result of one recognition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrAttemptResult {
    pub text: String,
    pub config: RecognitionConfig,
}

/// What the cascade terminated on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeOutcome {
    /// Raw recognized text, kept for audit and manual correction
    pub text: String,
    /// Configuration of the terminating attempt
    pub config: RecognitionConfig,
    /// Fields parsed from `text`
    pub parsed: ParsedNutrition,
    /// 1-based number of the terminating attempt
    pub attempt: usize,
}

impl CascadeOutcome {
    pub fn is_successful(&self) -> bool {
        self.parsed.is_successful()
    }
}

/// Drives a [`TextRecognizer`] through the cascade.
pub struct CascadeController<R> {
    recognizer: R,
    dpi_hint: u32,
}

impl<R: TextRecognizer> CascadeController<R> {
    pub fn new(recognizer: R, config: &OcrConfig) -> Self {
        Self {
            recognizer,
            dpi_hint: config.dpi_hint,
        }
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn dpi_hint(&self) -> u32 {
        self.dpi_hint
    }

    /// Runs the cascade over `buffer` until an attempt parses or the final
    /// attempt completes.
    ///
    /// # Errors
    ///
    /// - Any error from the recognizer, unchanged; later attempts are not run
    /// - `OcrError::Cancelled` when `cancel` fires before an attempt starts
    pub async fn run(
        &self,
        buffer: &PixelBuffer,
        observer: &dyn CascadeObserver,
        cancel: &CancellationToken,
    ) -> Result<CascadeOutcome, OcrError> {
        self.run_cascade(buffer, observer, cancel)
            .instrument(observability::ocr_span("ocr_cascade"))
            .await
    }

    async fn run_cascade(
        &self,
        buffer: &PixelBuffer,
        observer: &dyn CascadeObserver,
        cancel: &CancellationToken,
    ) -> Result<CascadeOutcome, OcrError> {
        let start_time = Instant::now();
        let mut step = CascadeStep::FIRST;

        loop {
            if cancel.is_cancelled() {
                info!(attempt = step.attempt_number(), "OCR cascade cancelled before attempt");
                return Err(OcrError::Cancelled(format!(
                    "cancelled before attempt #{}",
                    step.attempt_number()
                )));
            }

            let config = step.config();
            observer.on_status(&step.status_message());
            observer.on_progress(0);
            info!(
                attempt = step.attempt_number(),
                languages = config.languages.tesseract_code(),
                psm = config.segmentation.page_seg_mode().as_str(),
                width = buffer.width(),
                height = buffer.height(),
                "Starting OCR attempt"
            );

            let attempt_start = Instant::now();
            let attempt = match self.run_attempt(buffer, config, observer).await {
                Ok(attempt) => attempt,
                Err(err) => {
                    let elapsed = attempt_start.elapsed();
                    observability::record_ocr_attempt_metrics(config.label(), "error", elapsed);
                    observability::record_cascade_metrics("error", step.attempt_number(), start_time.elapsed());
                    error_logging::log_ocr_error(
                        &err,
                        "ocr_cascade_attempt",
                        Some(step.attempt_number()),
                        Some(config.label()),
                        Some(elapsed),
                    );
                    return Err(err);
                }
            };

            let parsed = nutrition::parse(&attempt.text);
            let success = parsed.is_successful();
            let elapsed = attempt_start.elapsed();
            observability::record_ocr_attempt_metrics(
                config.label(),
                if success { "success" } else { "miss" },
                elapsed,
            );
            info!(
                attempt = step.attempt_number(),
                success,
                characters = attempt.text.chars().count(),
                fields_found = parsed.found_field_count(),
                duration_ms = elapsed.as_millis() as u64,
                "OCR attempt finished"
            );

            match step.next() {
                Some(next) if !success => step = next,
                _ => return Ok(self.finish(step, attempt, parsed, start_time.elapsed())),
            }
        }
    }

    fn finish(
        &self,
        step: CascadeStep,
        attempt: OcrAttemptResult,
        parsed: ParsedNutrition,
        total: Duration,
    ) -> CascadeOutcome {
        let success = parsed.is_successful();
        observability::record_cascade_metrics(
            if success { "success" } else { "incomplete" },
            step.attempt_number(),
            total,
        );
        if success {
            info!(
                attempt = step.attempt_number(),
                config = %attempt.config,
                duration_ms = total.as_millis() as u64,
                "Nutrition label extracted"
            );
        } else {
            warn!(
                attempt = step.attempt_number(),
                fields_found = parsed.found_field_count(),
                duration_ms = total.as_millis() as u64,
                "All OCR attempts finished without calories and serving size; manual entry needed"
            );
        }

        CascadeOutcome {
            text: attempt.text,
            config: attempt.config,
            parsed,
            attempt: step.attempt_number(),
        }
    }

    /// One attempt: create, configure, recognize, dispose.
    async fn run_attempt(
        &self,
        buffer: &PixelBuffer,
        config: RecognitionConfig,
        observer: &dyn CascadeObserver,
    ) -> Result<OcrAttemptResult, OcrError> {
        let mut session = self.recognizer.create_session(config.languages).await?;
        let recognized = self
            .recognize_in_session(&mut session, buffer, config, observer)
            .await;
        let disposed = session.dispose().await;

        match (recognized, disposed) {
            (Ok(text), Ok(())) => Ok(OcrAttemptResult { text, config }),
            (Ok(_), Err(dispose_err)) => Err(dispose_err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(dispose_err)) => {
                warn!(
                    error = %dispose_err,
                    config = config.label(),
                    "Failed to dispose OCR session after recognition error"
                );
                Err(err)
            }
        }
    }

    async fn recognize_in_session(
        &self,
        session: &mut R::Session,
        buffer: &PixelBuffer,
        config: RecognitionConfig,
        observer: &dyn CascadeObserver,
    ) -> Result<String, OcrError> {
        session.configure(config.segmentation, self.dpi_hint).await?;
        let progress = |percent: u8| observer.on_progress(percent.min(100));
        session.recognize(buffer, &progress).await
    }
}
