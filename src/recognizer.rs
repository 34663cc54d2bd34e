//! # Text Recognition Capability
//!
//! The seam between the cascade and an OCR engine. An engine hands out one
//! session per attempt; the cascade configures it, runs recognition once and
//! disposes it before moving on. Any engine meeting this contract can drive the
//! cascade (see `tesseract` for the bundled backend).

use async_trait::async_trait;

use crate::ocr_config::{LanguageSet, SegmentationMode};
use crate::ocr_errors::OcrError;
use crate::preprocessing::PixelBuffer;

/// Factory for recognition sessions.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    type Session: RecognitionSession;

    /// Loads the models for `languages` and returns a fresh session.
    async fn create_session(&self, languages: LanguageSet) -> Result<Self::Session, OcrError>;
}

/// A single-use engine session.
#[async_trait]
pub trait RecognitionSession: Send {
    /// Sets the page segmentation mode and resolution hint.
    async fn configure(
        &mut self,
        segmentation: SegmentationMode,
        dpi_hint: u32,
    ) -> Result<(), OcrError>;

    /// Recognizes text in `buffer`, reporting progress (`0..=100`) as it goes.
    async fn recognize(
        &mut self,
        buffer: &PixelBuffer,
        progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<String, OcrError>;

    /// Releases everything the session allocated.
    async fn dispose(self) -> Result<(), OcrError>;
}

/// Observer for cascade status and progress. Purely informational.
pub trait CascadeObserver: Send + Sync {
    /// Called before each attempt with a message naming the attempt.
    fn on_status(&self, _message: &str) {}

    /// Progress of the running attempt, reset to 0 when an attempt starts.
    fn on_progress(&self, _percent: u8) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CascadeObserver for NoopObserver {}

/// Observer that forwards status and progress to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CascadeObserver for TracingObserver {
    fn on_status(&self, message: &str) {
        tracing::info!(status = %message, "OCR cascade status");
    }

    fn on_progress(&self, percent: u8) {
        tracing::trace!(progress = percent, "OCR recognition progress");
    }
}
