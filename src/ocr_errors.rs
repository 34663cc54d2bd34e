//! # OCR Error Types Module
//!
//! This module defines the error type surfaced by the recognition capability and
//! the OCR cascade. Only infrastructural failures are errors here: a label that
//! could not be parsed is a normal cascade outcome, not an `OcrError`.

/// Custom error types for OCR operations
#[derive(Debug, Clone, PartialEq)]
pub enum OcrError {
    /// OCR engine/session initialization errors
    Initialization(String),
    /// Engine parameter errors (segmentation mode, resolution, whitelist)
    Configuration(String),
    /// Pixel buffer could not be handed to the engine
    ImageEncode(String),
    /// Text extraction errors
    Extraction(String),
    /// Timeout errors
    Timeout(String),
    /// The cascade was cancelled at an attempt boundary
    Cancelled(String),
}

impl std::fmt::Display for OcrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrError::Initialization(msg) => write!(f, "[OCR_INIT] OCR engine initialization failed: {}", msg),
            OcrError::Configuration(msg) => write!(f, "[OCR_CONFIG] OCR engine configuration failed: {}", msg),
            OcrError::ImageEncode(msg) => write!(f, "[IMAGE_ENCODE] Failed to prepare image for OCR processing: {}", msg),
            OcrError::Extraction(msg) => write!(f, "[OCR_EXTRACT] Text extraction from image failed: {}", msg),
            OcrError::Timeout(msg) => write!(f, "[OCR_TIMEOUT] OCR processing timed out: {}", msg),
            OcrError::Cancelled(msg) => write!(f, "[OCR_CANCELLED] OCR cascade cancelled: {}", msg),
        }
    }
}

impl std::error::Error for OcrError {}

impl From<anyhow::Error> for OcrError {
    fn from(err: anyhow::Error) -> Self {
        OcrError::Extraction(err.to_string())
    }
}

impl From<crate::preprocessing::PreprocessingError> for OcrError {
    fn from(err: crate::preprocessing::PreprocessingError) -> Self {
        OcrError::ImageEncode(err.to_string())
    }
}
