//! # Application Error Types
//!
//! This module defines common error types used throughout the nutrition label scanner.
//! It provides structured error handling for configuration, preprocessing and OCR.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Image preprocessing errors (loading, encoding, malformed buffers)
    Preprocessing(String),
    /// OCR processing errors
    Ocr(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Preprocessing(msg) => write!(f, "[PREPROCESSING] {}", msg),
            AppError::Ocr(msg) => write!(f, "[OCR] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<crate::ocr_errors::OcrError> for AppError {
    fn from(err: crate::ocr_errors::OcrError) -> Self {
        AppError::Ocr(err.to_string())
    }
}

impl From<crate::preprocessing::PreprocessingError> for AppError {
    fn from(err: crate::preprocessing::PreprocessingError) -> Self {
        AppError::Preprocessing(err.to_string())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting
pub mod error_logging {
    use tracing::error;

    /// Log OCR processing errors with attempt and timing context
    pub fn log_ocr_error(
        error: &impl std::fmt::Display,
        operation: &str,
        attempt: Option<usize>,
        recognition_config: Option<&str>,
        processing_duration: Option<std::time::Duration>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            attempt = ?attempt,
            recognition_config = ?recognition_config,
            processing_duration_ms = ?processing_duration.map(|d| d.as_millis()),
            "OCR processing failed"
        );
    }

    /// Log image preprocessing errors with buffer context
    pub fn log_preprocessing_error(
        error: &impl std::fmt::Display,
        operation: &str,
        dimensions: Option<(u32, u32)>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            dimensions = ?dimensions,
            "Image preprocessing failed"
        );
    }

    /// Log configuration errors during startup/initialization
    pub fn log_config_error(error: &impl std::fmt::Display, config_key: &str, operation: &str) {
        error!(
            error = %error,
            config_key = %config_key,
            operation = %operation,
            "Configuration error"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr_errors::OcrError;
    use crate::preprocessing::PreprocessingError;

    #[test]
    fn test_app_error_display_tags() {
        assert_eq!(
            AppError::Config("bad crop".to_string()).to_string(),
            "[CONFIG] bad crop"
        );
        assert_eq!(AppError::Ocr("x".to_string()).to_string(), "[OCR] x");
    }

    #[test]
    fn test_conversions_keep_source_message() {
        let err: AppError = OcrError::Timeout("attempt 2".to_string()).into();
        match err {
            AppError::Ocr(msg) => assert!(msg.contains("attempt 2")),
            other => panic!("unexpected variant: {other:?}"),
        }

        let err: AppError = PreprocessingError::InvalidDimensions {
            width: 2,
            height: 2,
            len: 3,
        }
        .into();
        assert!(matches!(err, AppError::Preprocessing(_)));
    }
}
