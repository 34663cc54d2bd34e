//! # OCR Configuration Module
//!
//! This module defines the recognition configurations walked by the cascade
//! (language set plus page segmentation mode) and the engine settings shared by
//! every attempt.

use serde::{Deserialize, Serialize};

// Constants for OCR configuration
pub const DEFAULT_DPI_HINT: u32 = 300;
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 30;

/// Page Segmentation Mode for Tesseract OCR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSegMode {
    /// Assume a single uniform block of text
    SingleBlock = 6,
    /// Find as much text as possible in no particular order
    SparseText = 11,
}

impl PageSegMode {
    /// Convert PSM mode to string value for Tesseract
    pub fn as_str(&self) -> &'static str {
        match self {
            PageSegMode::SingleBlock => "6",
            PageSegMode::SparseText => "11",
        }
    }

    /// Numeric PSM value
    pub fn number(&self) -> u8 {
        *self as u8
    }
}

/// Language combinations used by the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LanguageSet {
    /// Latin-script labels only
    English,
    /// Bilingual labels with Arabic script
    EnglishArabic,
}

impl LanguageSet {
    /// Tesseract language string, e.g. `eng+ara`
    pub fn tesseract_code(&self) -> &'static str {
        match self {
            LanguageSet::English => "eng",
            LanguageSet::EnglishArabic => "eng+ara",
        }
    }

    /// Human-readable name used in status messages
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageSet::English => "English only",
            LanguageSet::EnglishArabic => "English + Arabic",
        }
    }
}

/// Expected text layout on the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentationMode {
    /// One uniform block of text (single-column facts panel)
    UniformBlock,
    /// Scattered text in no particular order (multi-column tables)
    SparseText,
}

impl SegmentationMode {
    pub fn page_seg_mode(&self) -> PageSegMode {
        match self {
            SegmentationMode::UniformBlock => PageSegMode::SingleBlock,
            SegmentationMode::SparseText => PageSegMode::SparseText,
        }
    }
}

/// One language/segmentation pairing tried by the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecognitionConfig {
    pub languages: LanguageSet,
    pub segmentation: SegmentationMode,
}

impl RecognitionConfig {
    pub const fn new(languages: LanguageSet, segmentation: SegmentationMode) -> Self {
        Self {
            languages,
            segmentation,
        }
    }

    /// Stable label used for metrics and logs, e.g. `eng+ara/psm11`
    pub fn label(&self) -> &'static str {
        match (self.languages, self.segmentation) {
            (LanguageSet::English, SegmentationMode::UniformBlock) => "eng/psm6",
            (LanguageSet::English, SegmentationMode::SparseText) => "eng/psm11",
            (LanguageSet::EnglishArabic, SegmentationMode::UniformBlock) => "eng+ara/psm6",
            (LanguageSet::EnglishArabic, SegmentationMode::SparseText) => "eng+ara/psm11",
        }
    }
}

impl std::fmt::Display for RecognitionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (PSM {})",
            self.languages.display_name(),
            self.segmentation.page_seg_mode().number()
        )
    }
}

/// Tesseract model type for different accuracy/speed trade-offs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// Fast model (tessdata_fast) - faster processing, lower accuracy
    #[default]
    Fast,
    /// Best model (tessdata_best) - slower processing, higher accuracy
    Best,
}

impl ModelType {
    /// Get the tessdata directory name for this model type
    pub fn tessdata_dir(&self) -> &'static str {
        match self {
            ModelType::Fast => "tessdata_fast",
            ModelType::Best => "tessdata_best",
        }
    }
}

impl std::str::FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(ModelType::Fast),
            "best" => Ok(ModelType::Best),
            other => Err(format!("unknown model type '{}'", other)),
        }
    }
}

/// Configuration structure for OCR processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Tesseract model type (Fast vs Best accuracy)
    pub model_type: ModelType,
    /// Explicit tessdata directory; searched for when `None`
    pub tessdata_path: Option<String>,
    /// Resolution hint passed to the engine for every attempt
    pub dpi_hint: u32,
    /// Upper bound for a single recognition call in seconds
    pub operation_timeout_secs: u64,
    /// Character whitelist to restrict OCR output
    pub character_whitelist: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_type: ModelType::default(),
            tessdata_path: None,
            dpi_hint: DEFAULT_DPI_HINT,
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
            character_whitelist: None,
        }
    }
}

impl OcrConfig {
    /// Validate OCR configuration parameters
    pub fn validate(&self) -> crate::errors::AppResult<()> {
        if !(70..=1200).contains(&self.dpi_hint) {
            return Err(crate::errors::AppError::Config(format!(
                "dpi_hint ({}) must be between 70 and 1200",
                self.dpi_hint
            )));
        }
        if self.operation_timeout_secs == 0 {
            return Err(crate::errors::AppError::Config(
                "operation_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if let Some(path) = &self.tessdata_path {
            if path.trim().is_empty() {
                return Err(crate::errors::AppError::Config(
                    "tessdata_path cannot be empty if provided".to_string(),
                ));
            }
        }
        if let Some(whitelist) = &self.character_whitelist {
            if whitelist.is_empty() {
                return Err(crate::errors::AppError::Config(
                    "character_whitelist cannot be empty if provided".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(unused_assignments)]
    fn test_ocr_config_validation() {
        let mut config = OcrConfig::default();

        // Valid config should pass
        assert!(config.validate().is_ok());

        config.dpi_hint = 0;
        assert!(config.validate().is_err());
        config.dpi_hint = 300;

        config.operation_timeout_secs = 0;
        assert!(config.validate().is_err());
        config.operation_timeout_secs = 30;

        config.tessdata_path = Some("  ".to_string());
        assert!(config.validate().is_err());
        config.tessdata_path = None;

        config.character_whitelist = Some(String::new());
        assert!(config.validate().is_err());
        config.character_whitelist = None;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_page_seg_mode_strings() {
        assert_eq!(PageSegMode::SingleBlock.as_str(), "6");
        assert_eq!(PageSegMode::SparseText.as_str(), "11");
        assert_eq!(PageSegMode::SparseText.number(), 11);
    }

    #[test]
    fn test_language_set_codes() {
        assert_eq!(LanguageSet::English.tesseract_code(), "eng");
        assert_eq!(LanguageSet::EnglishArabic.tesseract_code(), "eng+ara");
    }

    #[test]
    fn test_recognition_config_display_and_label() {
        let config = RecognitionConfig::new(LanguageSet::EnglishArabic, SegmentationMode::SparseText);
        assert_eq!(config.to_string(), "English + Arabic (PSM 11)");
        assert_eq!(config.label(), "eng+ara/psm11");
    }

    #[test]
    fn test_model_type_enum_values() {
        assert_eq!(ModelType::Fast.tessdata_dir(), "tessdata_fast");
        assert_eq!(ModelType::Best.tessdata_dir(), "tessdata_best");
        assert_eq!("BEST".parse::<ModelType>(), Ok(ModelType::Best));
        assert_eq!(ModelType::default(), ModelType::Fast);
    }
}
