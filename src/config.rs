//! # Unified Application Configuration
//!
//! This module consolidates the scanner settings into a single configuration
//! object. It supports loading from environment variables (or any key lookup,
//! which keeps tests away from the process environment) and validation.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::observability_config::ObservabilityConfig;
use crate::ocr_config::OcrConfig;
use crate::preprocessing::{
    FrameOptions, PreprocessMode, DEFAULT_CROP_PERCENTAGE, DEFAULT_MAX_DIMENSION,
};

/// Frame preparation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Percentage of each dimension kept by the centered crop (50-100)
    pub crop_percentage: u32,
    /// Bound on the longest side of the cropped frame
    pub max_dimension: u32,
    /// Binarization applied before OCR
    pub preprocess_mode: PreprocessMode,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            crop_percentage: DEFAULT_CROP_PERCENTAGE,
            max_dimension: DEFAULT_MAX_DIMENSION,
            preprocess_mode: PreprocessMode::default(),
        }
    }
}

impl ScanConfig {
    /// Validate scan configuration
    pub fn validate(&self) -> AppResult<()> {
        if !(50..=100).contains(&self.crop_percentage) {
            return Err(AppError::Config(format!(
                "crop_percentage ({}) must be between 50 and 100",
                self.crop_percentage
            )));
        }
        if self.max_dimension == 0 {
            return Err(AppError::Config(
                "max_dimension must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn frame_options(&self) -> FrameOptions {
        FrameOptions {
            crop_percentage: self.crop_percentage,
            max_dimension: self.max_dimension,
            mode: self.preprocess_mode,
        }
    }
}

/// Unified application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// OCR engine configuration
    pub ocr: OcrConfig,
    /// Frame preparation configuration
    pub scan: ScanConfig,
    /// Observability configuration
    pub observability: ObservabilityConfig,
}

/// Parses `key` from `lookup`, falling back to `default` when unset.
fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{} has an invalid value '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::from_vars(|key| env::var(key).ok())?;
        config.observability = ObservabilityConfig::from_env();
        Ok(config)
    }

    /// Load the OCR and scan sections through `lookup`.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `OCR_MODEL_TYPE` | `fast` |
    /// | `OCR_TESSDATA_PATH` | searched |
    /// | `OCR_DPI_HINT` | `300` |
    /// | `OCR_TIMEOUT_SECS` | `30` |
    /// | `OCR_CHARACTER_WHITELIST` | none |
    /// | `SCAN_CROP_PERCENTAGE` | `70` |
    /// | `SCAN_MAX_DIMENSION` | `1200` |
    /// | `SCAN_PREPROCESS_MODE` | `grayscale-threshold` |
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let defaults = Self::default();

        let ocr = OcrConfig {
            model_type: parse_var(&lookup, "OCR_MODEL_TYPE", defaults.ocr.model_type)?,
            tessdata_path: lookup("OCR_TESSDATA_PATH"),
            dpi_hint: parse_var(&lookup, "OCR_DPI_HINT", defaults.ocr.dpi_hint)?,
            operation_timeout_secs: parse_var(
                &lookup,
                "OCR_TIMEOUT_SECS",
                defaults.ocr.operation_timeout_secs,
            )?,
            character_whitelist: lookup("OCR_CHARACTER_WHITELIST"),
        };

        let scan = ScanConfig {
            crop_percentage: parse_var(&lookup, "SCAN_CROP_PERCENTAGE", defaults.scan.crop_percentage)?,
            max_dimension: parse_var(&lookup, "SCAN_MAX_DIMENSION", defaults.scan.max_dimension)?,
            preprocess_mode: parse_var(
                &lookup,
                "SCAN_PREPROCESS_MODE",
                defaults.scan.preprocess_mode,
            )?,
        };

        Ok(Self {
            ocr,
            scan,
            observability: defaults.observability,
        })
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> AppResult<()> {
        self.ocr.validate()?;
        self.scan.validate()?;
        self.observability.validate()?;
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: model={}, dpi_hint={}, timeout={}s, crop={}%, max_dimension={}, mode={}, environment={}",
            self.ocr.model_type.tessdata_dir(),
            self.ocr.dpi_hint,
            self.ocr.operation_timeout_secs,
            self.scan.crop_percentage,
            self.scan.max_dimension,
            self.scan.preprocess_mode,
            self.observability.environment
        )
    }
}
