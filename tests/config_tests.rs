//! # Configuration Tests Module
//!
//! Tests for loading and validating the scanner configuration.

#[cfg(test)]
mod tests {
    use nutrition_label_ocr::config::{AppConfig, ScanConfig};
    use nutrition_label_ocr::errors::AppError;
    use nutrition_label_ocr::observability_config::{LogFormat, ObservabilityConfig};
    use nutrition_label_ocr::ocr_config::{ModelType, OcrConfig};
    use nutrition_label_ocr::preprocessing::{FrameOptions, PreprocessMode};
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    /// Test defaults when no variables are set
    #[test]
    fn test_from_vars_defaults() {
        let config = AppConfig::from_vars(lookup(&[])).expect("defaults load");

        assert_eq!(config.ocr.model_type, ModelType::Fast);
        assert_eq!(config.ocr.dpi_hint, 300);
        assert_eq!(config.ocr.operation_timeout_secs, 30);
        assert_eq!(config.ocr.tessdata_path, None);
        assert_eq!(config.scan, ScanConfig::default());
        assert_eq!(
            config.scan.frame_options(),
            FrameOptions {
                crop_percentage: 70,
                max_dimension: 1200,
                mode: PreprocessMode::GrayscaleThreshold,
            }
        );
        assert!(config.validate().is_ok());
    }

    /// Test every supported variable is read
    #[test]
    fn test_from_vars_overrides() {
        let config = AppConfig::from_vars(lookup(&[
            ("OCR_MODEL_TYPE", "best"),
            ("OCR_TESSDATA_PATH", "/opt/tessdata"),
            ("OCR_DPI_HINT", "600"),
            ("OCR_TIMEOUT_SECS", "45"),
            ("OCR_CHARACTER_WHITELIST", "0123456789"),
            ("SCAN_CROP_PERCENTAGE", "85"),
            ("SCAN_MAX_DIMENSION", "1600"),
            ("SCAN_PREPROCESS_MODE", "adaptive"),
        ]))
        .expect("overrides load");

        assert_eq!(config.ocr.model_type, ModelType::Best);
        assert_eq!(config.ocr.tessdata_path.as_deref(), Some("/opt/tessdata"));
        assert_eq!(config.ocr.dpi_hint, 600);
        assert_eq!(config.ocr.operation_timeout_secs, 45);
        assert_eq!(config.ocr.character_whitelist.as_deref(), Some("0123456789"));
        assert_eq!(config.scan.crop_percentage, 85);
        assert_eq!(config.scan.max_dimension, 1600);
        assert_eq!(config.scan.preprocess_mode, PreprocessMode::AdaptiveThreshold);
        assert!(config.validate().is_ok());
    }

    /// Test unparseable values are configuration errors naming the variable
    #[test]
    fn test_from_vars_rejects_bad_values() {
        let err = AppConfig::from_vars(lookup(&[("OCR_DPI_HINT", "high")]))
            .expect_err("not a number");
        match err {
            AppError::Config(message) => assert!(message.contains("OCR_DPI_HINT")),
            other => panic!("unexpected error: {other}"),
        }

        let err = AppConfig::from_vars(lookup(&[("SCAN_PREPROCESS_MODE", "sepia")]))
            .expect_err("unknown mode");
        assert!(err.to_string().starts_with("[CONFIG]"));
        assert!(err.to_string().contains("sepia"));
    }

    /// Test values that parse but fall outside their ranges fail validation
    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let config = AppConfig::from_vars(lookup(&[("SCAN_CROP_PERCENTAGE", "40")]))
            .expect("parses");
        assert!(config.validate().is_err());

        let config = AppConfig::from_vars(lookup(&[("OCR_TIMEOUT_SECS", "0")])).expect("parses");
        assert!(config.validate().is_err());

        let config = AppConfig::from_vars(lookup(&[("OCR_DPI_HINT", "5000")])).expect("parses");
        assert!(config.validate().is_err());
    }

    /// Test OCR configuration defaults
    #[test]
    fn test_ocr_config_defaults() {
        let config = OcrConfig::default();
        assert_eq!(config.model_type, ModelType::Fast);
        assert_eq!(config.character_whitelist, None);
        assert!(config.validate().is_ok());
    }

    /// Test preprocess mode names
    #[test]
    fn test_preprocess_mode_parsing() {
        assert_eq!("none".parse::<PreprocessMode>(), Ok(PreprocessMode::None));
        assert_eq!(
            "Grayscale-Threshold".parse::<PreprocessMode>(),
            Ok(PreprocessMode::GrayscaleThreshold)
        );
        assert_eq!(
            "adaptive-threshold".parse::<PreprocessMode>(),
            Ok(PreprocessMode::AdaptiveThreshold)
        );
        assert!("blur".parse::<PreprocessMode>().is_err());
    }

    /// Test observability format selection
    #[test]
    fn test_observability_log_format() {
        let config = ObservabilityConfig {
            environment: "staging".to_string(),
            ..Default::default()
        };
        assert_eq!(config.effective_log_format(), LogFormat::Json);
        assert_eq!("PRETTY".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
