//! # Observability Configuration
//!
//! Environment-specific settings for logging and metrics.

use std::env;

use crate::errors::{AppError, AppResult};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output
    Pretty,
    /// One JSON object per event
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Observability configuration for different environments
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Environment name (development, staging, production)
    pub environment: String,
    /// Log level for this crate's targets
    pub log_level: String,
    /// Explicit log format; derived from the environment when `None`
    pub log_format: Option<LogFormat>,
    /// Whether to install the Prometheus recorder
    pub enable_metrics: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_format: None,
            enable_metrics: true,
        }
    }
}

impl ObservabilityConfig {
    /// Load configuration from environment variables
    ///
    /// - `ENVIRONMENT` (default `development`)
    /// - `LOG_LEVEL` (default `info`)
    /// - `LOG_FORMAT`: `pretty` or `json`; unparseable values are ignored
    /// - `ENABLE_METRICS_EXPORT` (default `true`)
    pub fn from_env() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: env::var("LOG_FORMAT").ok().and_then(|v| v.parse().ok()),
            enable_metrics: env::var("ENABLE_METRICS_EXPORT")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        }
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Pretty output in development, JSON elsewhere, unless set explicitly.
    pub fn effective_log_format(&self) -> LogFormat {
        match self.log_format {
            Some(format) => format,
            None if self.is_development() => LogFormat::Pretty,
            None => LogFormat::Json,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.environment.trim().is_empty() {
            return Err(AppError::Config("environment cannot be empty".to_string()));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(AppError::Config(format!(
                "Invalid log level '{}', expected one of {:?}",
                self.log_level, LOG_LEVELS
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert!(config.is_development());
        assert!(!config.is_production());
        assert_eq!(config.effective_log_format(), LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_defaults_to_json() {
        let config = ObservabilityConfig {
            environment: "production".to_string(),
            ..Default::default()
        };
        assert_eq!(config.effective_log_format(), LogFormat::Json);

        let config = ObservabilityConfig {
            log_format: Some(LogFormat::Pretty),
            ..config
        };
        assert_eq!(config.effective_log_format(), LogFormat::Pretty);
    }

    #[test]
    fn test_invalid_log_level() {
        let config = ObservabilityConfig {
            log_level: "verbose".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
