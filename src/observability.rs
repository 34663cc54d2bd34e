//! Observability module for tracing, logging and metrics setup.
//!
//! This module provides:
//! - Structured logging with configurable levels and output format
//! - Metrics collection through a Prometheus recorder
//! - Span and metric helpers used by the preprocessing and OCR code

use std::time::Duration;

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::prelude::*;

use crate::observability_config::{LogFormat, ObservabilityConfig};
use crate::preprocessing::PreprocessMode;

/// Initialize logging and, when enabled, metrics from the environment.
///
/// Returns the Prometheus handle so callers can render the collected metrics.
pub fn init_observability() -> Result<Option<PrometheusHandle>> {
    init_observability_with_config(&ObservabilityConfig::from_env())
}

/// Initialize logging and metrics with a custom configuration
pub fn init_observability_with_config(
    config: &ObservabilityConfig,
) -> Result<Option<PrometheusHandle>> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid observability configuration: {}", e))?;

    init_tracing_with_config(config)?;

    let handle = if config.enable_metrics {
        Some(init_metrics()?)
    } else {
        None
    };

    tracing::info!(
        environment = %config.environment,
        metrics_enabled = config.enable_metrics,
        "Observability stack initialized successfully"
    );
    Ok(handle)
}

/// Initialize structured logging with tracing and configuration
pub fn init_tracing_with_config(config: &ObservabilityConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("nutrition_label_ocr={}", config.log_level).parse()?)
        .add_directive(format!("ocr_preprocessing={}", config.log_level).parse()?);

    match config.effective_log_format() {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?,
    }

    tracing::info!(
        environment = %config.environment,
        log_level = %config.log_level,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Install the Prometheus recorder as the global metrics recorder
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    tracing::info!("Metrics collection initialized");
    Ok(handle)
}

/// Create a span for OCR operations
pub fn ocr_span(operation: &str) -> tracing::Span {
    tracing::info_span!("ocr_operation", operation = operation, component = "ocr")
}

/// Create a span for a whole label scan
pub fn scan_span(width: u32, height: u32) -> tracing::Span {
    tracing::info_span!("label_scan", width = width, height = height, component = "scanner")
}

/// Record binarization timing
pub fn record_preprocessing_metrics(mode: PreprocessMode, duration: Duration) {
    metrics::histogram!("image_preprocessing_duration_seconds", "mode" => mode.as_str())
        .record(duration.as_secs_f64());
}

/// Record one recognition attempt; `result` is `success`, `miss` or `error`
pub fn record_ocr_attempt_metrics(config_label: &'static str, result: &'static str, duration: Duration) {
    metrics::counter!("ocr_attempts_total", "config" => config_label, "result" => result).increment(1);
    metrics::histogram!("ocr_attempt_duration_seconds", "config" => config_label)
        .record(duration.as_secs_f64());
}

/// Record a finished cascade; `result` is `success`, `incomplete` or `error`
pub fn record_cascade_metrics(result: &'static str, attempts: usize, duration: Duration) {
    metrics::counter!("ocr_cascade_total", "result" => result).increment(1);
    metrics::histogram!("ocr_cascade_attempts").record(attempts as f64);
    metrics::histogram!("ocr_cascade_duration_seconds").record(duration.as_secs_f64());
}

/// Record a full scan (preparation plus cascade)
pub fn record_scan_metrics(success: bool, duration: Duration) {
    metrics::counter!("label_scans_total", "result" => if success { "success" } else { "failure" })
        .increment(1);
    metrics::histogram!("label_scan_duration_seconds").record(duration.as_secs_f64());
}
