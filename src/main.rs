use anyhow::Result;
use nutrition_label_ocr::config::AppConfig;
use nutrition_label_ocr::errors::error_logging;
use nutrition_label_ocr::observability;
use nutrition_label_ocr::preprocessing::PixelBuffer;
use nutrition_label_ocr::recognizer::TracingObserver;
use nutrition_label_ocr::scanner::LabelScanner;
use nutrition_label_ocr::tesseract::TesseractRecognizer;
use std::env;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const USAGE: &str = "Usage: nutrition-label-ocr <image>";

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let _metrics_handle = observability::init_observability_with_config(&config.observability)?;
    config.validate().map_err(|e| {
        error_logging::log_config_error(&e, "app_config", "validate_config");
        anyhow::anyhow!("Configuration validation failed: {}", e)
    })?;
    info!("{}", config.summary());

    let image_path = env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!(USAGE))?;
    let frame = PixelBuffer::open(&image_path).inspect_err(|e| {
        error_logging::log_preprocessing_error(e, "load_image", None);
    })?;
    info!(
        path = %image_path,
        width = frame.width(),
        height = frame.height(),
        "Loaded label image"
    );

    let recognizer = TesseractRecognizer::new(&config.ocr);
    let scanner = LabelScanner::from_config(recognizer, &config);

    // Ctrl-C stops the cascade before its next attempt
    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let outcome = scanner.scan(&frame, &TracingObserver, &cancel).await?;
    if !outcome.is_successful() {
        warn!(
            attempt = outcome.attempt,
            "Calories or serving size missing; enter the remaining values by hand"
        );
    }

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
