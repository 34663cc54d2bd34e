//! # Tesseract Recognition Backend
//!
//! [`TextRecognizer`] implementation on top of `leptess`. Each session owns its
//! own engine loaded for one language set; the engine is dropped on dispose.
//! Blocking Tesseract calls run on the blocking thread pool under the configured
//! operation timeout.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use leptess::LepTess;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::ocr_config::{LanguageSet, ModelType, OcrConfig, SegmentationMode};
use crate::ocr_errors::OcrError;
use crate::preprocessing::PixelBuffer;
use crate::recognizer::{RecognitionSession, TextRecognizer};

/// Creates Tesseract sessions from an [`OcrConfig`].
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    tessdata_path: Option<String>,
    model_type: ModelType,
    character_whitelist: Option<String>,
    operation_timeout: Duration,
}

impl TesseractRecognizer {
    pub fn new(config: &OcrConfig) -> Self {
        let tessdata_path = config
            .tessdata_path
            .clone()
            .or_else(|| find_tessdata_path(config.model_type));

        Self {
            tessdata_path,
            model_type: config.model_type,
            character_whitelist: config.character_whitelist.clone(),
            operation_timeout: Duration::from_secs(config.operation_timeout_secs),
        }
    }

    pub fn tessdata_path(&self) -> Option<&str> {
        self.tessdata_path.as_deref()
    }
}

/// Looks for the tessdata directory of `model_type` in the usual install
/// locations. `None` lets Tesseract fall back to its compiled-in default.
pub fn find_tessdata_path(model_type: ModelType) -> Option<String> {
    let dir = model_type.tessdata_dir();
    let candidates = [
        format!("/usr/share/tesseract-ocr/5/{dir}"),
        format!("/usr/share/tesseract-ocr/4.00/{dir}"),
        format!("/usr/share/{dir}"),
        format!("/usr/local/share/{dir}"),
    ];

    for path in candidates {
        if Path::new(&path).exists() {
            info!("Using tessdata path: {}", path);
            return Some(path);
        }
    }

    info!(
        "No specific tessdata path found for model type {:?}, using default",
        model_type
    );
    None
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    type Session = TesseractSession;

    async fn create_session(&self, languages: LanguageSet) -> Result<TesseractSession, OcrError> {
        let start_time = Instant::now();
        let tessdata_path = self.tessdata_path.clone();
        let whitelist = self.character_whitelist.clone();

        let engine = tokio::task::spawn_blocking(move || {
            let mut tess = LepTess::new(tessdata_path.as_deref(), languages.tesseract_code())
                .map_err(|e| {
                    OcrError::Initialization(format!(
                        "Failed to initialize Tesseract for '{}': {}",
                        languages.tesseract_code(),
                        e
                    ))
                })?;

            if let Some(whitelist) = &whitelist {
                tess.set_variable(leptess::Variable::TesseditCharWhitelist, whitelist)
                    .map_err(|e| {
                        OcrError::Configuration(format!("Failed to set character whitelist: {}", e))
                    })?;
            }

            Ok::<_, OcrError>(tess)
        })
        .await
        .map_err(|e| OcrError::Initialization(format!("Tesseract init task panicked: {e}")))??;

        debug!(
            languages = languages.tesseract_code(),
            model = self.model_type.tessdata_dir(),
            duration_ms = start_time.elapsed().as_millis() as u64,
            "Tesseract session created"
        );

        Ok(TesseractSession {
            engine: Arc::new(Mutex::new(engine)),
            languages,
            dpi_hint: crate::ocr_config::DEFAULT_DPI_HINT,
            operation_timeout: self.operation_timeout,
        })
    }
}

/// One Tesseract engine loaded for a language set.
pub struct TesseractSession {
    engine: Arc<Mutex<LepTess>>,
    languages: LanguageSet,
    dpi_hint: u32,
    operation_timeout: Duration,
}

impl std::fmt::Debug for TesseractSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TesseractSession")
            .field("languages", &self.languages)
            .field("dpi_hint", &self.dpi_hint)
            .field("operation_timeout", &self.operation_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RecognitionSession for TesseractSession {
    async fn configure(
        &mut self,
        segmentation: SegmentationMode,
        dpi_hint: u32,
    ) -> Result<(), OcrError> {
        let psm = segmentation.page_seg_mode();
        self.engine
            .lock()
            .set_variable(leptess::Variable::TesseditPagesegMode, psm.as_str())
            .map_err(|e| OcrError::Configuration(format!("Failed to set PSM mode: {}", e)))?;
        self.dpi_hint = dpi_hint;
        Ok(())
    }

    // leptess exposes no progress monitor, so only 0 and 100 are reported
    async fn recognize(
        &mut self,
        buffer: &PixelBuffer,
        progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<String, OcrError> {
        progress(0);
        if buffer.is_empty() {
            warn!(
                width = buffer.width(),
                height = buffer.height(),
                "Empty buffer handed to Tesseract, skipping recognition"
            );
            progress(100);
            return Ok(String::new());
        }

        let png_bytes = buffer.to_png_bytes()?;
        let engine = Arc::clone(&self.engine);
        let dpi_hint = i32::try_from(self.dpi_hint).unwrap_or(i32::MAX);

        let task = tokio::task::spawn_blocking(move || {
            let mut tess = engine.lock();
            tess.set_image_from_mem(&png_bytes).map_err(|e| {
                OcrError::Extraction(format!("Failed to load image into Tesseract: {e}"))
            })?;
            // Must follow set_image
            tess.set_source_resolution(dpi_hint);
            tess.get_utf8_text().map_err(|e| {
                OcrError::Extraction(format!("Failed to extract text from image: {e}"))
            })
        });

        let text = match tokio::time::timeout(self.operation_timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => return Err(OcrError::Extraction(format!("OCR task panicked: {e}"))),
            Err(_) => {
                return Err(OcrError::Timeout(format!(
                    "OCR operation timed out after {} seconds",
                    self.operation_timeout.as_secs()
                )))
            }
        };

        progress(100);
        Ok(text)
    }

    async fn dispose(self) -> Result<(), OcrError> {
        debug!(languages = self.languages.tesseract_code(), "Disposing Tesseract session");
        if engine_still_in_use(&self.engine) {
            // A timed-out recognition still holds the engine on the blocking pool
            warn!(
                languages = self.languages.tesseract_code(),
                "Tesseract engine still busy after timeout; it is released when the blocking task ends"
            );
        }
        drop(self.engine);
        Ok(())
    }
}

/// True while a blocking recognition task still shares the engine.
fn engine_still_in_use<T>(engine: &Arc<T>) -> bool {
    Arc::strong_count(engine) > 1
}
