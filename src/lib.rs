//! # Nutrition Label OCR
//!
//! Turns a camera frame of a printed nutrition label into structured nutrition
//! facts: the frame is cropped, downscaled and binarized, then run through a
//! cascade of OCR configurations until the recognized text parses.

pub mod cascade;
pub mod config;
pub mod errors;
pub mod nutrition;
pub mod observability;
pub mod observability_config;
pub mod ocr_config;
pub mod ocr_errors;
pub mod preprocessing;
pub mod recognizer;
pub mod scanner;
pub mod tesseract;

// Re-export types for easier access
pub use cascade::{CascadeController, CascadeOutcome, CascadeStep, OcrAttemptResult};
pub use nutrition::{parse, ParsedNutrition, ServingUnit};
pub use preprocessing::{FrameOptions, PixelBuffer, PreprocessMode};
pub use recognizer::{CascadeObserver, RecognitionSession, TextRecognizer};
pub use scanner::LabelScanner;
