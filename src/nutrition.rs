//! # Nutrition Label Parsing Module
//!
//! Extracts nutrition facts from OCR text of a printed label.
//!
//! ## Features
//!
//! - Bilingual pattern table: Latin-script labels (`Calories`, `Serving Size`,
//!   `Protein`, ...) and their Arabic-script equivalents
//! - First matching pattern wins per field; later patterns are not tried
//! - Decimal values (`Protein 2.5`)
//! - Serving-size unit normalized to `ml` or `g`
//!
//! Fields without a match stay `None`. A missing field is never reported as
//! zero: absence means "enter it by hand", zero is a reading.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Unit of the serving size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServingUnit {
    Ml,
    G,
}

impl ServingUnit {
    /// Normalizes a captured unit token: anything carrying an `ml` marker
    /// (Latin or Arabic `مل`) is millilitres, everything else grams.
    pub fn from_token(token: &str) -> Self {
        let token = token.to_lowercase();
        if token.contains("ml") || token.contains("مل") {
            ServingUnit::Ml
        } else {
            ServingUnit::G
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServingUnit::Ml => "ml",
            ServingUnit::G => "g",
        }
    }
}

impl std::fmt::Display for ServingUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nutrition facts read from a label. Every field is independently optional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedNutrition {
    pub calories_per_serving: Option<u32>,
    pub servings_per_container: Option<f64>,
    pub serving_size_value: Option<f64>,
    pub serving_size_unit: Option<ServingUnit>,
    /// grams
    pub protein: Option<f64>,
    /// grams
    pub carbs: Option<f64>,
    /// grams
    pub fats: Option<f64>,
}

impl ParsedNutrition {
    /// See [`is_successful`].
    pub fn is_successful(&self) -> bool {
        is_successful(self)
    }

    /// Number of fields that were found.
    pub fn found_field_count(&self) -> usize {
        [
            self.calories_per_serving.is_some(),
            self.servings_per_container.is_some(),
            self.serving_size_value.is_some(),
            self.serving_size_unit.is_some(),
            self.protein.is_some(),
            self.carbs.is_some(),
            self.fats.is_some(),
        ]
        .iter()
        .filter(|found| **found)
        .count()
    }
}

/// Decimal number capture shared by most patterns.
const NUMBER: &str = r"([0-9]+(?:\.[0-9]+)?)";

fn compile(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("Invalid nutrition label regex pattern"))
        .collect()
}

lazy_static! {
    static ref CALORIES_PATTERNS: Vec<Regex> = compile(&[
        r"(?i)Calories\s*([0-9]{1,4})".to_string(),
        r"(?i)Calor[a-z]*\s*([0-9]{1,4})".to_string(),
        r"السعرات(?:\s*الحرارية)?\s*([0-9]{1,4})".to_string(),
    ]);
    static ref SERVINGS_PER_CONTAINER_PATTERNS: Vec<Regex> = compile(&[
        format!(r"(?i)servings?\s*per\s*container\s*[:\-]?\s*{NUMBER}"),
        format!(r"عدد\s*الحصص\s*(?:في\s*العبوة)?\s*[:\-]?\s*{NUMBER}"),
    ]);
    static ref SERVING_SIZE_PATTERNS: Vec<Regex> = compile(&[
        format!(r"(?i)Serving\s*Size\s*[:\-]?\s*{NUMBER}\s*(ml|mL|g|gm|grams)"),
        format!(r"(?i)حجم\s*الحصة\s*[:\-]?\s*{NUMBER}\s*(مل|ml|جم|g)"),
    ]);
    static ref PROTEIN_PATTERNS: Vec<Regex> = compile(&[
        format!(r"(?i)Protein\s*{NUMBER}"),
        format!(r"بروتين\s*{NUMBER}"),
    ]);
    static ref CARBS_PATTERNS: Vec<Regex> = compile(&[
        format!(r"(?i)Carbohydrate[s]?\s*{NUMBER}"),
        format!(r"الكربوهيدرات\s*{NUMBER}"),
    ]);
    static ref FATS_PATTERNS: Vec<Regex> = compile(&[
        format!(r"(?i)Total\s*Fat\s*{NUMBER}"),
        format!(r"الدهون\s*الكلية\s*{NUMBER}"),
    ]);
}

/// Captures of the first pattern that matches anywhere in `text`.
fn first_match<'t>(patterns: &[Regex], text: &'t str) -> Option<Captures<'t>> {
    patterns.iter().enumerate().find_map(|(index, pattern)| {
        let captures = pattern.captures(text)?;
        trace!(pattern_index = index, pattern = %pattern.as_str(), "Nutrition pattern matched");
        Some(captures)
    })
}

fn capture_number<T: std::str::FromStr>(captures: &Captures<'_>, group: usize) -> Option<T> {
    captures.get(group)?.as_str().parse().ok()
}

fn find_number<T: std::str::FromStr>(patterns: &[Regex], text: &str) -> Option<T> {
    first_match(patterns, text).and_then(|captures| capture_number(&captures, 1))
}

/// Parses OCR text of a nutrition label.
///
/// # Examples
///
/// ```
/// use nutrition_label_ocr::nutrition::{parse, ServingUnit};
///
/// let parsed = parse("Calories 120\nServing Size 250 ml\nProtein 8");
/// assert_eq!(parsed.calories_per_serving, Some(120));
/// assert_eq!(parsed.serving_size_value, Some(250.0));
/// assert_eq!(parsed.serving_size_unit, Some(ServingUnit::Ml));
/// assert_eq!(parsed.carbs, None);
/// assert!(parsed.is_successful());
/// ```
pub fn parse(text: &str) -> ParsedNutrition {
    let mut parsed = ParsedNutrition {
        calories_per_serving: find_number(&CALORIES_PATTERNS, text),
        servings_per_container: find_number(&SERVINGS_PER_CONTAINER_PATTERNS, text),
        protein: find_number(&PROTEIN_PATTERNS, text),
        carbs: find_number(&CARBS_PATTERNS, text),
        fats: find_number(&FATS_PATTERNS, text),
        ..Default::default()
    };

    if let Some(captures) = first_match(&SERVING_SIZE_PATTERNS, text) {
        parsed.serving_size_value = capture_number(&captures, 1);
        parsed.serving_size_unit = captures
            .get(2)
            .map(|unit| ServingUnit::from_token(unit.as_str()));
    }

    debug!(
        text_length = text.len(),
        fields_found = parsed.found_field_count(),
        calories = ?parsed.calories_per_serving,
        serving_size = ?parsed.serving_size_value,
        "Parsed nutrition label text"
    );

    parsed
}

/// True when both calories per serving and the serving-size value were found.
///
/// These two are what a consumed-quantity calorie total needs; macros are
/// optional and can be entered by hand.
pub fn is_successful(parsed: &ParsedNutrition) -> bool {
    parsed.calories_per_serving.is_some() && parsed.serving_size_value.is_some()
}
