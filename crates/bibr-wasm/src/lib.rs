//! WASM bindings for bibliographic metadata extraction.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.

use wasm_bindgen::prelude::*;

use bibr_core::document::{DocumentKind, DocumentReader};
use bibr_core::models::config::DocumentConfig;
use bibr_core::{BibliographyExtractor, HybridBibliographyExtractor};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Extract bibliographic metadata from text.
///
/// Takes document text (from OCR or PDF extraction) and returns the
/// extracted record.
#[wasm_bindgen]
pub fn extract_from_text(text: &str) -> Result<JsValue, JsValue> {
    let extractor = HybridBibliographyExtractor::new();
    let record = extractor.extract(text);

    serde_wasm_bindgen::to_value(&record).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract metadata from document bytes (plain text, PDF or DOCX).
///
/// The extension selects the parser, e.g. "pdf" or "docx". Image
/// formats are rejected because OCR is unavailable in WASM builds.
#[wasm_bindgen]
pub fn extract_from_document(data: &[u8], extension: &str) -> Result<JsValue, JsValue> {
    let kind = DocumentKind::from_extension(&extension.to_ascii_lowercase())
        .ok_or_else(|| JsValue::from_str(&format!("unsupported extension: {}", extension)))?;

    let reader = DocumentReader::new(DocumentConfig::default());
    let text = reader
        .read(data, kind)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    extract_from_text(&text)
}

/// Extract the first author-like name from text.
#[wasm_bindgen]
pub fn extract_author(text: &str) -> Option<String> {
    bibr_core::bib::rules::extract_author(text)
}

/// Extract the first four-digit year token from text.
#[wasm_bindgen]
pub fn extract_year(text: &str) -> Option<String> {
    bibr_core::bib::rules::extract_year(text)
}

/// Extract the first title-like phrase from text.
#[wasm_bindgen]
pub fn extract_title(text: &str) -> Option<String> {
    bibr_core::bib::rules::extract_title(text)
}

/// Normalize raw text the way the extraction pipeline does.
#[wasm_bindgen]
pub fn normalize_text(text: &str) -> String {
    bibr_core::normalize(text)
}

/// Naive extractive summary of the leading segments.
#[wasm_bindgen]
pub fn summarize_text(text: &str, segments: usize) -> String {
    bibr_core::summarize_with(text, segments)
}

/// Metadata extractor class for browser use.
#[wasm_bindgen]
pub struct MetadataExtractor {
    extractor: HybridBibliographyExtractor,
}

#[wasm_bindgen]
impl MetadataExtractor {
    /// Create a new metadata extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            extractor: HybridBibliographyExtractor::new(),
        }
    }

    /// Configure the entity fallback for fields the patterns miss.
    #[wasm_bindgen]
    pub fn set_entity_fallback(&mut self, enabled: bool) {
        self.extractor = HybridBibliographyExtractor::new().with_entity_fallback(enabled);
    }

    /// Extract a record from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        let record = self.extractor.extract(text);
        serde_wasm_bindgen::to_value(&record).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Extract a record together with processing metadata.
    #[wasm_bindgen]
    pub fn extract_with_report(&self, text: &str) -> Result<JsValue, JsValue> {
        let report = self.extractor.extract_with_report(text);

        #[derive(serde::Serialize)]
        struct ReportJs {
            record: bibr_core::BibliographicRecord,
            normalized_text: String,
            processing_time_ms: u64,
        }

        let output = ReportJs {
            record: report.record,
            normalized_text: report.normalized_text,
            processing_time_ms: report.processing_time_ms,
        };

        serde_wasm_bindgen::to_value(&output).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Render a text report for the given input.
    #[wasm_bindgen]
    pub fn format_report(&self, text: &str) -> String {
        self.extractor.extract(text).format_report()
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_extract_author() {
        assert_eq!(
            extract_author("A Study of Systems by John Smith, 2021."),
            Some("John Smith".to_string())
        );
        assert_eq!(extract_author("no cue here"), None);
    }

    #[wasm_bindgen_test]
    fn test_extract_year() {
        assert_eq!(extract_year("published in 1987"), Some("1987".to_string()));
    }

    #[wasm_bindgen_test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  a line\nand more  "), "a line and more");
    }

    #[wasm_bindgen_test]
    fn test_summarize_text() {
        assert_eq!(summarize_text("One. Two. Three", 2), "One. Two");
    }

    #[wasm_bindgen_test]
    fn test_format_report() {
        let extractor = MetadataExtractor::new();
        let report = extractor.format_report("A Study of Systems by John Smith, 2021.");
        assert!(report.contains("Author: John Smith"));
        assert!(report.contains("Year: 2021"));
    }
}
