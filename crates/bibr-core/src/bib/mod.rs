//! Bibliographic field extraction module.

mod extractor;
pub mod rules;

pub use extractor::{ExtractionReport, HybridBibliographyExtractor};

use crate::models::record::BibliographicRecord;

/// Trait for bibliographic field extractors.
///
/// Extraction is total: a field the text does not yield stays an empty
/// string, and one field missing never blocks another.
pub trait BibliographyExtractor {
    /// Extract a record from raw text.
    fn extract(&self, text: &str) -> BibliographicRecord;

    /// Extract a record together with processing details.
    fn extract_with_report(&self, text: &str) -> ExtractionReport;
}

/// Extract bibliographic fields from raw text with default settings.
pub fn extract_bibliography_info(text: &str) -> BibliographicRecord {
    HybridBibliographyExtractor::new().extract(text)
}
