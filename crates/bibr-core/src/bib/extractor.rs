//! Hybrid bibliography extractor combining rule-based and NER extraction.

use std::cell::OnceCell;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::models::record::BibliographicRecord;
use crate::ner::{EntityLabel, EntityRecognizer, LexicalRecognizer, NamedEntity};
use crate::text::{normalize, split_segments};

use super::rules::{extract_author, extract_title, extract_year};
use super::BibliographyExtractor;

/// Result of a single extraction run.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// Extracted record.
    pub record: BibliographicRecord,
    /// Text after normalization, as seen by the extractors.
    pub normalized_text: String,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Hybrid extractor combining regex rules and entity recognition.
///
/// Each field runs its own ordered strategy chain over the normalized
/// text; the first strategy yielding a non-empty value wins. Pattern
/// rules come first, entity fallbacks second, so the recognizer is
/// consulted only for fields the patterns miss.
pub struct HybridBibliographyExtractor {
    /// Entity recognizer used by the fallback strategies.
    recognizer: Arc<dyn EntityRecognizer>,
    /// Whether entity fallbacks run at all.
    use_entity_fallback: bool,
}

impl HybridBibliographyExtractor {
    /// Create an extractor with the lexical recognizer and fallbacks on.
    pub fn new() -> Self {
        Self {
            recognizer: Arc::new(LexicalRecognizer::new()),
            use_entity_fallback: true,
        }
    }

    /// Set the entity-recognition backend.
    pub fn with_recognizer(mut self, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    /// Set whether entity fallbacks run.
    pub fn with_entity_fallback(mut self, enabled: bool) -> Self {
        self.use_entity_fallback = enabled;
        self
    }

    fn recognize_entities(&self, text: &str) -> Vec<NamedEntity> {
        if !self.use_entity_fallback {
            return Vec::new();
        }
        match self.recognizer.recognize(text) {
            Ok(entities) => {
                debug!(
                    "Recognizer '{}' found {} entities",
                    self.recognizer.backend_id(),
                    entities.len()
                );
                entities
            }
            Err(err) => {
                warn!(
                    "Recognizer '{}' failed, continuing without entities: {}",
                    self.recognizer.backend_id(),
                    err
                );
                Vec::new()
            }
        }
    }
}

impl Default for HybridBibliographyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Run strategies in order; the first non-empty value wins.
fn first_non_empty(text: &str, strategies: &[&dyn Fn(&str) -> Option<String>]) -> String {
    for strategy in strategies {
        if let Some(value) = strategy(text) {
            if !value.is_empty() {
                return value;
            }
        }
    }
    String::new()
}

/// Last four characters of an entity text, by char rather than byte.
fn year_suffix(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let start = chars.len().saturating_sub(4);
    chars[start..].iter().collect()
}

impl BibliographyExtractor for HybridBibliographyExtractor {
    fn extract(&self, text: &str) -> BibliographicRecord {
        let normalized = normalize(text);

        info!(
            "Extracting bibliographic fields from {} characters of text",
            normalized.len()
        );

        // Entities are computed at most once, and only if some field
        // actually falls through to its entity strategy.
        let entities: OnceCell<Vec<NamedEntity>> = OnceCell::new();
        let first_entity = |label: EntityLabel| -> Option<NamedEntity> {
            entities
                .get_or_init(|| self.recognize_entities(&normalized))
                .iter()
                .find(|e| e.label == label)
                .cloned()
        };

        let person_fallback = |_t: &str| first_entity(EntityLabel::Person).map(|e| e.text);
        let date_fallback =
            |_t: &str| first_entity(EntityLabel::Date).map(|e| year_suffix(&e.text));
        let segment_fallback = |t: &str| {
            split_segments(t)
                .first()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let author = first_non_empty(
            &normalized,
            &[&|t: &str| extract_author(t), &person_fallback],
        );
        let year = first_non_empty(&normalized, &[&|t: &str| extract_year(t), &date_fallback]);
        let title = first_non_empty(
            &normalized,
            &[&|t: &str| extract_title(t), &segment_fallback],
        );

        let record = BibliographicRecord {
            title,
            author,
            year,
        };

        debug!(
            "Extracted record: title={:?} author={:?} year={:?}",
            record.title, record.author, record.year
        );

        record
    }

    fn extract_with_report(&self, text: &str) -> ExtractionReport {
        let start = Instant::now();
        let normalized = normalize(text);
        let record = self.extract(text);

        ExtractionReport {
            record,
            normalized_text: normalized,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NerError;
    use pretty_assertions::assert_eq;

    struct FixedRecognizer {
        entities: Vec<NamedEntity>,
    }

    impl EntityRecognizer for FixedRecognizer {
        fn backend_id(&self) -> &str {
            "fixed"
        }

        fn recognize(&self, _text: &str) -> Result<Vec<NamedEntity>, NerError> {
            Ok(self.entities.clone())
        }
    }

    struct FailingRecognizer;

    impl EntityRecognizer for FailingRecognizer {
        fn backend_id(&self) -> &str {
            "failing"
        }

        fn recognize(&self, _text: &str) -> Result<Vec<NamedEntity>, NerError> {
            Err(NerError::Recognition("backend unavailable".to_string()))
        }
    }

    fn person(text: &str) -> NamedEntity {
        NamedEntity {
            text: text.to_string(),
            label: EntityLabel::Person,
            start: 0,
            end: text.len(),
            confidence: 0.8,
        }
    }

    fn date(text: &str) -> NamedEntity {
        NamedEntity {
            text: text.to_string(),
            label: EntityLabel::Date,
            start: 0,
            end: text.len(),
            confidence: 0.8,
        }
    }

    #[test]
    fn test_extract_all_fields() {
        let record = HybridBibliographyExtractor::new()
            .extract("A Study of Systems by John Smith, 2021.");
        assert_eq!(record.author, "John Smith");
        assert_eq!(record.year, "2021");
        assert_eq!(record.title, "A Study of Systems by John Smith");
    }

    #[test]
    fn test_empty_text_yields_empty_record() {
        let record = HybridBibliographyExtractor::new().extract("");
        assert!(record.is_empty());
    }

    #[test]
    fn test_fields_fill_independently() {
        let extractor =
            HybridBibliographyExtractor::new().with_entity_fallback(false);
        let record = extractor.extract("an untitled note from 1999");
        assert_eq!(record.year, "1999");
        assert_eq!(record.author, "");
    }

    #[test]
    fn test_pattern_wins_over_entity() {
        let recognizer = Arc::new(FixedRecognizer {
            entities: vec![person("Other Person"), date("March 1950")],
        });
        let record = HybridBibliographyExtractor::new()
            .with_recognizer(recognizer)
            .extract("Essays by Jane Doe, 2020.");
        assert_eq!(record.author, "Jane Doe");
        assert_eq!(record.year, "2020");
    }

    #[test]
    fn test_person_entity_fallback() {
        let recognizer = Arc::new(FixedRecognizer {
            entities: vec![person("Jane Goodall")],
        });
        let record = HybridBibliographyExtractor::new()
            .with_recognizer(recognizer)
            .extract("a field journal from the archive");
        assert_eq!(record.author, "Jane Goodall");
    }

    #[test]
    fn test_date_entity_year_suffix() {
        let recognizer = Arc::new(FixedRecognizer {
            entities: vec![date("March 1987")],
        });
        let record = HybridBibliographyExtractor::new()
            .with_recognizer(recognizer)
            .extract("printed sometime in march");
        assert_eq!(record.year, "1987");
    }

    #[test]
    fn test_title_segment_fallback() {
        let extractor =
            HybridBibliographyExtractor::new().with_entity_fallback(false);
        let record = extractor.extract("some field notes. taken in spring.");
        assert_eq!(record.title, "some field notes");
    }

    #[test]
    fn test_recognizer_failure_is_not_fatal() {
        let record = HybridBibliographyExtractor::new()
            .with_recognizer(Arc::new(FailingRecognizer))
            .extract("an anonymous pamphlet");
        assert!(record.author.is_empty());
        assert_eq!(record.title, "an anonymous pamphlet");
    }

    #[test]
    fn test_fallback_disabled_skips_recognizer() {
        let recognizer = Arc::new(FixedRecognizer {
            entities: vec![person("Jane Goodall")],
        });
        let record = HybridBibliographyExtractor::new()
            .with_recognizer(recognizer)
            .with_entity_fallback(false)
            .extract("a field journal from the archive");
        assert_eq!(record.author, "");
    }

    #[test]
    fn test_extract_with_report_normalizes() {
        let report = HybridBibliographyExtractor::new()
            .with_entity_fallback(false)
            .extract_with_report("  A Winter\nAlmanac  ");
        assert_eq!(report.normalized_text, "A Winter Almanac");
        assert_eq!(report.record.title, "A Winter Almanac");
    }

    #[test]
    fn test_free_function_defaults() {
        let record =
            super::super::extract_bibliography_info("Letters by Ada Lovelace, 1843.");
        assert_eq!(record.author, "Ada Lovelace");
        assert_eq!(record.year, "1843");
    }
}
