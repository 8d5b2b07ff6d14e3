//! Lexical entity recognizer built from regex patterns and a small
//! stopword lexicon. Works with no model files.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::error::NerError;

use super::{EntityLabel, EntityRecognizer, NamedEntity};

lazy_static! {
    // Person: honorific followed by a capitalized name run.
    static ref TITLED_NAME: Regex = Regex::new(
        r"(?:(?:Dr|Prof|Mr|Mrs|Ms)\.?\s+)([A-Z][a-z]+(?:\s+[A-Z]\.?)?\s+[A-Z][a-z]+)"
    ).unwrap();

    // Person: two capitalized words, optional middle initial.
    static ref CAPITALIZED_NAME: Regex = Regex::new(
        r"\b([A-Z][a-z]{2,}(?:\s+[A-Z]\.?\s+|\s+)[A-Z][a-z]{2,})\b"
    ).unwrap();

    // Date: long form, "March 4, 1987" or "March 1987".
    static ref MONTH_DATE: Regex = Regex::new(
        r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+(?:\d{1,2},?\s+)?\d{4}\b"
    ).unwrap();

    // Date: numeric, "12/03/1987" or "12-03-87".
    static ref NUMERIC_DATE: Regex = Regex::new(
        r"\b\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}\b"
    ).unwrap();

    // Date: bare year in a plausible range.
    static ref YEAR_ONLY: Regex = Regex::new(
        r"\b(?:1[6-9]\d{2}|20\d{2})\b"
    ).unwrap();
}

lazy_static! {
    // First tokens that start capitalized phrases but never names.
    static ref LEADING_STOPWORDS: HashSet<&'static str> = [
        "The", "This", "That", "These", "Those", "Dear", "From", "With",
        "When", "Where", "After", "Before", "About", "Chapter", "Volume",
    ]
    .into_iter()
    .collect();

    // Full phrases that look like names but are not.
    static ref NAME_STOPWORDS: HashSet<&'static str> = [
        "United States",
        "United Kingdom",
        "New York",
        "Great Britain",
        "University Press",
        "Oxford University",
        "Cambridge University",
    ]
    .into_iter()
    .collect();
}

/// Pattern-based recognizer for people and dates.
///
/// High precision on its target shapes, no external models. This is
/// the default backend for the extraction fallback pass.
pub struct LexicalRecognizer;

impl LexicalRecognizer {
    pub fn new() -> Self {
        Self
    }

    fn collect_persons(&self, text: &str, out: &mut Vec<NamedEntity>) {
        for cap in TITLED_NAME.captures_iter(text) {
            if let Some(m) = cap.get(1) {
                let name = m.as_str().trim();
                if is_plausible_name(name) {
                    out.push(NamedEntity {
                        text: name.to_string(),
                        label: EntityLabel::Person,
                        start: m.start(),
                        end: m.end(),
                        confidence: 0.9,
                    });
                }
            }
        }

        for cap in CAPITALIZED_NAME.captures_iter(text) {
            if let Some(m) = cap.get(1) {
                let name = m.as_str().trim();
                if is_plausible_name(name) && !is_stopword_name(name) {
                    out.push(NamedEntity {
                        text: name.to_string(),
                        label: EntityLabel::Person,
                        start: m.start(),
                        end: m.end(),
                        confidence: 0.7,
                    });
                }
            }
        }
    }

    fn collect_dates(&self, text: &str, out: &mut Vec<NamedEntity>) {
        for (pattern, confidence) in [
            (&*MONTH_DATE, 0.9f32),
            (&*NUMERIC_DATE, 0.8),
            (&*YEAR_ONLY, 0.6),
        ] {
            for m in pattern.find_iter(text) {
                out.push(NamedEntity {
                    text: m.as_str().to_string(),
                    label: EntityLabel::Date,
                    start: m.start(),
                    end: m.end(),
                    confidence,
                });
            }
        }
    }
}

impl Default for LexicalRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRecognizer for LexicalRecognizer {
    fn backend_id(&self) -> &str {
        "lexical"
    }

    fn recognize(&self, text: &str) -> Result<Vec<NamedEntity>, NerError> {
        let mut candidates = Vec::new();
        self.collect_persons(text, &mut candidates);
        self.collect_dates(text, &mut candidates);

        // Longer and earlier spans win within a label; "March 4, 1987"
        // suppresses the bare "1987" inside it.
        candidates.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then((b.end - b.start).cmp(&(a.end - a.start)))
        });

        let mut entities: Vec<NamedEntity> = Vec::new();
        for candidate in candidates {
            let overlaps = entities.iter().any(|kept| {
                kept.label == candidate.label
                    && candidate.start < kept.end
                    && kept.start < candidate.end
            });
            if !overlaps {
                entities.push(candidate);
            }
        }

        entities.sort_by_key(|e| e.start);

        debug!("Lexical recognizer found {} entities", entities.len());

        Ok(entities)
    }
}

fn is_plausible_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.len() < 2 || parts.len() > 4 {
        return false;
    }
    if LEADING_STOPWORDS.contains(parts[0]) {
        return false;
    }
    parts.iter().all(|p| {
        let first = p.chars().next().unwrap_or('a');
        first.is_uppercase() && p.len() >= 2
    })
}

fn is_stopword_name(name: &str) -> bool {
    NAME_STOPWORDS.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(text: &str, label: EntityLabel) -> Vec<String> {
        LexicalRecognizer::new()
            .recognize(text)
            .unwrap()
            .into_iter()
            .filter(|e| e.label == label)
            .map(|e| e.text)
            .collect()
    }

    #[test]
    fn test_titled_person() {
        let persons = labels("A foreword by Dr. Jane Goodall opens the book.", EntityLabel::Person);
        assert!(persons.contains(&"Jane Goodall".to_string()));
    }

    #[test]
    fn test_capitalized_person() {
        let persons = labels("Written with care by John Smith in Boston.", EntityLabel::Person);
        assert!(persons.contains(&"John Smith".to_string()));
    }

    #[test]
    fn test_stopword_phrase_rejected() {
        let persons = labels("Printed in the United States of America.", EntityLabel::Person);
        assert!(!persons.contains(&"United States".to_string()));
    }

    #[test]
    fn test_month_date_suppresses_inner_year() {
        let dates = labels("First published March 4, 1987 in London.", EntityLabel::Date);
        assert_eq!(dates, vec!["March 4, 1987".to_string()]);
    }

    #[test]
    fn test_bare_year_recognized() {
        let dates = labels("Copyright 2021 by the authors.", EntityLabel::Date);
        assert_eq!(dates, vec!["2021".to_string()]);
    }

    #[test]
    fn test_document_order() {
        let entities = LexicalRecognizer::new()
            .recognize("Alice Walker met Betty Cooper in 1975.")
            .unwrap();
        let starts: Vec<usize> = entities.iter().map(|e| e.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
    }

    #[test]
    fn test_empty_text() {
        let entities = LexicalRecognizer::new().recognize("").unwrap();
        assert!(entities.is_empty());
    }
}
