//! Publication year extraction.

use super::patterns::YEAR_PATTERN;
use super::{ExtractionMatch, FieldExtractor};

/// Publication year extractor.
///
/// Any standalone four-digit token qualifies; the first one in the
/// text wins. No range check is applied, a catalog number shaped like
/// a year is indistinguishable at this level.
pub struct YearExtractor;

impl YearExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for YearExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for YearExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        YEAR_PATTERN
            .captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(1)?;
                Some(
                    ExtractionMatch::new(m.as_str().to_string(), 0.9, m.as_str())
                        .with_span(m.start(), m.end()),
                )
            })
            .collect()
    }
}

/// Extract the first four-digit year token from text.
pub fn extract_year(text: &str) -> Option<String> {
    YearExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_year_simple() {
        assert_eq!(
            extract_year("First published 1987 in London."),
            Some("1987".to_string())
        );
    }

    #[test]
    fn test_first_year_wins() {
        assert_eq!(
            extract_year("Reprinted 1999 from the 1987 edition."),
            Some("1999".to_string())
        );
    }

    #[test]
    fn test_longer_digit_run_ignored() {
        assert_eq!(extract_year("Catalog item 123456."), None);
    }

    #[test]
    fn test_extract_all_in_order() {
        let years: Vec<String> = YearExtractor::new()
            .extract_all("From 1901 to 1910.")
            .into_iter()
            .map(|m| m.value)
            .collect();
        assert_eq!(years, vec!["1901".to_string(), "1910".to_string()]);
    }

    #[test]
    fn test_no_year() {
        assert_eq!(extract_year("No digits here."), None);
    }
}
