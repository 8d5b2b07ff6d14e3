//! Title extraction.

use super::patterns::TITLE_PATTERN;
use super::{ExtractionMatch, FieldExtractor};

/// Title field extractor.
///
/// Takes the first capitalized letter run as the title candidate.
/// On normalized text this is usually the leading phrase of the entry,
/// which is where bibliographic titles sit.
pub struct TitleExtractor;

impl TitleExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TitleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TitleExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        TITLE_PATTERN
            .find_iter(text)
            .filter_map(|m| {
                let title = m.as_str().trim().to_string();
                if title.is_empty() {
                    return None;
                }
                Some(ExtractionMatch::new(title, 0.9, m.as_str()).with_span(m.start(), m.end()))
            })
            .collect()
    }
}

/// Extract the first title-shaped phrase from text.
pub fn extract_title(text: &str) -> Option<String> {
    TitleExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_title_leading_phrase() {
        let title = extract_title("A Study of Systems by John Smith, 2021.");
        assert_eq!(title, Some("A Study of Systems by John Smith".to_string()));
    }

    #[test]
    fn test_title_stops_at_digits() {
        let title = extract_title("Modern Compilers 1986 edition.");
        assert_eq!(title, Some("Modern Compilers".to_string()));
    }

    #[test]
    fn test_no_capitalized_run() {
        assert_eq!(extract_title("all lowercase text here"), None);
    }

    #[test]
    fn test_trailing_space_trimmed() {
        let title = extract_title("Deep Work ").unwrap();
        assert_eq!(title, "Deep Work");
    }
}
