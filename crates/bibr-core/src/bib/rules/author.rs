//! Author name extraction.

use super::patterns::AUTHOR_PATTERN;
use super::{ExtractionMatch, FieldExtractor};

/// Author field extractor.
///
/// Matches an author cue ("by", "written by", "author") followed by a
/// capitalized name run. The capture is greedy over letters, spaces and
/// commas, so trailing separators are trimmed off the value.
pub struct AuthorExtractor;

impl AuthorExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AuthorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AuthorExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in AUTHOR_PATTERN.captures_iter(text) {
            let raw = match caps.get(1) {
                Some(m) => m,
                None => continue,
            };

            let name = clean_author(raw.as_str());
            if name.is_empty() {
                continue;
            }

            let full_match = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            results.push(
                ExtractionMatch::new(name, 0.9, full_match.as_str())
                    .with_span(full_match.start(), full_match.end()),
            );
        }

        results
    }
}

/// Strip whitespace and trailing comma separators from a captured name.
fn clean_author(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}

/// Extract the first author name from text.
pub fn extract_author(text: &str) -> Option<String> {
    AuthorExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_author_by_cue() {
        let author = extract_author("A Study of Systems by John Smith, 2021.");
        assert_eq!(author, Some("John Smith".to_string()));
    }

    #[test]
    fn test_extract_author_written_by() {
        let author = extract_author("The pamphlet was written by Mary Shelley in London.");
        assert_eq!(author, Some("Mary Shelley in London".to_string()));
    }

    #[test]
    fn test_extract_author_author_cue() {
        let author = extract_author("Author Jane Austen revised the draft.");
        assert_eq!(author, Some("Jane Austen revised the draft".to_string()));
    }

    #[test]
    fn test_trailing_comma_trimmed() {
        let extractor = AuthorExtractor::new();
        let m = extractor.extract("Published by Ada Lovelace, ").unwrap();
        assert_eq!(m.value, "Ada Lovelace");
        assert_eq!(m.confidence, 0.9);
    }

    #[test]
    fn test_case_insensitive_cue() {
        let author = extract_author("Report BY Grace Hopper.");
        assert_eq!(author, Some("Grace Hopper".to_string()));
    }

    #[test]
    fn test_no_cue_no_match() {
        assert_eq!(extract_author("John Smith wrote this."), None);
    }

    #[test]
    fn test_span_recorded() {
        let extractor = AuthorExtractor::new();
        let text = "Notes by Carl Sagan";
        let m = extractor.extract(text).unwrap();
        let (start, end) = m.span.unwrap();
        assert_eq!(&text[start..end], m.source);
    }
}
