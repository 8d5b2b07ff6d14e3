//! Text normalization and naive summarization utilities.

/// Normalize raw extracted text for pattern matching.
///
/// Strips leading/trailing whitespace, replaces newlines with spaces and
/// collapses double spaces once. The collapse is a single pass: a run of
/// three spaces comes out as two. Idempotent on already-normalized text.
pub fn normalize(text: &str) -> String {
    text.trim().replace('\n', " ").replace("  ", " ")
}

/// Split text into `". "`-delimited segments.
///
/// The delimiter is the two-character sequence, so abbreviations like
/// "e.g." inside a segment survive while sentence boundaries split.
pub fn split_segments(text: &str) -> Vec<&str> {
    text.split(". ").collect()
}

/// Naive extractive summary: the first two segments rejoined.
pub fn summarize(text: &str) -> String {
    summarize_with(text, 2)
}

/// Extractive summary keeping the first `segments` segments.
pub fn summarize_with(text: &str, segments: usize) -> String {
    split_segments(text)
        .into_iter()
        .take(segments)
        .collect::<Vec<_>>()
        .join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_strips_and_joins() {
        assert_eq!(normalize("  A line\nand another  "), "A line and another");
    }

    #[test]
    fn test_normalize_collapses_double_space_once() {
        assert_eq!(normalize("a  b"), "a b");
        // Single pass: three spaces become two.
        assert_eq!(normalize("a   b"), "a  b");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_normalize_idempotent_on_normalized() {
        let once = normalize("First line\nsecond  line");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_split_segments() {
        let segs = split_segments("One. Two. Three");
        assert_eq!(segs, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_summarize_two_segments() {
        assert_eq!(summarize("One. Two. Three. Four"), "One. Two");
    }

    #[test]
    fn test_summarize_short_input() {
        assert_eq!(summarize("Only one sentence"), "Only one sentence");
        assert_eq!(summarize(""), "");
    }

    #[test]
    fn test_summarize_with_custom_count() {
        assert_eq!(summarize_with("One. Two. Three. Four", 3), "One. Two. Three");
        assert_eq!(summarize_with("One. Two", 0), "");
    }
}
