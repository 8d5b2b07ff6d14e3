//! Common regex patterns for bibliographic extraction.

use lazy_static::lazy_static;

use regex::Regex;

lazy_static! {
    // Author patterns
    pub static ref AUTHOR_PATTERN: Regex = Regex::new(
        r"(?i)(?:by\s+|written\s+by\s+|author\s+)\s*([A-Z][a-zA-Z\s,]+)"
    ).unwrap();

    // Year pattern (first four-digit token wins)
    pub static ref YEAR_PATTERN: Regex = Regex::new(
        r"\b(\d{4})\b"
    ).unwrap();

    // Title pattern (leading capitalized run)
    pub static ref TITLE_PATTERN: Regex = Regex::new(
        r"([A-Z][a-zA-Z\s]+(?:[a-zA-Z])+)"
    ).unwrap();
}
