//! Bibliographic record model.

use serde::{Deserialize, Serialize};

/// Metadata extracted from a single bibliographic entry.
///
/// All fields default to empty strings and are filled independently;
/// a miss on one field never blocks another. The record is a transient
/// value object with no identity beyond its field values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibliographicRecord {
    /// Work title.
    pub title: String,

    /// Author name.
    pub author: String,

    /// Publication year as a four-digit token.
    pub year: String,
}

impl BibliographicRecord {
    /// Check whether no field was filled.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.author.is_empty() && self.year.is_empty()
    }

    /// Render the record as a human-readable report block.
    ///
    /// Output shape is stable and consumed downstream as-is:
    /// `"Title: {title}\n\nAuthor: {author}\n\nYear: {year}"`.
    pub fn format_report(&self) -> String {
        format!(
            "Title: {}\n\nAuthor: {}\n\nYear: {}",
            self.title, self.author, self.year
        )
    }
}
