//! Named-entity recognition backends.
//!
//! The field extractor only needs two entity kinds: people (author
//! fallback) and dates (year fallback). Backends are pluggable behind
//! `EntityRecognizer`; the lexical backend works with no model files,
//! the token classifier runs an ONNX model through `bibr-inference`.

mod classifier;
mod lexical;

pub use classifier::TokenClassifier;
pub use lexical::LexicalRecognizer;

use serde::{Deserialize, Serialize};

use crate::error::NerError;

/// Classification of a recognized entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityLabel {
    Person,
    Date,
}

/// A single recognized entity with its location in the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEntity {
    /// Surface text of the entity.
    pub text: String,

    /// Entity kind.
    pub label: EntityLabel,

    /// Byte offset of the entity start in the source text.
    pub start: usize,

    /// Byte offset one past the entity end.
    pub end: usize,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

/// Trait for pluggable entity-recognition backends.
///
/// Implementations return entities in document order. The extractor
/// treats a recognition failure as "no entities"; totality of the
/// extraction pipeline does not depend on the backend.
pub trait EntityRecognizer: Send + Sync {
    /// Human-readable backend identifier (e.g. "lexical", "onnx").
    fn backend_id(&self) -> &str;

    /// Recognize named entities in text, in document order.
    fn recognize(&self, text: &str) -> Result<Vec<NamedEntity>, NerError>;
}
