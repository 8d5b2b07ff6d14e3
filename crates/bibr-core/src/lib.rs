//! Core library for bibliographic metadata extraction.
//!
//! This crate provides:
//! - Text normalization and naive extractive summarization
//! - Pattern-based field extraction (title, author, publication year)
//! - Named-entity fallback for fields the patterns miss
//! - Document ingest (plain text, PDF, DOCX, scanned images)

pub mod error;
pub mod models;
pub mod text;
pub mod bib;
pub mod ner;
pub mod document;

pub use error::{BibrError, Result};
pub use models::record::BibliographicRecord;
pub use models::config::{BibrConfig, DocumentConfig, ExtractionConfig, ModelConfig, NerConfig};
pub use text::{normalize, split_segments, summarize, summarize_with};
pub use bib::{
    extract_bibliography_info, BibliographyExtractor, ExtractionReport,
    HybridBibliographyExtractor,
};
pub use ner::{EntityLabel, EntityRecognizer, LexicalRecognizer, NamedEntity, TokenClassifier};
pub use document::{DocumentKind, DocumentReader};

#[cfg(feature = "native")]
pub use document::OcrEngine;

/// Re-export inference types.
pub use bibr_inference::{InferenceBackend, InputTensor, OutputTensor};

#[cfg(feature = "native")]
pub use bibr_inference::OrtBackend;

#[cfg(feature = "wasm")]
pub use bibr_inference::TractBackend;
