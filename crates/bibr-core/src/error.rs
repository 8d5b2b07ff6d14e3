//! Error types for the bibr-core library.

use thiserror::Error;

/// Main error type for the bibr library.
#[derive(Error, Debug)]
pub enum BibrError {
    /// Document ingest error.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Named-entity recognition error.
    #[error("NER error: {0}")]
    Ner(#[from] NerError),

    /// Inference error from the inference layer.
    #[error("inference error: {0}")]
    Inference(#[from] bibr_inference::InferenceError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to document ingest.
///
/// The extraction core itself is total and never fails; only the
/// conversion of bytes into text can.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Failed to open/parse the document container.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// Failed to extract text from the document.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The document is encrypted and cannot be processed.
    #[error("document is encrypted")]
    Encrypted,

    /// The file extension maps to no known document kind.
    #[error("unsupported document type: {0}")]
    Unsupported(String),

    /// OCR over a scanned page or image failed.
    #[error("OCR failed: {0}")]
    Ocr(String),
}

/// Errors related to named-entity recognition.
#[derive(Error, Debug)]
pub enum NerError {
    /// Failed to load the token-classification model.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The wordpiece vocabulary file is missing or malformed.
    #[error("invalid vocabulary: {0}")]
    Vocab(String),

    /// The label file is missing or malformed.
    #[error("invalid labels: {0}")]
    Labels(String),

    /// Recognition over a text failed.
    #[error("recognition failed: {0}")]
    Recognition(String),
}

/// Result type for the bibr library.
pub type Result<T> = std::result::Result<T, BibrError>;
