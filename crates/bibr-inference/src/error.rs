//! Error types for the inference layer.

use thiserror::Error;

/// Errors raised while loading or running an ONNX model.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The model bytes could not be parsed.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Backend session setup failed.
    #[error("failed to create session: {0}")]
    SessionCreate(String),

    /// An input tensor had the wrong shape or type.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The forward pass itself failed.
    #[error("inference failed: {0}")]
    InferenceFailed(String),

    /// An output tensor could not be converted back.
    #[error("failed to extract output: {0}")]
    OutputExtraction(String),

    /// Reading model files from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
