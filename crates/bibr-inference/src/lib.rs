//! ONNX inference abstraction layer for bibr.
//!
//! This crate provides a unified interface for running ONNX models across
//! different backends:
//! - `ort` with XNNPACK execution provider for native platforms
//! - `tract` directly for WASM/browser environments
//!
//! The primary consumer is the token-classification model behind
//! named-entity recognition over wordpiece ids.

mod backend;
mod error;
mod tensor;

pub use backend::InferenceBackend;
pub use error::InferenceError;
pub use tensor::{InputTensor, OutputTensor};

#[cfg(feature = "native")]
pub use backend::ort::OrtBackend;

#[cfg(feature = "wasm")]
pub use backend::tract::TractBackend;

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
