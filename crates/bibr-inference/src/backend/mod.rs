//! Inference backend implementations.

#[cfg(feature = "native")]
pub mod ort;

#[cfg(feature = "wasm")]
pub mod tract;

use crate::{InputTensor, OutputTensor, Result};

/// Abstraction over ONNX runtime implementations.
///
/// The same classifier code runs on native platforms (ort) and in the
/// browser (tract) through this trait.
pub trait InferenceBackend: Send + Sync {
    /// Run one forward pass over named input tensors, returning named
    /// outputs.
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>>;

    /// Input names the model declares.
    ///
    /// Callers feed only what the model asks for. Token classifiers
    /// differ here: some expect `token_type_ids`, some only
    /// `input_ids` and `attention_mask`.
    fn input_names(&self) -> &[String];

    /// Output names the model declares.
    fn output_names(&self) -> &[String];
}
