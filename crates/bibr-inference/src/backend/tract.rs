//! Tract backend for WASM and other platforms without ONNX Runtime.

use std::path::Path;

use ndarray::ArrayD;
use tract_onnx::prelude::*;
use tracing::debug;

use crate::error::InferenceError;
use crate::tensor::{InputTensor, OutputTensor};
use crate::{InferenceBackend, Result};

/// Default token sequence length when no shape is given.
const DEFAULT_SEQ_LEN: usize = 256;

/// Backend running ONNX models through Tract.
///
/// Tract needs concrete input shapes before a model can be optimized,
/// so sequence length is fixed at load time. Inputs are assumed to be
/// `i64` id tensors, which covers BERT-style token classifiers.
pub struct TractBackend {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl TractBackend {
    /// Load a model from a file path with the default sequence shape
    /// (batch=1, seq=256).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with_shape(path, &[1, DEFAULT_SEQ_LEN])
    }

    /// Load a model from a file path with a specified input shape.
    pub fn from_file_with_shape<P: AsRef<Path>>(path: P, input_shape: &[usize]) -> Result<Self> {
        let path = path.as_ref();
        debug!("loading ONNX model with tract from {}", path.display());

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?;

        Self::build(model, input_shape)
    }

    /// Load a model from bytes with the default sequence shape.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with_shape(bytes, &[1, DEFAULT_SEQ_LEN])
    }

    /// Load a model from bytes with a specified input shape.
    pub fn from_bytes_with_shape(bytes: &[u8], input_shape: &[usize]) -> Result<Self> {
        debug!("loading ONNX model with tract from {} bytes", bytes.len());

        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(bytes))
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?;

        Self::build(model, input_shape)
    }

    fn build(mut model: InferenceModel, input_shape: &[usize]) -> Result<Self> {
        // Every declared input gets the same concrete id shape. BERT-style
        // models take input_ids / attention_mask / token_type_ids with
        // identical dimensions.
        let n_inputs = model.inputs.len();
        for idx in 0..n_inputs {
            model
                .set_input_fact(idx, InferenceFact::dt_shape(i64::datum_type(), input_shape))
                .map_err(|e| {
                    InferenceError::ModelLoad(format!("failed to pin input shape: {}", e))
                })?;
        }

        let input_names: Vec<String> = (0..n_inputs)
            .map(|idx| {
                model
                    .input_fact(idx)
                    .ok()
                    .and_then(|_| model.inputs.get(idx).map(|o| model.node(o.node).name.clone()))
                    .unwrap_or_else(|| format!("input_{}", idx))
            })
            .collect();

        let model = model
            .into_typed()
            .map_err(|e| InferenceError::ModelLoad(format!("failed to type model: {}", e)))?
            .into_optimized()
            .map_err(|e| InferenceError::ModelLoad(format!("failed to optimize model: {}", e)))?
            .into_runnable()
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?;

        let output_names = vec!["logits".to_string()];

        Ok(Self {
            model,
            input_names,
            output_names,
        })
    }
}

/// Repack one of our tensors as a tract value.
fn tract_value(tensor: &InputTensor) -> Result<TValue> {
    fn repack<T: Datum + Copy>(arr: &ArrayD<T>) -> Result<TValue> {
        let dims: TVec<usize> = arr.shape().iter().copied().collect();
        let packed = tract_ndarray::ArrayD::from_shape_vec(
            tract_ndarray::IxDyn(dims.as_slice()),
            arr.iter().copied().collect(),
        )
        .map_err(|e| InferenceError::InvalidInput(e.to_string()))?;
        Ok(packed.into_tvalue())
    }

    match tensor {
        InputTensor::Float32(arr) => repack(arr),
        InputTensor::Int32(arr) => repack(arr),
        InputTensor::Int64(arr) => repack(arr),
    }
}

/// Copy a tract output back into an owned ndarray.
fn unpack<T: Datum + Copy>(output: &TValue) -> Option<Result<ArrayD<T>>> {
    let view = output.to_array_view::<T>().ok()?;
    let arr = ArrayD::from_shape_vec(ndarray::IxDyn(view.shape()), view.iter().copied().collect())
        .map_err(|e| InferenceError::OutputExtraction(e.to_string()));
    Some(arr)
}

impl InferenceBackend for TractBackend {
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>> {
        let feed: TVec<TValue> = inputs
            .iter()
            .map(|(_, tensor)| tract_value(tensor))
            .collect::<Result<TVec<_>>>()?;

        let outputs = self
            .model
            .run(feed)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let mut results = Vec::with_capacity(outputs.len());
        for (idx, output) in outputs.iter().enumerate() {
            let name = self
                .output_names
                .get(idx)
                .cloned()
                .unwrap_or_else(|| format!("output_{}", idx));

            let tensor = if let Some(arr) = unpack::<f32>(output) {
                OutputTensor::Float32(arr?)
            } else if let Some(arr) = unpack::<i64>(output) {
                OutputTensor::Int64(arr?)
            } else if let Some(arr) = unpack::<i32>(output) {
                OutputTensor::Int32(arr?)
            } else {
                return Err(InferenceError::OutputExtraction(format!(
                    "unsupported output type for '{}'",
                    name
                )));
            };

            results.push((name, tensor));
        }

        Ok(results)
    }

    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }
}
