//! Native backend running ONNX models through `ort` with XNNPACK.

use std::path::Path;
use std::sync::Mutex;

use ndarray::{ArrayD, IxDyn};
use ort::ep::XNNPACK;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::{Session, SessionInputValue};
use ort::value::Tensor;
use tracing::debug;

use crate::error::InferenceError;
use crate::tensor::{InputTensor, OutputTensor};
use crate::{InferenceBackend, Result};

/// ONNX Runtime session wrapper.
///
/// `Session::run` takes `&mut self`, so the session sits behind a
/// mutex and concurrent callers serialize on it.
pub struct OrtBackend {
    session: Mutex<Session>,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl OrtBackend {
    /// Load a model from an `.onnx` file on disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("loading ONNX model from {}", path.display());
        let bytes = std::fs::read(path).map_err(InferenceError::Io)?;
        Self::from_bytes(&bytes)
    }

    /// Load a model from in-memory bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut builder = Session::builder()
            .and_then(|b| Ok(b.with_execution_providers([XNNPACK::default().build()])?))
            .and_then(|b| Ok(b.with_optimization_level(GraphOptimizationLevel::Level3)?))
            .and_then(|b| Ok(b.with_intra_threads(4)?))
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?;

        let session = builder
            .commit_from_memory(bytes)
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?;

        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|o| o.name().to_string())
            .collect();
        debug!("model inputs {:?} outputs {:?}", input_names, output_names);

        Ok(Self {
            session: Mutex::new(session),
            input_names,
            output_names,
        })
    }
}

/// Convert one of our tensors into a value the session can consume.
fn session_input(tensor: &InputTensor) -> Result<SessionInputValue<'static>> {
    let dims: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
    let value = match tensor {
        InputTensor::Float32(arr) => {
            Tensor::from_array((dims, arr.iter().copied().collect::<Vec<f32>>())).map(Into::into)
        }
        InputTensor::Int32(arr) => {
            Tensor::from_array((dims, arr.iter().copied().collect::<Vec<i32>>())).map(Into::into)
        }
        InputTensor::Int64(arr) => {
            Tensor::from_array((dims, arr.iter().copied().collect::<Vec<i64>>())).map(Into::into)
        }
    };
    value.map_err(|e| InferenceError::InvalidInput(e.to_string()))
}

fn rebuild<T>(dims: Vec<usize>, data: Vec<T>) -> Result<ArrayD<T>> {
    ArrayD::from_shape_vec(IxDyn(&dims), data)
        .map_err(|e| InferenceError::OutputExtraction(e.to_string()))
}

impl InferenceBackend for OrtBackend {
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>> {
        let mut feed: Vec<(&str, SessionInputValue<'static>)> = Vec::with_capacity(inputs.len());
        for (name, tensor) in inputs {
            feed.push((*name, session_input(tensor)?));
        }

        let mut session = self
            .session
            .lock()
            .map_err(|e| InferenceError::InferenceFailed(format!("session lock poisoned: {}", e)))?;
        let outputs = session
            .run(feed)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let mut results = Vec::with_capacity(outputs.len());
        for (name, value) in outputs.iter() {
            // Logits come back as f32; id-shaped outputs as i64 or i32.
            let tensor = if let Ok((shape, data)) = value.try_extract_tensor::<f32>() {
                let dims = shape.iter().map(|&d| d as usize).collect();
                OutputTensor::Float32(rebuild(dims, data.to_vec())?)
            } else if let Ok((shape, data)) = value.try_extract_tensor::<i64>() {
                let dims = shape.iter().map(|&d| d as usize).collect();
                OutputTensor::Int64(rebuild(dims, data.to_vec())?)
            } else if let Ok((shape, data)) = value.try_extract_tensor::<i32>() {
                let dims = shape.iter().map(|&d| d as usize).collect();
                OutputTensor::Int32(rebuild(dims, data.to_vec())?)
            } else {
                return Err(InferenceError::OutputExtraction(format!(
                    "unsupported output type for '{}'",
                    name
                )));
            };
            results.push((name.to_string(), tensor));
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
