//! Tensor types crossing the backend boundary.

use ndarray::{ArrayD, IxDyn};

use crate::error::InferenceError;
use crate::Result;

/// Input tensor for inference.
///
/// Token-classification models take `Int64` id and mask tensors; pixel
/// models take `Float32` tensors.
#[derive(Debug, Clone)]
pub enum InputTensor {
    Float32(ArrayD<f32>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
}

impl InputTensor {
    /// Build a `Float32` tensor from raw data and shape.
    pub fn from_f32(data: Vec<f32>, shape: Vec<usize>) -> Result<Self> {
        let arr = ArrayD::from_shape_vec(IxDyn(&shape), data)
            .map_err(|e| InferenceError::InvalidInput(e.to_string()))?;
        Ok(InputTensor::Float32(arr))
    }

    /// Build an `Int64` tensor from raw data and shape.
    ///
    /// Token ids, attention masks and segment ids all come through
    /// here.
    pub fn from_i64(data: Vec<i64>, shape: Vec<usize>) -> Result<Self> {
        let arr = ArrayD::from_shape_vec(IxDyn(&shape), data)
            .map_err(|e| InferenceError::InvalidInput(e.to_string()))?;
        Ok(InputTensor::Int64(arr))
    }

    /// Shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        match self {
            InputTensor::Float32(arr) => arr.shape(),
            InputTensor::Int32(arr) => arr.shape(),
            InputTensor::Int64(arr) => arr.shape(),
        }
    }
}

/// Output tensor from inference.
#[derive(Debug, Clone)]
pub enum OutputTensor {
    Float32(ArrayD<f32>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
}

impl OutputTensor {
    /// Shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        match self {
            OutputTensor::Float32(arr) => arr.shape(),
            OutputTensor::Int32(arr) => arr.shape(),
            OutputTensor::Int64(arr) => arr.shape(),
        }
    }

    /// Inner array when this is a `Float32` tensor. Classification
    /// logits land here.
    pub fn as_f32(&self) -> Option<&ArrayD<f32>> {
        match self {
            OutputTensor::Float32(arr) => Some(arr),
            _ => None,
        }
    }

    /// Inner array when this is an `Int64` tensor.
    pub fn as_i64(&self) -> Option<&ArrayD<i64>> {
        match self {
            OutputTensor::Int64(arr) => Some(arr),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn from_i64_builds_expected_shape() {
        let t = InputTensor::from_i64(vec![101, 2023, 102, 0], vec![1, 4]).unwrap();
        assert_eq!(t.shape(), &[1, 4]);
    }

    #[test]
    fn from_f32_rejects_shape_mismatch() {
        assert!(InputTensor::from_f32(vec![0.0; 3], vec![2, 2]).is_err());
    }

    #[test]
    fn output_downcasts_by_type() {
        let arr = ArrayD::from_shape_vec(IxDyn(&[2]), vec![1.0f32, 2.0]).unwrap();
        let out = OutputTensor::Float32(arr);
        assert!(out.as_f32().is_some());
        assert!(out.as_i64().is_none());
    }
}
