//! OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::DocumentError;
use crate::models::config::ModelConfig;

use super::Result;

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct OcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
}

impl OcrEngine {
    /// Create an engine from model files named by `models` in `model_dir`.
    pub fn from_dir(model_dir: &Path, models: &ModelConfig) -> Result<Self> {
        let det_path = model_dir.join(&models.detection_model);
        let rec_path = model_dir.join(&models.recognition_model);
        let dict_path = model_dir.join(&models.dictionary);

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| DocumentError::Ocr(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self { engine })
    }

    /// Run OCR over an image and return its text in reading order.
    pub fn extract_text(&self, image: &DynamicImage) -> Result<String> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        debug!("Running OCR on {}x{} image", width, height);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| DocumentError::Ocr(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let mut lines: Vec<(f32, f32, String)> = results
            .iter()
            .map(|r| {
                let (x, y) = top_left(&r.bounding_box);
                (y, x, r.text.replace("[UNK]", " "))
            })
            .collect();

        // Reading order: rows bucketed by y, then left to right.
        lines.sort_by(|a, b| {
            let row_a = (a.0 / 20.0) as i32;
            let row_b = (b.0 / 20.0) as i32;
            if row_a != row_b {
                row_a.cmp(&row_b)
            } else {
                a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal)
            }
        });

        let text = lines
            .iter()
            .map(|(_, _, t)| t.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        info!(
            "OCR complete: {} text regions in {}ms",
            lines.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}

/// Top-left corner of a detected region's bounding polygon.
fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    for coord in polygon.exterior().coords() {
        min_x = min_x.min(coord.x as f32);
        min_y = min_y.min(coord.y as f32);
    }
    (min_x, min_y)
}
