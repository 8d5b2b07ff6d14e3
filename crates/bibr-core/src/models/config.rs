//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the bibr pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BibrConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Named-entity recognition configuration.
    pub ner: NerConfig,

    /// Document ingest configuration.
    pub document: DocumentConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

impl Default for BibrConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            ner: NerConfig::default(),
            document: DocumentConfig::default(),
            models: ModelConfig::default(),
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Run the entity-recognition fallback for fields the patterns miss.
    pub use_entity_fallback: bool,

    /// Number of leading segments kept by the summarizer.
    pub summary_segments: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            use_entity_fallback: true,
            summary_segments: 2,
        }
    }
}

/// Named-entity recognition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NerConfig {
    /// Recognizer backend: "lexical" (no model files) or "onnx".
    pub backend: String,

    /// Maximum token sequence length for the ONNX classifier.
    pub max_seq_len: usize,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            backend: "lexical".to_string(),
            max_seq_len: 256,
        }
    }
}

/// Document ingest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Try to extract embedded PDF text before falling back to OCR.
    pub prefer_embedded_text: bool,

    /// Minimum text length to consider a PDF as text-based.
    pub min_text_length: usize,

    /// Run OCR over page images when embedded text is too short.
    pub ocr_fallback: bool,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            prefer_embedded_text: true,
            min_text_length: 50,
            ocr_fallback: true,
            max_pages: 10,
        }
    }
}

/// Model file names and base directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Token-classification model file name.
    pub ner_model: String,

    /// Wordpiece vocabulary file name.
    pub ner_vocab: String,

    /// BIO label file name.
    pub ner_labels: String,

    /// OCR text detection model file name.
    pub detection_model: String,

    /// OCR text recognition model file name.
    pub recognition_model: String,

    /// OCR character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            ner_model: "ner.onnx".to_string(),
            ner_vocab: "vocab.txt".to_string(),
            ner_labels: "labels.txt".to_string(),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl BibrConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.models.model_dir.join(model_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_backend_is_lexical() {
        let config = BibrConfig::default();
        assert_eq!(config.ner.backend, "lexical");
        assert!(config.extraction.use_entity_fallback);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: BibrConfig =
            serde_json::from_str(r#"{"ner": {"backend": "onnx"}}"#).unwrap();
        assert_eq!(config.ner.backend, "onnx");
        assert_eq!(config.ner.max_seq_len, 256);
        assert_eq!(config.document.min_text_length, 50);
    }

    #[test]
    fn test_model_path_joins_dir() {
        let config = BibrConfig::default();
        assert_eq!(
            config.model_path("ner.onnx"),
            PathBuf::from("models").join("ner.onnx")
        );
    }
}
