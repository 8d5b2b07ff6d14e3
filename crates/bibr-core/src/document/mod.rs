//! Document ingest module.
//!
//! Turns file bytes of the supported formats into plain text for the
//! extraction pipeline. OCR over images and scanned PDFs is only
//! available in native builds.

mod docx;
#[cfg(feature = "native")]
mod ocr;
mod pdf;

pub use docx::extract_docx_text;
#[cfg(feature = "native")]
pub use ocr::OcrEngine;
pub use pdf::PdfDocument;

use std::path::Path;

use tracing::debug;

use crate::error::DocumentError;
use crate::models::config::DocumentConfig;

/// Result type for document ingest operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Kind of input document, judged by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Plain UTF-8 text.
    PlainText,
    /// PDF, text-based or scanned.
    Pdf,
    /// Word OOXML container.
    Docx,
    /// Raster image, OCR only.
    Image,
}

impl DocumentKind {
    /// Determine the document kind from a file path.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        Self::from_extension(&ext).ok_or(DocumentError::Unsupported(ext))
    }

    /// Map a lowercase file extension to a document kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "txt" | "text" | "md" => Some(Self::PlainText),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "png" | "jpg" | "jpeg" | "bmp" | "tif" | "tiff" | "webp" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Reads documents of all supported kinds into plain text.
pub struct DocumentReader {
    config: DocumentConfig,
    #[cfg(feature = "native")]
    ocr: Option<OcrEngine>,
}

impl DocumentReader {
    /// Create a reader with the given ingest configuration.
    pub fn new(config: DocumentConfig) -> Self {
        Self {
            config,
            #[cfg(feature = "native")]
            ocr: None,
        }
    }

    /// Attach an OCR engine for images and scanned PDFs.
    #[cfg(feature = "native")]
    pub fn with_ocr(mut self, ocr: OcrEngine) -> Self {
        self.ocr = Some(ocr);
        self
    }

    /// Read a file from disk, picking the handler by extension.
    pub fn read_path(&self, path: &Path) -> Result<String> {
        let kind = DocumentKind::from_path(path)?;
        let data = std::fs::read(path).map_err(|e| DocumentError::Parse(e.to_string()))?;
        debug!("Read {} bytes from {} as {:?}", data.len(), path.display(), kind);
        self.read(&data, kind)
    }

    /// Convert document bytes into plain text.
    pub fn read(&self, data: &[u8], kind: DocumentKind) -> Result<String> {
        match kind {
            DocumentKind::PlainText => Ok(String::from_utf8_lossy(data).into_owned()),
            DocumentKind::Pdf => self.read_pdf(data),
            DocumentKind::Docx => extract_docx_text(data),
            DocumentKind::Image => self.read_image(data),
        }
    }

    fn read_pdf(&self, data: &[u8]) -> Result<String> {
        let doc = PdfDocument::load(data)?;

        let mut text = String::new();
        if self.config.prefer_embedded_text {
            match doc.extract_text() {
                Ok(embedded) => text = embedded,
                Err(err) => debug!("Embedded text extraction failed: {}", err),
            }
        }

        if text.trim().len() >= self.config.min_text_length {
            return Ok(text);
        }

        #[cfg(feature = "native")]
        {
            if self.config.ocr_fallback {
                if let Some(ocr_text) = self.ocr_pdf_pages(&doc)? {
                    return Ok(ocr_text);
                }
            }
        }

        if text.trim().is_empty() {
            Err(DocumentError::TextExtraction(
                "no extractable text in PDF".to_string(),
            ))
        } else {
            Ok(text)
        }
    }

    /// OCR the embedded page images. Returns `None` when no engine is
    /// attached or no page yields text.
    #[cfg(feature = "native")]
    fn ocr_pdf_pages(&self, doc: &PdfDocument) -> Result<Option<String>> {
        let ocr = match &self.ocr {
            Some(engine) => engine,
            None => return Ok(None),
        };

        let images = doc.page_images(self.config.max_pages);
        debug!("Running OCR over {} PDF page images", images.len());

        let mut parts = Vec::new();
        for (idx, image) in images.iter().enumerate() {
            match ocr.extract_text(image) {
                Ok(page_text) if !page_text.trim().is_empty() => parts.push(page_text),
                Ok(_) => {}
                Err(err) => debug!("OCR failed on page image {}: {}", idx + 1, err),
            }
        }

        if parts.is_empty() {
            Ok(None)
        } else {
            Ok(Some(parts.join("\n\n")))
        }
    }

    #[cfg(feature = "native")]
    fn read_image(&self, data: &[u8]) -> Result<String> {
        let ocr = self
            .ocr
            .as_ref()
            .ok_or_else(|| DocumentError::Ocr("no OCR engine attached".to_string()))?;
        let image =
            image::load_from_memory(data).map_err(|e| DocumentError::Parse(e.to_string()))?;
        ocr.extract_text(&image)
    }

    #[cfg(not(feature = "native"))]
    fn read_image(&self, _data: &[u8]) -> Result<String> {
        Err(DocumentError::Ocr(
            "OCR is unavailable in this build".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_extension("txt"), Some(DocumentKind::PlainText));
        assert_eq!(DocumentKind::from_extension("pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_extension("docx"), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_extension("png"), Some(DocumentKind::Image));
        assert_eq!(DocumentKind::from_extension("odt"), None);
    }

    #[test]
    fn test_kind_from_path_case_insensitive() {
        let kind = DocumentKind::from_path(Path::new("scan.PDF")).unwrap();
        assert_eq!(kind, DocumentKind::Pdf);
    }

    #[test]
    fn test_kind_from_path_unsupported() {
        let err = DocumentKind::from_path(Path::new("notes.odt")).unwrap_err();
        assert!(matches!(err, DocumentError::Unsupported(ext) if ext == "odt"));
    }

    #[test]
    fn test_plain_text_passthrough() {
        let reader = DocumentReader::new(DocumentConfig::default());
        let text = reader
            .read(b"A pamphlet by Jane Doe, 1901.", DocumentKind::PlainText)
            .unwrap();
        assert_eq!(text, "A pamphlet by Jane Doe, 1901.");
    }

    #[test]
    fn test_invalid_pdf_rejected() {
        let reader = DocumentReader::new(DocumentConfig::default());
        let err = reader.read(b"not a pdf", DocumentKind::Pdf).unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }
}
