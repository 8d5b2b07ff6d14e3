//! PDF ingest using lopdf and pdf-extract.

use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace};

use crate::error::DocumentError;

use super::Result;

/// A loaded PDF, ready for text extraction and page-image collection.
pub struct PdfDocument {
    document: Document,
    /// Bytes handed to pdf-extract; re-saved when decryption rewrote them.
    raw_data: Vec<u8>,
}

impl PdfDocument {
    /// Load a PDF from bytes.
    ///
    /// PDFs encrypted with an empty password are decrypted in place;
    /// anything needing a real password is rejected.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut doc =
            Document::load_mem(data).map_err(|e| DocumentError::Parse(e.to_string()))?;

        let raw_data = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(DocumentError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted).map_err(|e| {
                DocumentError::Parse(format!("failed to save decrypted PDF: {}", e))
            })?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(DocumentError::Parse("PDF has no pages".to_string()));
        }

        debug!("Loaded PDF with {} pages", page_count);

        Ok(Self {
            document: doc,
            raw_data,
        })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Extract the embedded text layer of the whole document.
    pub fn extract_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| DocumentError::TextExtraction(e.to_string()))
    }

    /// Collect embedded images from at most `max_pages` pages (0 = all).
    ///
    /// Falls back to scanning every object in the document when no page
    /// references an image XObject; some generators attach scans outside
    /// the page resource dictionaries.
    pub fn page_images(&self, max_pages: usize) -> Vec<DynamicImage> {
        let pages = self.document.get_pages();
        let limit = if max_pages == 0 {
            pages.len()
        } else {
            max_pages.min(pages.len())
        };

        let mut images = Vec::new();
        for (_, page_id) in pages.iter().take(limit) {
            images.extend(self.images_on_page(*page_id));
        }

        if images.is_empty() {
            debug!("No page-level images found, scanning all objects");
            for object in self.document.objects.values() {
                if let Some(img) = decode_image_object(&self.document, object) {
                    images.push(img);
                }
            }
        }

        debug!("Collected {} page images", images.len());
        images
    }

    fn images_on_page(&self, page_id: ObjectId) -> Vec<DynamicImage> {
        let mut images = Vec::new();

        let resources = match page_resources(&self.document, page_id) {
            Some(r) => r,
            None => return images,
        };

        if let Ok(xobjects) = resources.get(b"XObject") {
            if let Ok((_, Object::Dictionary(dict))) = self.document.dereference(xobjects) {
                for (_name, obj_ref) in dict.iter() {
                    if let Ok((_, obj)) = self.document.dereference(obj_ref) {
                        if let Some(img) = decode_image_object(&self.document, obj) {
                            images.push(img);
                        }
                    }
                }
            }
        }

        images
    }
}

/// Resolve a page's resource dictionary, walking up the page tree for
/// inherited resources.
fn page_resources(doc: &Document, node_id: ObjectId) -> Option<lopdf::Dictionary> {
    let node = doc.get_object(node_id).ok()?;
    let dict = match node {
        Object::Dictionary(d) => d,
        _ => return None,
    };

    if let Ok(resources) = dict.get(b"Resources") {
        if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
            return Some(res_dict.clone());
        }
    }

    if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
        return page_resources(doc, *parent_id);
    }

    None
}

fn decode_image_object(doc: &Document, object: &Object) -> Option<DynamicImage> {
    let stream = match object {
        Object::Stream(s) => s,
        _ => return None,
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
    let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
    trace!("Found image XObject: {}x{}", width, height);

    if let Some(filter) = image_filter(dict) {
        match filter.as_slice() {
            // JPEG streams decode directly from the raw content.
            b"DCTDecode" => {
                return image::load_from_memory_with_format(
                    &stream.content,
                    image::ImageFormat::Jpeg,
                )
                .ok();
            }
            b"JPXDecode" | b"CCITTFaxDecode" | b"JBIG2Decode" => {
                trace!(
                    "Unsupported image filter: {}",
                    String::from_utf8_lossy(&filter)
                );
                return None;
            }
            _ => {}
        }
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    let color_space =
        resolve_color_space(doc, dict).unwrap_or_else(|| b"DeviceRGB".to_vec());

    decode_raw_samples(&data, width, height, &color_space)
}

fn image_filter(dict: &lopdf::Dictionary) -> Option<Vec<u8>> {
    match dict.get(b"Filter").ok()? {
        Object::Name(name) => Some(name.clone()),
        Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()).map(|n| n.to_vec()),
        _ => None,
    }
}

fn resolve_color_space(doc: &Document, dict: &lopdf::Dictionary) -> Option<Vec<u8>> {
    match dict.get(b"ColorSpace").ok()? {
        Object::Name(name) => Some(name.clone()),
        Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()).map(|n| n.to_vec()),
        Object::Reference(r) => doc
            .get_object(*r)
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| n.to_vec()),
        _ => None,
    }
}

fn decode_raw_samples(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
) -> Option<DynamicImage> {
    let pixel_count = (width * height) as usize;
    let mut rgba = Vec::with_capacity(pixel_count * 4);

    if color_space == b"DeviceRGB" || color_space == b"RGB" {
        if data.len() < pixel_count * 3 {
            return None;
        }
        for chunk in data[..pixel_count * 3].chunks_exact(3) {
            rgba.extend_from_slice(&[chunk[0], chunk[1], chunk[2], 255]);
        }
    } else if color_space == b"DeviceGray" || color_space == b"G" {
        if data.len() < pixel_count {
            return None;
        }
        for &gray in &data[..pixel_count] {
            rgba.extend_from_slice(&[gray, gray, gray, 255]);
        }
    } else {
        trace!(
            "Unsupported color space: {}",
            String::from_utf8_lossy(color_space)
        );
        return None;
    }

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba).map(DynamicImage::ImageRgba8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;
    use pretty_assertions::assert_eq;

    fn minimal_pdf_bytes() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_load_minimal_document() {
        let pdf = PdfDocument::load(&minimal_pdf_bytes()).unwrap();
        assert_eq!(pdf.page_count(), 1);
    }

    #[test]
    fn test_no_images_in_minimal_document() {
        let pdf = PdfDocument::load(&minimal_pdf_bytes()).unwrap();
        assert!(pdf.page_images(0).is_empty());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let err = PdfDocument::load(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }

    #[test]
    fn test_gray_samples_decode() {
        let img = decode_raw_samples(&[0u8, 128, 255, 64], 2, 2, b"DeviceGray").unwrap();
        assert_eq!(img.width(), 2);
        assert_eq!(img.height(), 2);
    }

    #[test]
    fn test_short_sample_buffer_rejected() {
        assert!(decode_raw_samples(&[0u8; 3], 2, 2, b"DeviceRGB").is_none());
    }
}
