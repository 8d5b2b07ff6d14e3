//! DOCX text extraction.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use zip::ZipArchive;

use crate::error::DocumentError;

use super::Result;

/// Extract paragraph text from a DOCX file.
///
/// DOCX is a zip container with the document body at
/// `word/document.xml`. Text lives in `w:t` runs; paragraphs close
/// with `w:p` and become line breaks.
pub fn extract_docx_text(data: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| DocumentError::Parse(format!("not a docx container: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| DocumentError::Parse(format!("missing word/document.xml: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| DocumentError::Parse(e.to_string()))?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:br" => text.push('\n'),
            Ok(Event::Text(e)) if in_text_run => {
                let chunk = e
                    .unescape()
                    .map_err(|err| DocumentError::TextExtraction(err.to_string()))?;
                text.push_str(&chunk);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(DocumentError::Parse(format!(
                    "invalid document xml: {}",
                    err
                )))
            }
        }
    }

    debug!("Extracted {} characters from docx body", text.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn docx_with_body(body_xml: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body_xml
        );
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_paragraphs() {
        let data = docx_with_body(
            "<w:p><w:r><w:t>A Study of Systems</w:t></w:r></w:p>\
             <w:p><w:r><w:t>by John Smith, 2021.</w:t></w:r></w:p>",
        );
        let text = extract_docx_text(&data).unwrap();
        assert_eq!(text, "A Study of Systems\nby John Smith, 2021.\n");
    }

    #[test]
    fn test_split_runs_joined() {
        let data = docx_with_body(
            "<w:p><w:r><w:t>by </w:t></w:r><w:r><w:t>Jane Doe</w:t></w:r></w:p>",
        );
        let text = extract_docx_text(&data).unwrap();
        assert_eq!(text, "by Jane Doe\n");
    }

    #[test]
    fn test_entities_unescaped() {
        let data = docx_with_body("<w:p><w:r><w:t>Dombey &amp; Son</w:t></w:r></w:p>");
        let text = extract_docx_text(&data).unwrap();
        assert_eq!(text, "Dombey & Son\n");
    }

    #[test]
    fn test_not_a_zip_rejected() {
        let err = extract_docx_text(b"plain bytes").unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }

    #[test]
    fn test_zip_without_document_xml_rejected() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("other.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"hello").unwrap();
        let data = writer.finish().unwrap().into_inner();

        let err = extract_docx_text(&data).unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }
}
