//! services/api/src/adapters/extractors.rs
//!
//! Text extractors for the binary upload formats. Plain text and images are
//! handled inside the core; these plug PDF and DOCX support into its registry.

use examease_core::domain::DocumentType;
use examease_core::extract::ExtractorRegistry;
use examease_core::ports::{PortError, PortResult, TextExtractor};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use std::sync::Arc;
use zip::ZipArchive;

/// The core's built-in extractors plus PDF and DOCX.
pub fn default_registry() -> ExtractorRegistry {
    ExtractorRegistry::with_builtins()
        .register(DocumentType::Pdf, Arc::new(PdfTextExtractor))
        .register(DocumentType::Docx, Arc::new(DocxTextExtractor))
}

//=========================================================================================
// PDF
//=========================================================================================

pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, data: &[u8]) -> PortResult<String> {
        // pdf-extract panics on some malformed inputs.
        let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data));
        match result {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(PortError::Extraction(format!("Failed to read PDF: {}", e))),
            Err(_) => Err(PortError::Extraction("Failed to read PDF: malformed document".to_string())),
        }
    }
}

//=========================================================================================
// DOCX
//=========================================================================================

/// Reads the paragraphs of `word/document.xml`, one paragraph per line.
pub struct DocxTextExtractor;

impl DocxTextExtractor {
    fn document_xml(data: &[u8]) -> PortResult<String> {
        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| PortError::Extraction(format!("Failed to open DOCX archive: {}", e)))?;
        let mut file = archive
            .by_name("word/document.xml")
            .map_err(|e| PortError::Extraction(format!("DOCX has no document body: {}", e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| PortError::Extraction(format!("Failed to read document.xml: {}", e)))?;
        Ok(content)
    }
}

impl TextExtractor for DocxTextExtractor {
    fn extract(&self, data: &[u8]) -> PortResult<String> {
        let xml_content = Self::document_xml(data)?;

        let mut reader = Reader::from_str(&xml_content);
        // Runs split words at arbitrary points; their spacing must survive.
        reader.trim_text(false);

        let mut buf = Vec::new();
        let mut paragraphs: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut in_text = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"p" => current.clear(),
                    b"t" => in_text = true,
                    _ => {}
                },
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"p" => paragraphs.push(std::mem::take(&mut current)),
                    b"t" => in_text = false,
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                    b"tab" => current.push('\t'),
                    b"br" | b"cr" => current.push('\n'),
                    b"p" => paragraphs.push(String::new()),
                    _ => {}
                },
                Ok(Event::Text(e)) if in_text => {
                    let text = e
                        .unescape()
                        .map_err(|e| PortError::Extraction(format!("Invalid DOCX text: {}", e)))?;
                    current.push_str(&text);
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(PortError::Extraction(format!(
                        "Failed to parse document.xml at {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(paragraphs.join("\n"))
    }
}
