//! crates/examease_core/src/extract.rs
//!
//! Format dispatch for text extraction, plus the two extractors that need no
//! external library: plain text and the image placeholder.

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::DocumentType;
use crate::ports::{PortError, PortResult, TextExtractor};

/// Stored in place of image text until OCR exists.
pub const IMAGE_PLACEHOLDER: &str = "[Image content - OCR not available]";

/// Decodes bytes as UTF-8, replacing invalid sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, data: &[u8]) -> PortResult<String> {
        Ok(String::from_utf8_lossy(data).into_owned())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePlaceholderExtractor;

impl TextExtractor for ImagePlaceholderExtractor {
    fn extract(&self, _data: &[u8]) -> PortResult<String> {
        Ok(IMAGE_PLACEHOLDER.to_string())
    }
}

/// Maps each document type to the extractor that handles it.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<DocumentType, Arc<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    /// A registry with the built-in TXT and image extractors. PDF and DOCX
    /// extractors are supplied by the hosting service.
    pub fn with_builtins() -> Self {
        Self::default()
            .register(DocumentType::Txt, Arc::new(PlainTextExtractor))
            .register(DocumentType::Image, Arc::new(ImagePlaceholderExtractor))
    }

    pub fn register(mut self, doc_type: DocumentType, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractors.insert(doc_type, extractor);
        self
    }

    fn extractor_for(&self, doc_type: DocumentType) -> PortResult<Arc<dyn TextExtractor>> {
        self.extractors.get(&doc_type).cloned().ok_or_else(|| {
            PortError::Extraction(format!("no text extractor for {} documents", doc_type))
        })
    }

    pub fn extract(&self, doc_type: DocumentType, data: &[u8]) -> PortResult<String> {
        self.extractor_for(doc_type)?.extract(data)
    }

    /// Like [`Self::extract`], but runs on tokio's blocking pool so a slow
    /// parse does not stall the async workers.
    pub async fn extract_blocking(&self, doc_type: DocumentType, data: Bytes) -> PortResult<String> {
        let extractor = self.extractor_for(doc_type)?;
        tokio::task::spawn_blocking(move || extractor.extract(&data))
            .await
            .map_err(|e| PortError::Extraction(format!("text extraction task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_decoded_lossily() {
        let text = PlainTextExtractor.extract(b"caf\xff ok").unwrap();
        assert_eq!(text, "caf\u{fffd} ok");
    }

    #[test]
    fn images_yield_the_placeholder() {
        let registry = ExtractorRegistry::with_builtins();
        assert_eq!(
            registry.extract(DocumentType::Image, &[0x89, b'P', b'N', b'G']).unwrap(),
            IMAGE_PLACEHOLDER
        );
    }

    #[tokio::test]
    async fn blocking_extraction_matches_the_inline_path() {
        let registry = ExtractorRegistry::with_builtins();
        let text = registry
            .extract_blocking(DocumentType::Txt, Bytes::from_static(b"Q1. Define a process."))
            .await
            .unwrap();
        assert_eq!(text, "Q1. Define a process.");

        let err = registry
            .extract_blocking(DocumentType::Zip, Bytes::from_static(b"PK"))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Extraction(_)));
    }

    #[test]
    fn unregistered_formats_fail_with_an_extraction_error() {
        let registry = ExtractorRegistry::with_builtins();
        let err = registry.extract(DocumentType::Pptx, b"PK").unwrap_err();
        assert!(matches!(err, PortError::Extraction(msg) if msg.contains("pptx")));
    }
}
