//! `lopdf`-backed implementation of the `PdfTextExtractor` port.

use lopdf::Document;

use crate::domain::ports::{PdfTextExtractor, TextExtractionError};

/// Extracts page text in page order. Pages whose content streams cannot be
/// decoded are skipped rather than failing the whole document.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfTextExtractor;

impl PdfTextExtractor for LopdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, TextExtractionError> {
        let document = Document::load_mem(bytes)
            .map_err(|error| TextExtractionError::malformed(error.to_string()))?;

        let mut pages = Vec::new();
        for page_number in document.get_pages().into_keys() {
            match document.extract_text(&[page_number]) {
                Ok(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        pages.push(trimmed.to_owned());
                    }
                }
                Err(error) => {
                    tracing::debug!(page_number, error = %error, "skipping unreadable PDF page");
                }
            }
        }
        Ok(pages.join("\n\n"))
    }
}
