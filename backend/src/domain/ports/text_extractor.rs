//! Port for pulling text out of binary documents.

use super::define_port_error;

define_port_error! {
    /// Document could not be parsed.
    pub enum TextExtractionError {
        Malformed { message: String } => "document could not be read: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait PdfTextExtractor: Send + Sync {
    /// Extract page text in page order.
    ///
    /// Returns an empty string when the document has no extractable text.
    fn extract(&self, bytes: &[u8]) -> Result<String, TextExtractionError>;
}
