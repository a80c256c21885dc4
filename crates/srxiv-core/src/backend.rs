use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    UnreadablePdf(String),
    #[error("failed to extract text: {0}")]
    Extraction(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF text extraction backends.
///
/// Implementors provide the low-level per-page text extraction step; the
/// resolution pipeline (marker location, block extraction, citation parsing)
/// operates on the returned page texts and never touches the file itself.
pub trait PdfBackend: Send + Sync {
    /// Extract text content, one string per page, in document order.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError>;
}
