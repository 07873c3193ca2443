//! Page-level text extraction for PDF documents.
//!
//! The loader supplies raw file bytes; this module returns one UTF-8 string
//! per page, in page order. Pages without a text layer come back as empty
//! strings so page numbering stays aligned with the PDF.

/// Extraction error for a single PDF.
#[derive(Debug)]
pub enum ExtractError {
    Pdf(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Extracts the text of every page. Index `i` holds page `i + 1`.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
    pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}
