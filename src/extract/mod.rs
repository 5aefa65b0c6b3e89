// Text extraction
// Turns uploaded document bytes into a single text string


use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::{QaError, Result};

/// Document formats accepted for indexing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Txt,
}

impl FileType {
    /// Determine the file type from a filename's extension
    #[inline]
    pub fn from_filename(filename: &str) -> Result<Self> {
        // The extension must match exactly apart from case; no surrounding whitespace
        let extension = filename.rsplit_once('.').map(|(_, ext)| ext);
        match extension {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Ok(Self::Pdf),
            Some(ext) if ext.eq_ignore_ascii_case("txt") => Ok(Self::Txt),
            _ => Err(QaError::UnsupportedType(filename.to_string())),
        }
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Txt => "txt",
        }
    }
}

impl FromStr for FileType {
    type Err = QaError;

    #[inline]
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "pdf" => Ok(Self::Pdf),
            "txt" => Ok(Self::Txt),
            _ => Err(QaError::UnsupportedType(s.to_string())),
        }
    }
}

impl fmt::Display for FileType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract the text of a document of the given type
#[inline]
pub fn extract_text(bytes: &[u8], file_type: FileType) -> Result<String> {
    debug!("Extracting {} bytes as {}", bytes.len(), file_type);
    match file_type {
        FileType::Pdf => extract_pdf_text(bytes),
        FileType::Txt => decode_plain_text(bytes),
    }
}

/// Concatenate the text of every page of a PDF in page order.
///
/// Pages without extractable text contribute nothing; only a byte stream that
/// is not a readable PDF container is an error.
#[inline]
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    let document = lopdf::Document::load_mem(bytes)
        .map_err(|e| QaError::Extraction(format!("Invalid PDF document: {}", e)))?;

    let pages = document.get_pages();
    let mut text = String::new();

    // get_pages is keyed by page number, so iteration is in document order
    for page_number in pages.keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => {
                warn!("No extractable text on PDF page {}: {}", page_number, e);
            }
        }
    }

    debug!(
        "Extracted {} characters from {} PDF pages",
        text.chars().count(),
        pages.len()
    );
    Ok(text)
}

/// Interpret bytes as UTF-8 text
#[inline]
pub fn decode_plain_text(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| QaError::Extraction(format!("Document is not valid UTF-8: {}", e)))
}
