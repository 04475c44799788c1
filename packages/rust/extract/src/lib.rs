//! Best-effort text extraction from uploaded contracts.
//!
//! Supported formats are PDF and DOCX. Extraction never fails outright:
//! unreadable documents yield an empty string and the caller decides what
//! "no text" means.

mod docx;

use std::path::Path;

use tracing::{debug, instrument, warn};

use clauseguard_shared::{ClauseGuardError, Result};

/// Upload formats accepted for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Detect the format from a file name's extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("pdf") => Ok(Self::Pdf),
            Some("docx") => Ok(Self::Docx),
            _ => Err(ClauseGuardError::invalid_input(format!(
                "unsupported file type '{filename}', only PDF and DOCX are allowed"
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Converts a stored upload into plain text.
pub trait TextExtractor: Send + Sync {
    /// Extract the text of `path`. Returns an empty string when nothing is readable.
    fn extract(&self, path: &Path, format: DocumentFormat) -> String;
}

/// PDF via `pdf-extract`, DOCX via the package's main document part.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExtractor;

impl TextExtractor for DefaultExtractor {
    #[instrument(skip_all, fields(path = %path.display(), %format))]
    fn extract(&self, path: &Path, format: DocumentFormat) -> String {
        let result = match format {
            DocumentFormat::Pdf => extract_pdf(path),
            DocumentFormat::Docx => docx::extract_docx(path),
        };

        match result {
            Ok(text) => {
                debug!(chars = text.len(), "text extracted");
                text
            }
            Err(e) => {
                warn!(error = %e, "text extraction failed");
                String::new()
            }
        }
    }
}

fn extract_pdf(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| ClauseGuardError::io(path, e))?;

    // pdf-extract panics on some malformed inputs.
    std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes))
        .map_err(|_| ClauseGuardError::validation("PDF parser panicked"))?
        .map_err(|e| ClauseGuardError::validation(format!("unreadable PDF: {e}")))
}
