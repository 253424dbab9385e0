#[cfg(feature = "pdf")]
mod pdf;
mod text;

use std::path::Path;

#[cfg(feature = "pdf")]
pub use pdf::PdfLoader;
pub use text::TextLoader;

use crate::{DocumentError, DocumentLoader};

/// Pick a loader by file extension (case-insensitive).
///
/// # Errors
///
/// Returns [`DocumentError::UnsupportedFormat`] when no loader handles the extension.
pub fn loader_for_path(
    path: &Path,
    max_file_size: u64,
) -> Result<Box<dyn DocumentLoader>, DocumentError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    #[cfg(feature = "pdf")]
    {
        let pdf = PdfLoader { max_file_size };
        if pdf.supported_extensions().contains(&ext.as_str()) {
            return Ok(Box::new(pdf));
        }
    }

    let text = TextLoader { max_file_size };
    if text.supported_extensions().contains(&ext.as_str()) {
        return Ok(Box::new(text));
    }

    Err(DocumentError::UnsupportedFormat(if ext.is_empty() {
        path.display().to_string()
    } else {
        ext
    }))
}
