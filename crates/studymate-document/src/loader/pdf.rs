use std::path::Path;
use std::pin::Pin;

use crate::{DEFAULT_MAX_FILE_SIZE, DocumentError, DocumentLoader, DocumentMetadata, ExtractedDocument};

const PDF_CONTENT_TYPE: &str = "application/pdf";

pub struct PdfLoader {
    pub max_file_size: u64,
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl PdfLoader {
    /// Extract per-page text from an in-memory PDF (e.g. an HTTP upload).
    ///
    /// Extraction runs on the blocking pool; a panic inside the PDF parser is
    /// reported as [`DocumentError::Pdf`].
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer exceeds `max_file_size` or is not a readable PDF.
    pub async fn extract_pages_from_bytes(
        &self,
        source: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<ExtractedDocument, DocumentError> {
        let len = bytes.len() as u64;
        if len > self.max_file_size {
            return Err(DocumentError::FileTooLarge(len));
        }

        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
                .map_err(|e| DocumentError::Pdf(e.to_string()))
        })
        .await
        .map_err(|e| DocumentError::Pdf(format!("extraction aborted: {e}")))??;

        Ok(extracted(source.into(), pages))
    }
}

fn extracted(source: String, pages: Vec<String>) -> ExtractedDocument {
    tracing::debug!(source = %source, pages = pages.len(), "extracted PDF text");
    ExtractedDocument {
        metadata: DocumentMetadata {
            source,
            content_type: PDF_CONTENT_TYPE.to_owned(),
            page_count: pages.len(),
        },
        pages,
    }
}

impl DocumentLoader for PdfLoader {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ExtractedDocument, DocumentError>> + Send + '_>>
    {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let path = std::fs::canonicalize(&path)?;

            let meta = tokio::fs::metadata(&path).await?;
            if meta.len() > max_size {
                return Err(DocumentError::FileTooLarge(meta.len()));
            }

            let source = path.display().to_string();
            let pages = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_by_pages(&path)
                    .map_err(|e| DocumentError::Pdf(e.to_string()))
            })
            .await
            .map_err(|e| DocumentError::Pdf(format!("extraction aborted: {e}")))??;

            Ok(extracted(source, pages))
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_nonexistent_file() {
        let result = PdfLoader::default()
            .load(Path::new("/nonexistent/paper.pdf"))
            .await;
        assert!(matches!(result, Err(DocumentError::Io(_))));
    }

    #[tokio::test]
    async fn file_too_large_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("big.pdf");
        std::fs::write(&file, b"%PDF-1.4").unwrap();

        let loader = PdfLoader { max_file_size: 0 };
        let result = loader.load(&file).await;
        assert!(matches!(result, Err(DocumentError::FileTooLarge(_))));
    }

    #[tokio::test]
    async fn garbage_bytes_are_a_pdf_error() {
        let result = PdfLoader::default()
            .extract_pages_from_bytes("upload", b"definitely not a pdf".to_vec())
            .await;
        assert!(matches!(result, Err(DocumentError::Pdf(_))));
    }

    #[tokio::test]
    async fn oversized_upload_rejected_before_parsing() {
        let loader = PdfLoader { max_file_size: 4 };
        let result = loader
            .extract_pages_from_bytes("upload", vec![0u8; 5])
            .await;
        assert!(matches!(result, Err(DocumentError::FileTooLarge(5))));
    }

    #[test]
    fn extracted_metadata_counts_pages() {
        let doc = extracted("a.pdf".into(), vec!["one".into(), String::new()]);
        assert_eq!(doc.metadata.page_count, 2);
        assert_eq!(doc.metadata.content_type, "application/pdf");
    }

    #[test]
    fn supported_extensions_list() {
        assert_eq!(PdfLoader::default().supported_extensions(), &["pdf"]);
    }
}
