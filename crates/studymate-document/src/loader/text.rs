use std::path::Path;
use std::pin::Pin;

use crate::{DEFAULT_MAX_FILE_SIZE, DocumentError, DocumentLoader, DocumentMetadata, ExtractedDocument};

/// Form feed, the conventional page break in plain-text exports.
const PAGE_BREAK: char = '\x0c';

pub struct TextLoader {
    pub max_file_size: u64,
}

impl Default for TextLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl TextLoader {
    /// Split already-decoded text into pages on form feeds.
    #[must_use]
    pub fn pages_from_text(source: impl Into<String>, content_type: &str, text: &str) -> ExtractedDocument {
        let pages: Vec<String> = text.split(PAGE_BREAK).map(str::to_owned).collect();
        ExtractedDocument {
            metadata: DocumentMetadata {
                source: source.into(),
                content_type: content_type.to_owned(),
                page_count: pages.len(),
            },
            pages,
        }
    }
}

impl DocumentLoader for TextLoader {
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

            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();

            let content_type = match ext.as_str() {
                "md" | "markdown" => "text/markdown",
                _ => "text/plain",
            };

            let content = tokio::fs::read_to_string(&path).await?;

            Ok(Self::pages_from_text(
                path.display().to_string(),
                content_type,
                &content,
            ))
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md", "markdown"]
    }
}
