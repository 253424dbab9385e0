use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    pub source: String,
    pub content_type: String,
    pub page_count: usize,
}

/// Per-page text as produced by a loader, before normalization.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub pages: Vec<String>,
    pub metadata: DocumentMetadata,
}

/// Cleaned document text. Never empty: see [`crate::normalizer::normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub content: String,
    pub chunk_index: usize,
}

impl AsRef<str> for Chunk {
    fn as_ref(&self) -> &str {
        &self.content
    }
}
