//! Per-user session state: at most one processed document at a time.

use std::sync::Arc;

use studymate_document::{Chunk, Document};
use studymate_index::RetrievalIndex;

/// One processed document: normalized text, its chunks, and the index built
/// over exactly those chunks. Immutable once published.
#[derive(Debug)]
pub struct LoadedDocument {
    generation: u64,
    document: Document,
    chunks: Vec<Chunk>,
    index: RetrievalIndex,
    summary: String,
}

impl LoadedDocument {
    /// Bundle a built index with the chunks it was built from. The generation
    /// is assigned when the document is published to a [`SessionState`].
    #[must_use]
    pub fn new(document: Document, chunks: Vec<Chunk>, index: RetrievalIndex, summary: String) -> Self {
        Self {
            generation: 0,
            document,
            chunks,
            index,
            summary,
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    #[must_use]
    pub fn index(&self) -> &RetrievalIndex {
        &self.index
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }
}

#[derive(Debug, Default)]
pub struct SessionState {
    current: Option<Arc<LoadedDocument>>,
    generation: u64,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stable view of the current document, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<LoadedDocument>> {
        self.current.clone()
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    /// Generation number of the most recent publish (0 before the first).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the current document with `loaded` in a single assignment.
    pub fn replace(&mut self, mut loaded: LoadedDocument) -> Arc<LoadedDocument> {
        self.generation += 1;
        loaded.generation = self.generation;
        let loaded = Arc::new(loaded);
        self.current = Some(Arc::clone(&loaded));
        loaded
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
