//! Document processing and question answering on top of a [`SessionState`].

use std::path::Path;

use serde::Serialize;
use studymate_document::{
    DocumentError, ExtractedDocument, SplitterConfig, TextLoader, TextSplitter, loader_for_path,
    normalize,
};
use studymate_index::RetrievalIndex;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::StudyError;
use crate::resolver::{Answer, QueryResolver};
use crate::session::{LoadedDocument, SessionState};

pub const DEFAULT_SUMMARY_CHARS: usize = 500;

/// First `max_chars` characters of `text`, with `...` appended only when
/// something was cut.
#[must_use]
pub fn summarize(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_owned(),
    }
}

/// Outcome of publishing a new document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Processed {
    pub generation: u64,
    pub source: String,
    pub chunks: usize,
    pub summary: String,
}

impl Processed {
    fn from_loaded(loaded: &LoadedDocument) -> Self {
        Self {
            generation: loaded.generation(),
            source: loaded.document().metadata.source.clone(),
            chunks: loaded.chunks().len(),
            summary: loaded.summary().to_owned(),
        }
    }
}

/// Stateless pipeline: extraction, normalization, chunking, indexing and
/// query resolution. Session state is passed in by the caller.
#[derive(Debug, Clone)]
pub struct StudyEngine {
    splitter: TextSplitter,
    resolver: QueryResolver,
    summary_chars: usize,
    max_file_size: u64,
}

impl Default for StudyEngine {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl StudyEngine {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            splitter: TextSplitter::new(SplitterConfig {
                chunk_size: config.document.chunk_size,
            }),
            resolver: QueryResolver::new(config.retrieval.top_k),
            summary_chars: config.document.summary_chars,
            max_file_size: config.document.max_file_size,
        }
    }

    #[must_use]
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Read a document from disk with the loader matching its extension.
    ///
    /// # Errors
    ///
    /// Returns [`StudyError::Document`] for unsupported, unreadable or
    /// oversized files.
    pub async fn extract_path(&self, path: &Path) -> Result<ExtractedDocument, StudyError> {
        let loader = loader_for_path(path, self.max_file_size)?;
        Ok(loader.load(path).await?)
    }

    /// Extract an uploaded body according to its media type.
    ///
    /// Parameters such as `; charset=utf-8` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnsupportedFormat`] for media types other than
    /// PDF and plain text, and the extraction error otherwise.
    pub async fn extract_upload(
        &self,
        content_type: &str,
        source: &str,
        bytes: Vec<u8>,
    ) -> Result<ExtractedDocument, StudyError> {
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match media_type.as_str() {
            #[cfg(feature = "pdf")]
            "application/pdf" => {
                let loader = studymate_document::PdfLoader {
                    max_file_size: self.max_file_size,
                };
                Ok(loader.extract_pages_from_bytes(source, bytes).await?)
            }
            "text/plain" | "text/markdown" => {
                let len = bytes.len() as u64;
                if len > self.max_file_size {
                    return Err(DocumentError::FileTooLarge(len).into());
                }
                let text = String::from_utf8(bytes).map_err(|e| {
                    DocumentError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
                })?;
                Ok(TextLoader::pages_from_text(source, &media_type, &text))
            }
            other => Err(DocumentError::UnsupportedFormat(other.to_owned()).into()),
        }
    }

    /// Normalize, chunk and index `extracted` into a generation that is ready
    /// to publish. Touches no session state.
    ///
    /// # Errors
    ///
    /// Returns `Document(EmptyDocument)` when no text survives normalization.
    pub fn prepare(&self, extracted: ExtractedDocument) -> Result<LoadedDocument, StudyError> {
        let document = normalize(extracted)?;
        let chunks = self.splitter.split(&document);
        let mut index = RetrievalIndex::tfidf();
        index.build(&chunks)?;
        let summary = summarize(&document.content, self.summary_chars);
        Ok(LoadedDocument::new(document, chunks, index, summary))
    }

    /// Publish the result of [`prepare`](Self::prepare). An empty document
    /// clears the session; any other failure leaves it untouched.
    ///
    /// # Errors
    ///
    /// Propagates the error from `prepared`.
    pub fn commit(
        state: &mut SessionState,
        prepared: Result<LoadedDocument, StudyError>,
    ) -> Result<Processed, StudyError> {
        match prepared {
            Ok(loaded) => {
                let loaded = state.replace(loaded);
                let processed = Processed::from_loaded(&loaded);
                tracing::info!(
                    source = %processed.source,
                    chunks = processed.chunks,
                    generation = processed.generation,
                    "document processed"
                );
                Ok(processed)
            }
            Err(e) if e.is_empty_document() => {
                tracing::warn!("document has no extractable text, session cleared");
                state.clear();
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// # Errors
    ///
    /// See [`prepare`](Self::prepare).
    pub fn process(
        &self,
        state: &mut SessionState,
        extracted: ExtractedDocument,
    ) -> Result<Processed, StudyError> {
        Self::commit(state, self.prepare(extracted))
    }

    /// Load, process and publish the document at `path`.
    ///
    /// # Errors
    ///
    /// Load failures leave `state` unchanged; see [`commit`](Self::commit).
    pub async fn process_path(
        &self,
        state: &mut SessionState,
        path: &Path,
    ) -> Result<Processed, StudyError> {
        let extracted = self.extract_path(path).await?;
        self.process(state, extracted)
    }

    /// Like [`process`](Self::process) for shared state: the generation is
    /// built on the blocking pool without holding the lock, then published
    /// under one write.
    ///
    /// # Errors
    ///
    /// See [`commit`](Self::commit). Returns [`StudyError::Aborted`], leaving
    /// `state` untouched, if the preparing task panics.
    pub async fn process_shared(
        &self,
        state: &RwLock<SessionState>,
        extracted: ExtractedDocument,
    ) -> Result<Processed, StudyError> {
        let engine = self.clone();
        let prepared = tokio::task::spawn_blocking(move || engine.prepare(extracted))
            .await
            .map_err(|e| StudyError::Aborted(e.to_string()))?;
        let mut guard = state.write().await;
        Self::commit(&mut guard, prepared)
    }

    /// # Errors
    ///
    /// See [`QueryResolver::resolve`].
    pub fn ask(&self, state: &SessionState, question: &str) -> Result<Answer, StudyError> {
        let snapshot = state.snapshot();
        self.resolver.resolve(snapshot.as_deref(), question)
    }

    /// Snapshot under a read lock, then resolve with the lock released.
    ///
    /// # Errors
    ///
    /// See [`QueryResolver::resolve`].
    pub async fn ask_shared(
        &self,
        state: &RwLock<SessionState>,
        question: &str,
    ) -> Result<Answer, StudyError> {
        let snapshot = state.read().await.snapshot();
        self.resolver.resolve(snapshot.as_deref(), question)
    }
}
