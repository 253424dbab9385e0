//! Chunk retrieval: fit on the current chunks, rank chunks against a query.

use serde::Serialize;

use crate::error::{IndexError, Result};
use crate::tfidf::TfidfVectorizer;
use crate::vectorizer::{SparseVector, VectorModel, Vectorizer};

/// A chunk position and its similarity to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk_index: usize,
    pub score: f32,
}

struct Fitted<M> {
    model: M,
    vectors: Vec<SparseVector>,
}

/// Similarity index over one chunk sequence.
///
/// The index is rebuilt from scratch on every [`build`](Self::build); it is
/// never updated incrementally.
pub struct RetrievalIndex<V: Vectorizer = TfidfVectorizer> {
    vectorizer: V,
    fitted: Option<Fitted<V::Model>>,
}

impl RetrievalIndex<TfidfVectorizer> {
    /// Unbuilt index backed by [`TfidfVectorizer`].
    #[must_use]
    pub fn tfidf() -> Self {
        Self::new(TfidfVectorizer::new())
    }
}

impl Default for RetrievalIndex<TfidfVectorizer> {
    fn default() -> Self {
        Self::tfidf()
    }
}

impl<V: Vectorizer> std::fmt::Debug for RetrievalIndex<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalIndex")
            .field("ready", &self.is_ready())
            .field("chunks", &self.len())
            .finish_non_exhaustive()
    }
}

impl<V: Vectorizer> RetrievalIndex<V> {
    #[must_use]
    pub fn new(vectorizer: V) -> Self {
        Self {
            vectorizer,
            fitted: None,
        }
    }

    /// Fit the vectorizer on `chunks` and vectorize each of them, replacing
    /// whatever was built before.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InsufficientData`] if `chunks` is empty. The
    /// index is left unbuilt on error.
    pub fn build<S: AsRef<str>>(&mut self, chunks: &[S]) -> Result<()> {
        self.fitted = None;

        let corpus: Vec<&str> = chunks.iter().map(AsRef::as_ref).collect();
        if corpus.is_empty() {
            return Err(IndexError::InsufficientData);
        }

        let model = self.vectorizer.fit(&corpus)?;
        let vectors = corpus.iter().map(|text| model.transform(text)).collect();

        tracing::debug!(
            chunks = corpus.len(),
            vocabulary = model.vocabulary_len(),
            "retrieval index built"
        );
        self.fitted = Some(Fitted { model, vectors });
        Ok(())
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.fitted.is_some()
    }

    /// Number of indexed chunks (zero when unbuilt).
    #[must_use]
    pub fn len(&self) -> usize {
        self.fitted.as_ref().map_or(0, |f| f.vectors.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn vocabulary_len(&self) -> usize {
        self.fitted.as_ref().map_or(0, |f| f.model.vocabulary_len())
    }

    /// Score every chunk against `text`.
    ///
    /// Ordered by descending score; equal scores keep ascending chunk order.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::IndexNotReady`] if the index has not been built.
    pub fn query(&self, text: &str) -> Result<Vec<ScoredChunk>> {
        let fitted = self.fitted.as_ref().ok_or(IndexError::IndexNotReady)?;
        let query_vector = fitted.model.transform(text);

        let mut ranked: Vec<ScoredChunk> = fitted
            .vectors
            .iter()
            .enumerate()
            .map(|(chunk_index, vector)| ScoredChunk {
                chunk_index,
                score: fitted.model.similarity(&query_vector, vector),
            })
            .collect();

        // Stable sort keeps insertion (chunk) order among equal scores.
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(ranked)
    }

    /// The first `k` entries of [`query`](Self::query).
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::IndexNotReady`] if the index has not been built.
    pub fn top_k(&self, text: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let mut ranked = self.query(text)?;
        ranked.truncate(k);
        Ok(ranked)
    }
}
