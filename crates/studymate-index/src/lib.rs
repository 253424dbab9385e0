//! Chunk retrieval over a sparse term-weight model.
//!
//! A [`Vectorizer`] is fitted on the current chunk set, every chunk is
//! projected into the fitted vocabulary, and queries are ranked by cosine
//! similarity. [`TfidfVectorizer`] is the shipped vectorizer; any other
//! implementation of the trait pair can be swapped in without touching
//! [`RetrievalIndex`].

pub mod error;
pub mod retrieval;
pub mod tfidf;
pub mod vectorizer;

pub use error::{IndexError, Result};
pub use retrieval::{RetrievalIndex, ScoredChunk};
pub use tfidf::{TfidfModel, TfidfVectorizer};
pub use vectorizer::{SparseVector, VectorModel, Vectorizer};
