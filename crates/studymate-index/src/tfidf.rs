//! Term-frequency / inverse-document-frequency vectorizer.
//!
//! Conventions: text is lowercased, tokens are runs of two or more word
//! characters, the vocabulary is sorted lexicographically, TF is the raw
//! count, IDF is smoothed (`ln((1 + n) / (1 + df)) + 1`) and every vector is
//! L2-normalized.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{IndexError, Result};
use crate::vectorizer::{SparseVector, VectorModel, Vectorizer};

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Lowercase `text` and return its tokens in order of appearance.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_owned())
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TfidfVectorizer;

impl TfidfVectorizer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Vectorizer for TfidfVectorizer {
    type Model = TfidfModel;

    fn fit(&self, corpus: &[&str]) -> Result<TfidfModel> {
        if corpus.is_empty() {
            return Err(IndexError::InsufficientData);
        }

        let mut document_frequency: BTreeMap<String, u32> = BTreeMap::new();
        for text in corpus {
            let unique: BTreeSet<String> = tokenize(text).into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let n = corpus.len() as f32;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        // BTreeMap iteration order gives the sorted term -> column mapping.
        for (column, (term, df)) in document_frequency.into_iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let df = df as f32;
            idf.push(((1.0 + n) / (1.0 + df)).ln() + 1.0);
            #[allow(clippy::cast_possible_truncation)]
            vocabulary.insert(term, column as u32);
        }

        tracing::debug!(
            documents = corpus.len(),
            terms = idf.len(),
            "fitted TF-IDF vocabulary"
        );

        Ok(TfidfModel { vocabulary, idf })
    }
}

/// Fitted TF-IDF vocabulary and IDF weights.
#[derive(Debug, Clone)]
pub struct TfidfModel {
    vocabulary: HashMap<String, u32>,
    idf: Vec<f32>,
}

impl TfidfModel {
    /// IDF weight of `term` (already lowercased), if it is in the vocabulary.
    #[must_use]
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary
            .get(term)
            .map(|&column| self.idf[column as usize])
    }

    #[must_use]
    pub fn column(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }
}

impl VectorModel for TfidfModel {
    fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<u32, u32> = HashMap::new();
        for token in tokenize(text) {
            if let Some(&column) = self.vocabulary.get(&token) {
                *counts.entry(column).or_insert(0) += 1;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let pairs = counts
            .into_iter()
            .map(|(column, tf)| (column, tf as f32 * self.idf[column as usize]))
            .collect();
        let mut vector = SparseVector::from_pairs(pairs);
        vector.normalize();
        vector
    }

    fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }
}
