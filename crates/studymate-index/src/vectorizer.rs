//! The narrow numerical capability the retrieval index depends on.

use crate::error::Result;

/// Sparse vector over a fitted vocabulary: `(term_id, weight)` pairs sorted by
/// `term_id`, zero weights omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(u32, f32)>,
}

impl SparseVector {
    /// Build from arbitrary pairs. Duplicate term ids are summed and zero
    /// weights dropped.
    #[must_use]
    pub fn from_pairs(mut pairs: Vec<(u32, f32)>) -> Self {
        pairs.sort_unstable_by_key(|&(term, _)| term);
        let mut entries: Vec<(u32, f32)> = Vec::with_capacity(pairs.len());
        for (term, weight) in pairs {
            match entries.last_mut() {
                Some(last) if last.0 == term => last.1 += weight,
                _ => entries.push((term, weight)),
            }
        }
        entries.retain(|&(_, w)| w != 0.0);
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[(u32, f32)] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn dot(&self, other: &Self) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_term, a_weight) = self.entries[i];
            let (b_term, b_weight) = other.entries[j];
            match a_term.cmp(&b_term) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_weight * b_weight;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    #[must_use]
    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Scale to unit L2 length. The zero vector is left as is.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
    }

    /// Cosine of the angle between two vectors; `0.0` if either is zero.
    #[must_use]
    pub fn cosine(&self, other: &Self) -> f32 {
        let norm_a = self.norm();
        let norm_b = other.norm();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        self.dot(other) / (norm_a * norm_b)
    }
}

/// Learns a model from a corpus.
pub trait Vectorizer: Send + Sync {
    type Model: VectorModel;

    /// Fit vocabulary and weighting on `corpus`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexError::InsufficientData`] if `corpus` is empty.
    fn fit(&self, corpus: &[&str]) -> Result<Self::Model>;
}

/// A fitted model: maps text into its vector space and compares vectors.
pub trait VectorModel: Send + Sync {
    /// Project `text` into the fitted space. Unknown terms contribute nothing.
    fn transform(&self, text: &str) -> SparseVector;

    /// Similarity score between two vectors of this space.
    fn similarity(&self, a: &SparseVector, b: &SparseVector) -> f32 {
        a.cosine(b)
    }

    /// Number of terms in the fitted vocabulary.
    fn vocabulary_len(&self) -> usize;
}
