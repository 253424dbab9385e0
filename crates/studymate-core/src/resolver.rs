//! Answer a question against a session snapshot.

use serde::Serialize;
use studymate_index::{IndexError, ScoredChunk};

use crate::error::StudyError;
use crate::session::LoadedDocument;

pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    /// First non-blank line of the document.
    Title { line: String },
    /// Best-matching chunks joined in rank order.
    Passages { text: String, hits: Vec<ScoredChunk> },
}

impl Answer {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Title { line } => line,
            Self::Passages { text, .. } => text,
        }
    }
}

/// Whether `question` takes the title path.
#[must_use]
pub fn asks_for_title(question: &str) -> bool {
    question.to_lowercase().contains("title")
}

/// First line of `text` that is non-blank after trimming, trimmed.
#[must_use]
pub fn find_title(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

#[derive(Debug, Clone, Copy)]
pub struct QueryResolver {
    top_k: usize,
}

impl Default for QueryResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

impl QueryResolver {
    #[must_use]
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k: top_k.max(1),
        }
    }

    #[must_use]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// # Errors
    ///
    /// `EmptyQuestion` for a blank question (checked first), `NotReady` when
    /// nothing is loaded, `NoTitleFound` when the title path finds no line.
    pub fn resolve(
        &self,
        loaded: Option<&LoadedDocument>,
        question: &str,
    ) -> Result<Answer, StudyError> {
        if question.trim().is_empty() {
            return Err(StudyError::EmptyQuestion);
        }
        let loaded = loaded.ok_or(StudyError::NotReady)?;

        if asks_for_title(question) {
            tracing::debug!(generation = loaded.generation(), "title path");
            let line = find_title(&loaded.document().content).ok_or(StudyError::NoTitleFound)?;
            return Ok(Answer::Title { line: line.to_owned() });
        }

        let hits = loaded
            .index()
            .top_k(question, self.top_k)
            .map_err(|e| match e {
                IndexError::IndexNotReady => StudyError::NotReady,
                other => StudyError::Index(other),
            })?;
        tracing::debug!(
            generation = loaded.generation(),
            hits = ?hits.iter().map(|h| (h.chunk_index, h.score)).collect::<Vec<_>>(),
            "similarity path"
        );

        let text = hits
            .iter()
            .filter_map(|hit| loaded.chunks().get(hit.chunk_index))
            .map(|chunk| chunk.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(Answer::Passages { text, hits })
    }
}

#[cfg(test)]
mod tests {
    use studymate_document::{Chunk, Document, DocumentMetadata};
    use studymate_index::RetrievalIndex;

    use super::*;

    fn loaded(content: &str, chunks: &[&str]) -> LoadedDocument {
        let document = Document {
            content: content.into(),
            metadata: DocumentMetadata {
                source: "notes.txt".into(),
                content_type: "text/plain".into(),
                page_count: 1,
            },
        };
        let chunks: Vec<Chunk> = chunks
            .iter()
            .enumerate()
            .map(|(chunk_index, c)| Chunk {
                content: (*c).to_owned(),
                chunk_index,
            })
            .collect();
        let mut index = RetrievalIndex::tfidf();
        index.build(&chunks).unwrap();
        LoadedDocument::new(document, chunks, index, String::new())
    }

    #[test]
    fn blank_question_is_checked_before_readiness() {
        let resolver = QueryResolver::default();
        assert!(matches!(
            resolver.resolve(None, "   \t"),
            Err(StudyError::EmptyQuestion)
        ));
        assert!(matches!(
            resolver.resolve(None, "what?"),
            Err(StudyError::NotReady)
        ));
    }

    #[test]
    fn title_question_returns_first_non_blank_line() {
        let doc = loaded("Operating Systems\nChapter 1", &["Operating Systems", "Chapter 1"]);
        let resolver = QueryResolver::default();
        for question in ["What is the title?", "TITLE", "subtitle please"] {
            let answer = resolver.resolve(Some(&doc), question).unwrap();
            assert_eq!(answer, Answer::Title { line: "Operating Systems".into() });
        }
    }

    #[test]
    fn title_without_any_line_is_no_title_found() {
        let doc = loaded("   \n\t", &["x"]);
        let err = QueryResolver::default()
            .resolve(Some(&doc), "title")
            .unwrap_err();
        assert!(matches!(err, StudyError::NoTitleFound));
    }

    #[test]
    fn passages_joined_in_rank_order() {
        let doc = loaded("", &["alpha beta", "gamma delta", "alpha gamma"]);
        let answer = QueryResolver::default().resolve(Some(&doc), "alpha").unwrap();
        let Answer::Passages { text, hits } = answer else {
            panic!("expected passages");
        };
        assert_eq!(text, "alpha gamma alpha beta gamma delta");
        assert_eq!(hits.iter().map(|h| h.chunk_index).collect::<Vec<_>>(), vec![2, 0, 1]);
    }

    #[test]
    fn fewer_chunks_than_k_returns_all() {
        let doc = loaded("", &["first part", "second part"]);
        let answer = QueryResolver::new(3).resolve(Some(&doc), "second").unwrap();
        assert_eq!(answer.text(), "second part first part");
    }

    #[test]
    fn top_k_limits_passages() {
        let doc = loaded("", &["one", "two", "three", "four"]);
        let answer = QueryResolver::new(2).resolve(Some(&doc), "four").unwrap();
        let Answer::Passages { hits, .. } = answer else {
            panic!("expected passages");
        };
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk_index, 3);
    }

    #[test]
    fn find_title_trims() {
        assert_eq!(find_title("\n   \n  Heading  \nbody"), Some("Heading"));
        assert_eq!(find_title(""), None);
    }
}
