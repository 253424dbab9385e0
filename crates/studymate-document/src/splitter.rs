use super::types::{Chunk, Document};

/// Characters per chunk when nothing else is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct SplitterConfig {
    /// Maximum chunk length in characters. Zero is treated as one.
    pub chunk_size: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Fixed-length, non-overlapping character chunker.
#[derive(Debug, Clone, Default)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    #[must_use]
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size.max(1)
    }

    #[must_use]
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        self.split_text(&document.content)
    }

    /// Slice `text` into consecutive chunks of `chunk_size` characters; the
    /// last one may be shorter. Concatenating the chunks yields `text`.
    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<Chunk> {
        split_chars(text, self.chunk_size())
            .into_iter()
            .enumerate()
            .map(|(i, content)| Chunk {
                content: content.to_owned(),
                chunk_index: i,
            })
            .collect()
    }
}

fn split_chars(text: &str, chunk_size: usize) -> Vec<&str> {
    let mut chunks = Vec::with_capacity(text.len() / chunk_size + 1);
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in text.char_indices() {
        if count == chunk_size {
            chunks.push(&text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentMetadata;

    fn make_doc(content: &str) -> Document {
        Document {
            content: content.to_owned(),
            metadata: DocumentMetadata {
                source: "test".to_owned(),
                content_type: "text/plain".to_owned(),
                page_count: 1,
            },
        }
    }

    fn splitter(chunk_size: usize) -> TextSplitter {
        TextSplitter::new(SplitterConfig { chunk_size })
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(TextSplitter::default().split_text("").is_empty());
    }

    #[test]
    fn document_shorter_than_chunk_size() {
        let chunks = TextSplitter::default().split(&make_doc("Short text."));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Short text.");
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[test]
    fn two_hundred_fifty_chars_make_three_chunks() {
        let text = "x".repeat(250);
        let chunks = splitter(100).split_text(&text);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content.len(), 100);
        assert_eq!(chunks[1].content.len(), 100);
        assert_eq!(chunks[2].content.len(), 50);
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_chunk() {
        let chunks = splitter(5).split_text("abcdefghij");
        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["abcde", "fghij"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let chunks = splitter(2).split_text("héllo wörld");
        assert_eq!(chunks[0].content, "hé");
        assert_eq!(chunks[1].content, "ll");
        assert_eq!(chunks.last().unwrap().content, "d");
    }

    #[test]
    fn zero_chunk_size_treated_as_one() {
        let chunks = splitter(0).split_text("abc");
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn chunks_may_span_lines() {
        let chunks = splitter(4).split_text("ab\ncd");
        assert_eq!(chunks[0].content, "ab\nc");
        assert_eq!(chunks[1].content, "d");
    }

    mod proptest_splitter {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(500))]

            #[test]
            fn split_never_panics(
                content in "\\PC{0,2000}",
                chunk_size in 0usize..300,
            ) {
                let _ = splitter(chunk_size).split_text(&content);
            }

            #[test]
            fn chunks_reassemble_exactly(
                content in "\\PC{1,1000}",
                chunk_size in 1usize..200,
            ) {
                let chunks = splitter(chunk_size).split_text(&content);
                let joined: String = chunks.iter().map(|c| c.content.as_str()).collect();
                prop_assert_eq!(joined, content);
            }

            #[test]
            fn chunk_count_is_ceiling(
                content in "\\PC{1,1000}",
                chunk_size in 1usize..200,
            ) {
                let chars = content.chars().count();
                let chunks = splitter(chunk_size).split_text(&content);
                prop_assert_eq!(chunks.len(), chars.div_ceil(chunk_size));
                for chunk in &chunks {
                    prop_assert!(chunk.content.chars().count() <= chunk_size);
                    prop_assert!(!chunk.content.is_empty());
                }
            }

            #[test]
            fn chunk_indices_sequential(
                content in "[a-z. ]{10,1000}",
                chunk_size in 1usize..100,
            ) {
                let chunks = splitter(chunk_size).split_text(&content);
                for (i, chunk) in chunks.iter().enumerate() {
                    prop_assert_eq!(chunk.chunk_index, i);
                }
            }
        }
    }
}
