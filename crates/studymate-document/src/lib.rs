//! Document loading, text normalization, and fixed-length chunking.

pub mod error;
pub mod loader;
pub mod normalizer;
pub mod splitter;
pub mod types;

pub use error::DocumentError;
pub use loader::{TextLoader, loader_for_path};
pub use normalizer::{normalize, normalize_pages};
pub use splitter::{DEFAULT_CHUNK_SIZE, SplitterConfig, TextSplitter};
pub use types::{Chunk, Document, DocumentMetadata, ExtractedDocument};

#[cfg(feature = "pdf")]
pub use loader::PdfLoader;

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

pub trait DocumentLoader: Send + Sync {
    fn load(
        &self,
        path: &std::path::Path,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<ExtractedDocument, DocumentError>> + Send + '_>,
    >;

    fn supported_extensions(&self) -> &[&str];
}
