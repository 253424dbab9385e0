//! Error types for studymate-index.

/// Errors raised while building or querying a retrieval index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// `build` was given no chunks to fit on.
    #[error("cannot build an index from zero chunks")]
    InsufficientData,

    /// `query` was called before a successful `build`.
    #[error("index has not been built")]
    IndexNotReady,
}

/// Result type alias using `IndexError`.
pub type Result<T> = std::result::Result<T, IndexError>;
