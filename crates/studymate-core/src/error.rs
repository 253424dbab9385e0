use studymate_document::DocumentError;
use studymate_index::IndexError;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StudyError {
    #[error("question is empty")]
    EmptyQuestion,

    #[error("no document has been processed")]
    NotReady,

    #[error("document has no non-blank line")]
    NoTitleFound,

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("session limit reached ({0})")]
    TooManySessions(usize),

    #[error("document processing aborted: {0}")]
    Aborted(String),
}

impl StudyError {
    /// Warning text shown to the person using the app.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyQuestion => "Please enter a question.".into(),
            Self::NotReady | Self::Index(IndexError::IndexNotReady) => {
                "Please upload and process a PDF first.".into()
            }
            Self::NoTitleFound => "No title line found in the document.".into(),
            Self::Document(DocumentError::EmptyDocument) => "PDF has no extractable text.".into(),
            Self::Document(DocumentError::UnsupportedFormat(what)) => {
                format!("Unsupported document format: {what}")
            }
            Self::Document(DocumentError::FileTooLarge(size)) => {
                format!("Document is too large ({size} bytes).")
            }
            Self::Document(e) => format!("Could not read the document: {e}"),
            Self::Index(IndexError::InsufficientData) => "PDF has no extractable text.".into(),
            Self::SessionNotFound(_) => "Session not found.".into(),
            Self::TooManySessions(_) => "Too many active sessions, try again later.".into(),
            Self::Aborted(_) => "Could not process the document.".into(),
        }
    }

    #[must_use]
    pub fn is_empty_document(&self) -> bool {
        matches!(
            self,
            Self::Document(DocumentError::EmptyDocument) | Self::Index(IndexError::InsufficientData)
        )
    }
}
