use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use studymate_core::StudyError;
use studymate_core::studymate_document::DocumentError;
use studymate_core::studymate_index::IndexError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to bind {0}: {1}")]
    Bind(String, std::io::Error),
    #[error("server error: {0}")]
    Server(String),
}

/// A [`StudyError`] rendered as `{"warning": ...}` with a matching status.
#[derive(Debug)]
pub(crate) struct ApiError(pub StudyError);

impl From<StudyError> for ApiError {
    fn from(e: StudyError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub(crate) fn status(&self) -> StatusCode {
        match &self.0 {
            StudyError::EmptyQuestion => StatusCode::BAD_REQUEST,
            StudyError::NotReady | StudyError::Index(IndexError::IndexNotReady) => {
                StatusCode::CONFLICT
            }
            StudyError::NoTitleFound | StudyError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            StudyError::TooManySessions(_) => StatusCode::SERVICE_UNAVAILABLE,
            StudyError::Document(DocumentError::EmptyDocument)
            | StudyError::Index(IndexError::InsufficientData) => StatusCode::UNPROCESSABLE_ENTITY,
            StudyError::Document(DocumentError::UnsupportedFormat(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            StudyError::Document(DocumentError::FileTooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            StudyError::Document(_) => StatusCode::BAD_REQUEST,
            StudyError::Aborted(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(serde::Serialize)]
struct WarningBody {
    warning: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("request failed: {}", self.0);
        } else {
            tracing::debug!(status = status.as_u16(), "request rejected: {}", self.0);
        }
        (
            status,
            Json(WarningBody {
                warning: self.0.user_message(),
            }),
        )
            .into_response()
    }
}
