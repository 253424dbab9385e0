use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use studymate_core::studymate_document::DocumentError;
use studymate_core::{Answer, ScoredChunk, SessionId, StudyError};

use crate::error::ApiError;
use crate::server::AppState;

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    sessions: usize,
}

#[derive(serde::Serialize)]
struct SessionCreated {
    session_id: SessionId,
}

#[derive(serde::Serialize)]
struct DocumentProcessed {
    summary: String,
    chunks: usize,
    generation: u64,
}

#[derive(serde::Deserialize)]
pub(crate) struct AskRequest {
    pub question: String,
}

#[derive(serde::Serialize)]
struct AskResponse {
    kind: &'static str,
    answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hits: Option<Vec<ScoredChunk>>,
}

impl From<Answer> for AskResponse {
    fn from(answer: Answer) -> Self {
        match answer {
            Answer::Title { line } => Self {
                kind: "title",
                answer: line,
                hits: None,
            },
            Answer::Passages { text, hits } => Self {
                kind: "passages",
                answer: text,
                hits: Some(hits),
            },
        }
    }
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
        sessions: state.sessions.len().await,
    })
}

pub(crate) async fn create_session_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = state.sessions.create().await?;
    Ok((StatusCode::CREATED, Json(SessionCreated { session_id })))
}

pub(crate) async fn delete_session_handler(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(id).await {
        tracing::debug!(session = %id, "session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StudyError::SessionNotFound(id).into())
    }
}

pub(crate) async fn document_handler(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.sessions.get(id).await?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| StudyError::from(DocumentError::UnsupportedFormat("missing content type".into())))?;

    let extracted = state
        .engine
        .extract_upload(content_type, &format!("upload:{id}"), body.to_vec())
        .await?;
    let processed = state.engine.process_shared(&session, extracted).await?;

    Ok(Json(DocumentProcessed {
        summary: processed.summary,
        chunks: processed.chunks,
        generation: processed.generation,
    }))
}

pub(crate) async fn ask_handler(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(request): Json<AskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.sessions.get(id).await?;
    let answer = state.engine.ask_shared(&session, &request.question).await?;
    Ok(Json(AskResponse::from(answer)))
}
