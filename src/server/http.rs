//! HTTP handlers for the tutor API

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::{GenerationError, TutorError};
use crate::server::ServerState;
use crate::tutor::session::SessionMode;
use crate::tutor::Mode;

/// Mode selection request
#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: String,
}

/// Knowledge-check submission; missing fields count as empty text
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnswerRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SolutionRequest {
    pub solution: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReflectionRequest {
    pub reflection: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub mode: SessionMode,
}

#[derive(Debug, Serialize)]
pub struct ModeResponse {
    pub mode: SessionMode,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: Option<String>,
}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub generator_reachable: bool,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub knowledge_chunks: usize,
    pub scenarios: usize,
    pub active_sessions: usize,
}

/// Errors returned to API clients as `{"error", "details"}`
#[derive(Debug)]
pub enum ApiError {
    Tutor(TutorError),
    SessionNotFound(Uuid),
}

impl From<TutorError> for ApiError {
    fn from(err: TutorError) -> Self {
        ApiError::Tutor(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            ApiError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "Session not found".to_string(),
                id.to_string(),
            ),
            ApiError::Tutor(err) => {
                let status = match err {
                    TutorError::Load { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                    TutorError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    TutorError::Generation(GenerationError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
                    TutorError::Generation(_) => StatusCode::BAD_GATEWAY,
                    TutorError::ModeMismatch { .. } => StatusCode::CONFLICT,
                    TutorError::UnknownMode(_) => StatusCode::BAD_REQUEST,
                };
                (status, err.user_message(), err.to_string())
            }
        };

        if status.is_server_error() {
            tracing::warn!("Request failed ({}): {}", status, details);
        }

        (status, Json(json!({ "error": error, "details": details }))).into_response()
    }
}

/// Status handler
pub async fn status_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let generator = state.tutor.generator();
    let response = StatusResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: generator.backend_name().to_string(),
        generator_reachable: generator.health().await.is_ok(),
        max_new_tokens: generator.params().max_new_tokens,
        temperature: generator.params().temperature,
        knowledge_chunks: state.tutor.knowledge().len(),
        scenarios: state.tutor.scenarios().len(),
        active_sessions: state.sessions.len().await,
    };

    (StatusCode::OK, Json(response))
}

/// Start a session in the unset mode
pub async fn create_session_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let session_id = state.sessions.create(state.tutor.clone()).await;
    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id,
            mode: SessionMode::Unset,
        }),
    )
}

pub async fn end_session_handler(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound(id))
    }
}

pub async fn select_mode_handler(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ModeRequest>,
) -> Result<Json<ModeResponse>, ApiError> {
    let session = state.sessions.get(id).await.ok_or(ApiError::SessionNotFound(id))?;
    let mode: Mode = req.mode.parse()?;
    let mut session = session.lock().await;

    let scenario = session.select_mode(mode)?.map(|s| s.scenario.clone());
    Ok(Json(ModeResponse {
        mode: session.mode(),
        label: mode.label().to_string(),
        scenario,
    }))
}

pub async fn answer_handler(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let session = state.sessions.get(id).await.ok_or(ApiError::SessionNotFound(id))?;
    let mut session = session.lock().await;

    let feedback = session.submit_answer(&req.question, &req.answer).await?;
    Ok(Json(FeedbackResponse { feedback }))
}

pub async fn solution_handler(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SolutionRequest>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let session = state.sessions.get(id).await.ok_or(ApiError::SessionNotFound(id))?;
    let session = session.lock().await;

    let feedback = session.evaluate_solution(&req.solution).await?;
    Ok(Json(FeedbackResponse { feedback }))
}

pub async fn reflection_handler(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReflectionRequest>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let session = state.sessions.get(id).await.ok_or(ApiError::SessionNotFound(id))?;
    let session = session.lock().await;

    let summary = session.summarize_reflection(&req.reflection).await?;
    Ok(Json(SummaryResponse { summary }))
}
