//! The ask endpoint: one uploaded question, one persona answer

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;

use crate::pipeline::{AudioUpload, Stage};
use crate::Error;

use super::{ApiState, SESSION_HEADER};

/// Slack for multipart framing on top of the upload limit
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Build the ask router
pub fn router(state: Arc<ApiState>) -> Router {
    // The body limit only guards the transport; the pipeline enforces the
    // configured upload limit with a typed error.
    let body_limit = usize::try_from(state.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/ask", post(ask))
        .route("/questions", get(questions))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Response for a processed question
#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// Session the exchange was recorded under
    pub session: String,

    /// Transcribed question
    pub question: String,

    /// Generated answer
    pub answer: String,

    /// Duration of the question audio in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_secs: Option<f32>,

    /// Duration of the spoken answer in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_secs: Option<f32>,

    /// Spoken answer as base64 MP3; absent when synthesis failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,

    /// Non-fatal problems encountered while processing
    pub warnings: Vec<String>,
}

/// Sample questions response
#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<String>,
}

/// List interview questions the persona is prepared for
async fn questions(State(state): State<Arc<ApiState>>) -> Json<QuestionsResponse> {
    Json(QuestionsResponse {
        questions: state.sample_questions.clone(),
    })
}

/// Process one uploaded audio question
async fn ask(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, AskError> {
    let session_id = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    let session = state.sessions.get_or_create(session_id).await;

    // Holding the log for the whole invocation serializes uploads per session
    let mut log = session.log.lock().await;

    let upload = read_upload(&mut multipart).await?;
    tracing::info!(
        session = %session.id,
        file = %upload.file_name,
        bytes = upload.bytes.len(),
        "processing question"
    );

    let exchange = state.pipeline.ask(upload).await?;

    tracing::debug!(stage = %Stage::Record, session = %session.id, "recording exchange");
    log.append(exchange.question.clone(), exchange.answer.clone());

    let body = AskResponse {
        session: session.id.clone(),
        question: exchange.question,
        answer: exchange.answer,
        question_secs: exchange.question_secs,
        answer_secs: exchange.speech.as_ref().and_then(|s| s.secs),
        audio: exchange.speech.map(|s| BASE64.encode(s.audio)),
        warnings: exchange.warnings,
    };

    Ok((
        AppendHeaders([(SESSION_HEADER, session.id.clone())]),
        Json(body),
    )
        .into_response())
}

/// Pull the audio file out of the multipart form
async fn read_upload(multipart: &mut Multipart) -> Result<AudioUpload, AskError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AskError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .ok_or_else(|| AskError::BadRequest("file part has no filename".to_string()))?
            .to_string();

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AskError::BadRequest(format!("failed to read upload: {e}")))?;

        if bytes.is_empty() {
            return Err(AskError::BadRequest("empty audio data".to_string()));
        }

        return Ok(AudioUpload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Err(AskError::BadRequest("missing \"file\" part".to_string()))
}

/// Ask endpoint errors
#[derive(Debug)]
pub enum AskError {
    BadRequest(String),
    Pipeline(Error),
}

impl From<Error> for AskError {
    fn from(err: Error) -> Self {
        Self::Pipeline(err)
    }
}

impl AskError {
    /// HTTP status and machine-readable code for this error
    #[must_use]
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::Pipeline(err) => match err {
                Error::SizeExceeded { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "size_exceeded"),
                Error::UnsupportedFormat(_) => {
                    (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_format")
                }
                Error::NoSpeech => (StatusCode::UNPROCESSABLE_ENTITY, "no_speech_detected"),
                Error::Transcode(_) => (StatusCode::BAD_GATEWAY, "transcode_error"),
                Error::Stt(_) => (StatusCode::BAD_GATEWAY, "transcription_error"),
                Error::Generation(_) => (StatusCode::BAD_GATEWAY, "generation_error"),
                Error::Synthesis(_) => (StatusCode::BAD_GATEWAY, "synthesis_error"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            },
        }
    }
}

impl IntoResponse for AskError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code) = self.status_and_code();
        let message = match self {
            Self::BadRequest(msg) => msg,
            Self::Pipeline(err) => err.to_string(),
        };

        tracing::warn!(code, message = %message, "ask request failed");

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}
