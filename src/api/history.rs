//! Session history endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Response},
    routing::get,
};

use crate::history::{DOWNLOAD_FILE_NAME, HistoryEntry};

use super::{ApiState, SESSION_HEADER};

/// Build the history router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(list))
        .route("/download", get(download))
        .with_state(state)
}

fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// List the session's exchanges in insertion order
async fn list(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let session = state.sessions.get_or_create(session_id(&headers)).await;
    let entries: Vec<HistoryEntry> = session.log.lock().await.entries().to_vec();

    (
        AppendHeaders([(SESSION_HEADER, session.id.clone())]),
        Json(entries),
    )
}

/// Download the full session history as an attached JSON document
async fn download(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let session = state.sessions.get_or_create(session_id(&headers)).await;
    let json = session
        .log
        .lock()
        .await
        .to_json()
        .map_err(|e| {
            tracing::error!(error = %e, "failed to serialize history");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
            ),
        ],
        json,
    )
        .into_response())
}
