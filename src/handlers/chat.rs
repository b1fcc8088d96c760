use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::services::dialogue;
use crate::state::AppState;

fn default_session_id() -> String {
    "default".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default = "default_session_id")]
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub replies: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    #[serde(default = "default_session_id")]
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub response: String,
}

/// One dialogue turn. The per-session mutex serializes concurrent turns for
/// the same session id.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let session = state.session(&req.session_id);
    let mut session = session.lock().await;
    let replies = dialogue::process_message(&state, &mut session, &req.message).await;
    Ok(Json(ChatResponse { replies }))
}

pub async fn reset(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Json<SessionResponse> {
    let session = state.session(&req.session_id);
    let mut session = session.lock().await;
    let response = dialogue::reset(&mut session);
    Json(SessionResponse { response })
}

pub async fn greeting(
    State(state): State<Arc<AppState>>,
    Query(req): Query<SessionRequest>,
) -> Json<SessionResponse> {
    let session = state.session(&req.session_id);
    let mut session = session.lock().await;
    let response = dialogue::initial_greeting(&mut session);
    Json(SessionResponse { response })
}
