//! Chat endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chatvoice_core::Language;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::session_id;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default = "default_audio_enabled")]
    pub audio_enabled: bool,
    #[serde(default)]
    pub language: Language,
}

fn default_audio_enabled() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub audio_url: Option<String>,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    pub session_id: String,
    pub ended: bool,
}

/// Answer one message; the text is returned even when audio fails
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }

    let session_id = session_id(req.session_id);
    info!(
        "Chat request on session {} (audio: {}, language: {:?})",
        session_id, req.audio_enabled, req.language
    );

    let session = state.session(&session_id).await;
    let mut session = session.lock().await;
    let reply = state
        .chat
        .generate_response(message, req.audio_enabled, req.language, &mut session)
        .await;

    Ok(Json(ChatResponse {
        response: reply.text,
        audio_url: reply.audio.map(|h| h.url),
        session_id,
    }))
}

/// Tear down a session, releasing its current audio
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<EndSessionResponse> {
    let ended = state.end_session(&id).await;
    Json(EndSessionResponse {
        session_id: id,
        ended,
    })
}
