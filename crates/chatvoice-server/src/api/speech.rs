//! Speech endpoints: synthesis, payload assembly and transcription

use axum::{extract::State, Json};
use base64::Engine;
use chatvoice_core::Language;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::session_id;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Deserialize)]
pub struct AssembleRequest {
    pub payloads: Vec<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AudioResponse {
    pub audio_url: Option<String>,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TranscribeRequest {
    pub audio_base64: String,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcript: String,
}

/// Synthesize text through the vendor and publish the assembled audio
pub async fn synthesize(
    State(state): State<AppState>,
    Json(req): Json<SynthesizeRequest>,
) -> Result<Json<AudioResponse>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::bad_request("text must not be empty"));
    }

    let session_id = session_id(req.session_id);
    let session = state.session(&session_id).await;
    let mut session = session.lock().await;
    let handle = state
        .chat
        .speak(&req.text, req.language, &mut session)
        .await?;

    Ok(Json(AudioResponse {
        audio_url: handle.map(|h| h.url),
        session_id,
    }))
}

/// Assemble caller-supplied base64 payloads into one playable file
pub async fn assemble(
    State(state): State<AppState>,
    Json(req): Json<AssembleRequest>,
) -> Result<Json<AudioResponse>, ApiError> {
    if req.payloads.is_empty() {
        return Err(ApiError::bad_request("payloads must not be empty"));
    }

    let session_id = session_id(req.session_id);
    info!(
        "Assembling {} payloads on session {}",
        req.payloads.len(),
        session_id
    );
    let session = state.session(&session_id).await;
    let mut session = session.lock().await;
    let handle = state
        .chat
        .assembler()
        .play(req.payloads, true, &mut session)
        .await;

    Ok(Json(AudioResponse {
        audio_url: handle.map(|h| h.url),
        session_id,
    }))
}

/// Transcribe a base64-encoded WAV recording
pub async fn transcribe(
    State(state): State<AppState>,
    Json(req): Json<TranscribeRequest>,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let audio = base64::engine::general_purpose::STANDARD
        .decode(req.audio_base64.trim())
        .map_err(|e| ApiError::bad_request(format!("invalid audio_base64: {}", e)))?;
    if audio.is_empty() {
        return Err(ApiError::bad_request("recording is empty"));
    }

    let transcript = state.transcriber.transcribe(audio, req.language).await?;
    Ok(Json(TranscribeResponse { transcript }))
}
