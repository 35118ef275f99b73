//! Playback handle endpoints

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    pub id: Uuid,
    pub revoked: bool,
}

/// Serve the blob behind a playback handle
pub async fn get_audio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let blob = state
        .store
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("audio {} not found", id)))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, blob.content_type.to_string()),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        Body::from(blob.data),
    )
        .into_response())
}

/// Revoke a playback handle, clearing it from its session
pub async fn revoke_audio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Json<RevokeResponse> {
    let revoked = state.revoke_audio(&id).await;
    Json(RevokeResponse { id, revoked })
}
