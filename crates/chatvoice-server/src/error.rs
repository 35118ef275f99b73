//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "code": self.status.as_u16()
            }
        }));
        (self.status, body).into_response()
    }
}

impl From<chatvoice_core::Error> for ApiError {
    fn from(err: chatvoice_core::Error) -> Self {
        use chatvoice_core::Error;
        match &err {
            Error::Config(_) | Error::Decode(_) | Error::Base64(_) | Error::FormatMismatch { .. } => {
                ApiError::bad_request(err.to_string())
            }
            Error::Backend(_) | Error::Synthesis(_) | Error::Transcription(_) | Error::Http(_) => {
                ApiError::bad_gateway(err.to_string())
            }
            _ => ApiError::internal(err.to_string()),
        }
    }
}
