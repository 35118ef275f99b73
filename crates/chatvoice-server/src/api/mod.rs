//! HTTP API routes

mod audio;
mod chat;
mod speech;

use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Json, Router,
};
use chatvoice_core::ServerConfig;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use uuid::Uuid;

use crate::state::AppState;

pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/v1/chat", post(chat::chat))
        .route("/v1/tts", post(speech::synthesize))
        .route("/v1/tts/assemble", post(speech::assemble))
        .route("/v1/stt", post(speech::transcribe))
        .route(
            "/v1/audio/:id",
            get(audio::get_audio).delete(audio::revoke_audio),
        )
        .route("/v1/sessions/:id", delete(chat::end_session))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.cors_enabled {
        router.layer(cors_layer(&config.cors_origins))
    } else {
        router
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}

/// The caller's session, or a fresh one when it names none
fn session_id(requested: Option<String>) -> String {
    requested
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use base64::Engine;
    use chatvoice_core::audio::{AudioBuffer, AudioEncoder, WavEncoder};
    use chatvoice_core::{
        AssemblyConfig, ChatBackend, ChatService, Language, PlaybackStore, Result,
        SpeechSynthesizer, SpeechTranscriber,
    };
    use tower::ServiceExt;

    use super::*;

    fn payload(frames: usize) -> String {
        let buffer = AudioBuffer::new(22050, vec![vec![0.3; frames]]).unwrap();
        let blob = WavEncoder.encode(&buffer).unwrap();
        base64::engine::general_purpose::STANDARD.encode(&blob.data)
    }

    struct EchoBackend;

    #[async_trait]
    impl ChatBackend for EchoBackend {
        async fn query(&self, message: &str) -> Result<String> {
            Ok(format!("You said: {}.", message))
        }
    }

    struct ToneSynth;

    #[async_trait]
    impl SpeechSynthesizer for ToneSynth {
        async fn convert(&self, text: &str, _language: Language) -> Result<Vec<String>> {
            Ok(vec![payload(text.len())])
        }
    }

    struct FixedTranscriber;

    #[async_trait]
    impl SpeechTranscriber for FixedTranscriber {
        async fn transcribe(&self, _wav: Vec<u8>, language: Language) -> Result<String> {
            Ok(format!("heard in {}", language.code()))
        }
    }

    fn test_state() -> AppState {
        let chat = ChatService::new(
            Arc::new(EchoBackend),
            Arc::new(ToneSynth),
            AssemblyConfig::default(),
        )
        .unwrap();
        AppState::new(chat, Arc::new(FixedTranscriber), PlaybackStore::new(""))
    }

    fn app(state: AppState) -> Router {
        create_router(state, &ServerConfig::default())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(test_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_chat_with_audio_serves_wav() {
        let state = test_state();
        let response = app(state.clone())
            .oneshot(post_json("/v1/chat", json!({ "message": "hello" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["response"], "You said: hello.");
        assert!(Uuid::parse_str(body["session_id"].as_str().unwrap()).is_ok());
        let url = body["audio_url"].as_str().unwrap().to_string();
        assert!(url.starts_with("/v1/audio/"));

        let response = app(state)
            .oneshot(Request::get(&url).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "audio/wav");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
    }

    #[tokio::test]
    async fn test_anonymous_chats_keep_their_own_audio() {
        let state = test_state();
        let mut urls = Vec::new();
        let mut sessions = Vec::new();
        for message in ["first", "second"] {
            let response = app(state.clone())
                .oneshot(post_json("/v1/chat", json!({ "message": message })))
                .await
                .unwrap();
            let body = json_body(response).await;
            urls.push(body["audio_url"].as_str().unwrap().to_string());
            sessions.push(body["session_id"].as_str().unwrap().to_string());
        }
        assert_ne!(sessions[0], sessions[1]);

        for url in urls {
            let response = app(state.clone())
                .oneshot(Request::get(&url).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(state.store.len(), 2);
    }

    #[tokio::test]
    async fn test_idle_sessions_release_audio() {
        let state = test_state();
        for i in 0..10 {
            app(state.clone())
                .oneshot(post_json(
                    "/v1/chat",
                    json!({ "message": "hello", "session_id": format!("tab-{}", i) }),
                ))
                .await
                .unwrap();
        }
        assert_eq!(state.session_count().await, 10);
        assert_eq!(state.store.len(), 10);

        assert_eq!(state.reap_idle(std::time::Duration::ZERO).await, 10);
        assert_eq!(state.session_count().await, 0);
        assert!(state.store.is_empty());
    }

    #[tokio::test]
    async fn test_chat_without_audio() {
        let response = app(test_state())
            .oneshot(post_json(
                "/v1/chat",
                json!({ "message": "hi", "audio_enabled": false, "session_id": "s1" }),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["response"], "You said: hi.");
        assert!(body["audio_url"].is_null());
        assert_eq!(body["session_id"], "s1");
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected() {
        let response = app(test_state())
            .oneshot(post_json("/v1/chat", json!({ "message": "   " })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_assemble_and_revoke() {
        let state = test_state();
        let response = app(state.clone())
            .oneshot(post_json(
                "/v1/tts/assemble",
                json!({ "payloads": [payload(100), payload(50)] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let url = json_body(response).await["audio_url"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app(state.clone())
            .oneshot(Request::delete(&url).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json_body(response).await["revoked"], true);
        assert!(state.store.is_empty());

        let response = app(state)
            .oneshot(Request::get(&url).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_assemble_rejects_empty_payloads() {
        let response = app(test_state())
            .oneshot(post_json("/v1/tts/assemble", json!({ "payloads": [] })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ending_session_releases_audio() {
        let state = test_state();
        let response = app(state.clone())
            .oneshot(post_json(
                "/v1/tts",
                json!({ "text": "Read this aloud.", "session_id": "s2" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.store.len(), 1);
        assert_eq!(state.session_count().await, 1);

        let response = app(state.clone())
            .oneshot(Request::delete("/v1/sessions/s2").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json_body(response).await["ended"], true);
        assert!(state.store.is_empty());
        assert_eq!(state.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_transcribe() {
        let audio = base64::engine::general_purpose::STANDARD.encode(b"RIFF....WAVE");
        let response = app(test_state())
            .oneshot(post_json(
                "/v1/stt",
                json!({ "audio_base64": audio, "language": "kannada" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["transcript"], "heard in kn-IN");

        let response = app(test_state())
            .oneshot(post_json("/v1/stt", json!({ "audio_base64": "***" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
