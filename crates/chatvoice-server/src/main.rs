//! chatvoice server - HTTP API for the chat widget's spoken replies

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod error;
mod settings;
mod state;

use chatvoice_core::client::{RagChatClient, SarvamStt, SarvamTts};
use chatvoice_core::{ChatService, PlaybackStore};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "chatvoice_server=debug,chatvoice_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting chatvoice server");

    // Load configuration
    let config = settings::load_config()?;
    info!(
        "Chunk size {} chars, slowdown factor {}",
        config.assembly.max_chunk_size, config.assembly.slowdown_factor
    );
    if config.synthesis.api_key.is_empty() {
        tracing::warn!("No speech vendor API key configured; synthesis requests will fail");
    }

    // Wire up backend, vendor clients and playback store
    let backend = RagChatClient::new(&config.chat_backend, config.synthesis.request_timeout_secs)?;
    let tts = SarvamTts::new(config.synthesis.clone())?;
    let stt = SarvamStt::new(config.synthesis.clone())?;
    let chat = ChatService::new(Arc::new(backend), Arc::new(tts), config.assembly.clone())?;
    let store = PlaybackStore::new(&config.server.public_base_url);
    let state = AppState::new(chat, Arc::new(stt), store);
    state.spawn_session_reaper(
        Duration::from_secs(config.server.session_sweep_secs),
        Duration::from_secs(config.server.session_idle_secs),
    );

    // Build router
    let app = api::create_router(state, &config.server);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
