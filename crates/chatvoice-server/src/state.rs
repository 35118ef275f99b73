//! Application state management

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chatvoice_core::{ChatService, PlaybackSession, PlaybackStore, SpeechTranscriber};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use uuid::Uuid;

struct SessionEntry {
    session: Arc<Mutex<PlaybackSession>>,
    last_used: Instant,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub transcriber: Arc<dyn SpeechTranscriber>,
    pub store: PlaybackStore,
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
}

impl AppState {
    pub fn new(
        chat: ChatService,
        transcriber: Arc<dyn SpeechTranscriber>,
        store: PlaybackStore,
    ) -> Self {
        Self {
            chat: Arc::new(chat),
            transcriber,
            store,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The named session, created on first use. Marks it as used now.
    pub async fn session(&self, id: &str) -> Arc<Mutex<PlaybackSession>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.entry(id.to_string()).or_insert_with(|| {
            info!("Starting chat session {}", id);
            SessionEntry {
                session: Arc::new(Mutex::new(PlaybackSession::new(self.store.clone()))),
                last_used: Instant::now(),
            }
        });
        entry.last_used = Instant::now();
        entry.session.clone()
    }

    /// Drop the named session, releasing its playback handle once no
    /// in-flight request still holds it. Returns whether it existed.
    pub async fn end_session(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id);
        if removed.is_some() {
            info!("Ended chat session {}", id);
        }
        removed.is_some()
    }

    /// Revoke a playback handle and clear it from whichever session owns it
    pub async fn revoke_audio(&self, id: &Uuid) -> bool {
        let revoked = self.store.revoke(id);
        let sessions: Vec<_> = self
            .sessions
            .read()
            .await
            .values()
            .map(|entry| entry.session.clone())
            .collect();
        for session in sessions {
            let mut session = session.lock().await;
            if session.current().map(|h| h.id) == Some(*id) {
                session.clear();
            }
        }
        revoked
    }

    /// Tear down sessions unused for at least `max_idle`. Sessions held by
    /// an in-flight request are kept. Returns how many were removed.
    pub async fn reap_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep =
                Arc::strong_count(&entry.session) > 1 || entry.last_used.elapsed() < max_idle;
            if !keep {
                debug!("Reaping idle chat session {}", id);
            }
            keep
        });
        before - sessions.len()
    }

    /// Sweep for idle sessions every `sweep_every` in the background
    pub fn spawn_session_reaper(
        &self,
        sweep_every: Duration,
        max_idle: Duration,
    ) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let reaped = state.reap_idle(max_idle).await;
                if reaped > 0 {
                    info!("Released {} idle chat sessions", reaped);
                }
            }
        })
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
