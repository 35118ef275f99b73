//! Revocable playback handles for encoded audio
//!
//! [`PlaybackStore`] plays the role of a blob-URL registry: every synthesized
//! response is stored under a fresh id and served until revoked.
//! [`PlaybackSession`] owns the handle that is current for one chat session
//! and releases it when superseded or dropped.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::audio::EncodedAudioBlob;

/// Handle to one stored blob
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PlaybackHandle {
    pub id: Uuid,
    pub url: String,
}

impl fmt::Display for PlaybackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Shared registry of playable blobs
#[derive(Clone)]
pub struct PlaybackStore {
    inner: Arc<RwLock<HashMap<Uuid, EncodedAudioBlob>>>,
    base_url: Arc<str>,
}

impl PlaybackStore {
    /// Handles render as `{base_url}/v1/audio/{id}`
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            inner: Arc::default(),
            base_url: Arc::from(base_url.as_ref().trim_end_matches('/')),
        }
    }

    pub fn create(&self, blob: EncodedAudioBlob) -> PlaybackHandle {
        let id = Uuid::new_v4();
        let size = blob.len();
        self.write().insert(id, blob);
        debug!("Created playback handle {} ({} bytes)", id, size);
        PlaybackHandle {
            id,
            url: format!("{}/v1/audio/{}", self.base_url, id),
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<EncodedAudioBlob> {
        self.read().get(id).cloned()
    }

    /// Returns whether a blob was removed
    pub fn revoke(&self, id: &Uuid) -> bool {
        let removed = self.write().remove(id).is_some();
        if removed {
            debug!("Revoked playback handle {}", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Each write is a single insert/remove, so a poisoned map is still whole.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, EncodedAudioBlob>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, EncodedAudioBlob>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for PlaybackStore {
    fn default() -> Self {
        Self::new("")
    }
}

/// The playback handle currently owned by one chat session
pub struct PlaybackSession {
    store: PlaybackStore,
    current: Option<PlaybackHandle>,
}

impl PlaybackSession {
    pub fn new(store: PlaybackStore) -> Self {
        Self {
            store,
            current: None,
        }
    }

    pub fn store(&self) -> &PlaybackStore {
        &self.store
    }

    pub fn current(&self) -> Option<&PlaybackHandle> {
        self.current.as_ref()
    }

    /// Store `blob` and make it current, revoking the previous handle
    pub fn publish(&mut self, blob: EncodedAudioBlob) -> PlaybackHandle {
        let handle = self.store.create(blob);
        self.replace(Some(handle.clone()));
        handle
    }

    /// Set the current handle, revoking the one it supersedes
    pub fn replace(&mut self, handle: Option<PlaybackHandle>) {
        if let Some(old) = std::mem::replace(&mut self.current, handle) {
            if self.current.as_ref() != Some(&old) {
                self.store.revoke(&old.id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.replace(None);
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        if let Some(handle) = self.current.take() {
            info!("Releasing playback handle {} on session teardown", handle.id);
            self.store.revoke(&handle.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioFormat;

    fn blob(n: u8) -> EncodedAudioBlob {
        EncodedAudioBlob::raw(vec![n; 4], AudioFormat::Wav)
    }

    #[test]
    fn test_create_get_revoke() {
        let store = PlaybackStore::new("http://localhost:8080/");
        let handle = store.create(blob(1));
        assert_eq!(handle.url, format!("http://localhost:8080/v1/audio/{}", handle.id));
        assert_eq!(store.get(&handle.id).unwrap().data.as_ref(), &[1, 1, 1, 1]);
        assert!(store.revoke(&handle.id));
        assert!(!store.revoke(&handle.id));
        assert!(store.get(&handle.id).is_none());
    }

    #[test]
    fn test_publish_supersedes_previous_handle() {
        let store = PlaybackStore::new("");
        let mut session = PlaybackSession::new(store.clone());

        let first = session.publish(blob(1));
        let second = session.publish(blob(2));

        assert!(store.get(&first.id).is_none());
        assert!(store.get(&second.id).is_some());
        assert_eq!(session.current(), Some(&second));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear_releases_handle() {
        let store = PlaybackStore::new("");
        let mut session = PlaybackSession::new(store.clone());
        session.publish(blob(1));
        session.clear();
        assert!(session.current().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_drop_releases_handle() {
        let store = PlaybackStore::new("");
        {
            let mut session = PlaybackSession::new(store.clone());
            session.publish(blob(1));
            assert_eq!(store.len(), 1);
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_replace_with_same_handle_keeps_blob() {
        let store = PlaybackStore::new("");
        let mut session = PlaybackSession::new(store.clone());
        let handle = session.publish(blob(1));
        session.replace(Some(handle.clone()));
        assert!(store.get(&handle.id).is_some());
    }
}
