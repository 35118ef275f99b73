//! Speech synthesis assembly: payloads in, playable handle out

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::audio::{
    decode_and_concatenate, decode_base64, AudioDecoder, AudioEncoder, AudioFormat,
    AutoDecoder, EncodedAudioBlob, WavEncoder,
};
use crate::config::AssemblyConfig;
use crate::error::{Error, Result};
use crate::playback::{PlaybackHandle, PlaybackSession};

/// Turns synthesized payloads into one playable blob
#[derive(Clone)]
pub struct SpeechAssembler {
    decoder: Arc<dyn AudioDecoder>,
    encoder: Arc<dyn AudioEncoder>,
    slowdown_factor: f64,
}

impl SpeechAssembler {
    /// Assembler using [`AutoDecoder`] and [`WavEncoder`]
    pub fn new(config: &AssemblyConfig) -> Result<Self> {
        Self::with_codecs(
            Arc::new(AutoDecoder),
            Arc::new(WavEncoder),
            config.slowdown_factor,
        )
    }

    pub fn with_codecs(
        decoder: Arc<dyn AudioDecoder>,
        encoder: Arc<dyn AudioEncoder>,
        slowdown_factor: f64,
    ) -> Result<Self> {
        if !slowdown_factor.is_finite() || slowdown_factor <= 0.0 {
            return Err(Error::Config(format!(
                "slowdown factor must be a positive number, got {}",
                slowdown_factor
            )));
        }
        Ok(Self {
            decoder,
            encoder,
            slowdown_factor,
        })
    }

    pub fn slowdown_factor(&self) -> f64 {
        self.slowdown_factor
    }

    /// Decode, concatenate, slow down and encode all payloads
    pub fn assemble<S: AsRef<str>>(&self, payloads: &[S]) -> Result<EncodedAudioBlob> {
        let joined = decode_and_concatenate(payloads, self.decoder.as_ref())?;
        let slowed = joined.slowed_down(self.slowdown_factor)?;
        debug!(
            "Slowed {} Hz to {} Hz ({} frames)",
            joined.sample_rate(),
            slowed.sample_rate(),
            slowed.frames()
        );
        self.encoder.encode(&slowed)
    }

    /// The first payload's raw bytes, served as-is without decoding
    pub fn fallback<S: AsRef<str>>(&self, payloads: &[S]) -> Result<EncodedAudioBlob> {
        let first = payloads
            .first()
            .map(|p| p.as_ref())
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| Error::Decode("no payload to fall back to".to_string()))?;
        let bytes = decode_base64(first)?;
        if bytes.is_empty() {
            return Err(Error::Decode("fallback payload is empty".to_string()));
        }
        Ok(EncodedAudioBlob::raw(bytes, AudioFormat::Wav))
    }

    /// [`assemble`](Self::assemble), degrading to [`fallback`](Self::fallback).
    ///
    /// Returns `None` when both fail; errors are logged, not returned.
    pub fn assemble_or_fallback<S: AsRef<str>>(&self, payloads: &[S]) -> Option<EncodedAudioBlob> {
        match self.assemble(payloads) {
            Ok(blob) => Some(blob),
            Err(e) => {
                warn!("Audio assembly failed, falling back to first payload: {}", e);
                match self.fallback(payloads) {
                    Ok(blob) => Some(blob),
                    Err(e) => {
                        error!("Fallback audio failed: {}", e);
                        None
                    }
                }
            }
        }
    }

    /// Assemble `payloads` and publish the result as the session's current handle.
    ///
    /// With audio disabled or no payloads, the session's handle is cleared
    /// and nothing runs.
    pub async fn play(
        &self,
        payloads: Vec<String>,
        audio_enabled: bool,
        session: &mut PlaybackSession,
    ) -> Option<PlaybackHandle> {
        if !audio_enabled || payloads.is_empty() {
            session.clear();
            return None;
        }

        let assembler = self.clone();
        let count = payloads.len();
        let blob = tokio::task::spawn_blocking(move || assembler.assemble_or_fallback(&payloads))
            .await
            .unwrap_or_else(|e| {
                error!("Audio assembly task failed: {}", e);
                None
            });

        match blob {
            Some(blob) => {
                let handle = session.publish(blob);
                info!("Assembled {} payloads into {}", count, handle.url);
                Some(handle)
            }
            None => {
                session.clear();
                None
            }
        }
    }
}
