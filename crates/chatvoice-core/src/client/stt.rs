//! Speech-to-text vendor client

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use super::{error_body, http_client, Language};
use crate::config::SynthesisConfig;
use crate::error::{Error, Result};

/// Transcript used when the vendor answers without one
pub const NO_TRANSCRIPT: &str = "No transcript received";

/// Turns a recorded WAV clip into text
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    async fn transcribe(&self, wav: Vec<u8>, language: Language) -> Result<String>;
}

#[derive(Deserialize)]
struct TranscribeResponse {
    #[serde(default)]
    transcript: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    language_code: Option<String>,
}

impl TranscribeResponse {
    fn into_transcript(self) -> String {
        self.transcript
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TRANSCRIPT.to_string())
    }
}

/// Sarvam speech-to-text HTTP client
pub struct SarvamStt {
    client: reqwest::Client,
    config: SynthesisConfig,
}

impl SarvamStt {
    pub fn new(config: SynthesisConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.request_timeout_secs)?,
            config,
        })
    }
}

#[async_trait]
impl SpeechTranscriber for SarvamStt {
    async fn transcribe(&self, wav: Vec<u8>, language: Language) -> Result<String> {
        if wav.is_empty() {
            return Err(Error::Transcription("empty recording".to_string()));
        }

        let file = Part::bytes(wav)
            .file_name("recording.wav")
            .mime_str("audio/wav")?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.config.stt_model.clone())
            .text("language_code", language.code());

        let response = self
            .client
            .post(&self.config.stt_url)
            .header("api-subscription-key", &self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Transcription(error_body(response).await));
        }

        let parsed: TranscribeResponse = response.json().await?;
        debug!(
            "STT request {:?} ({:?})",
            parsed.request_id, parsed.language_code
        );
        Ok(parsed.into_transcript())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_extraction() {
        let parsed: TranscribeResponse =
            serde_json::from_str(r#"{"transcript": "hello", "request_id": "r1"}"#).unwrap();
        assert_eq!(parsed.into_transcript(), "hello");

        let parsed: TranscribeResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.into_transcript(), NO_TRANSCRIPT);

        let parsed: TranscribeResponse = serde_json::from_str(r#"{"transcript": ""}"#).unwrap();
        assert_eq!(parsed.into_transcript(), NO_TRANSCRIPT);
    }

    #[tokio::test]
    async fn test_empty_recording_is_rejected() {
        let stt = SarvamStt::new(SynthesisConfig::default()).unwrap();
        assert!(matches!(
            stt.transcribe(Vec::new(), Language::English).await,
            Err(Error::Transcription(_))
        ));
    }
}
