//! Text-to-speech vendor client and chunked synthesis

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{error_body, http_client, Language};
use crate::config::{AssemblyConfig, SynthesisConfig};
use crate::error::{Error, Result};
use crate::text::{needs_chunking, split_text_into_chunks};

/// One synthesis request: text in, base64 audio payloads out
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn convert(&self, text: &str, language: Language) -> Result<Vec<String>>;
}

/// Payloads for a full text, in chunk order
#[derive(Debug, Clone, Default)]
pub struct SynthesisOutput {
    pub payloads: Vec<String>,
    pub chunks: usize,
}

/// Synthesize `text`, chunking it when it is too long for one request.
///
/// Short texts keep every payload the vendor returns. Chunked texts keep the
/// first payload of each response; chunks are requested one after another.
pub async fn synthesize_text(
    synthesizer: &dyn SpeechSynthesizer,
    text: &str,
    language: Language,
    config: &AssemblyConfig,
) -> Result<SynthesisOutput> {
    if !needs_chunking(text, config.single_request_threshold) {
        let payloads = synthesizer.convert(text, language).await?;
        return Ok(SynthesisOutput {
            payloads,
            chunks: 1,
        });
    }

    let chunks = split_text_into_chunks(text, config.max_chunk_size);
    info!("Synthesizing {} chunks", chunks.len());

    let mut payloads = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let mut audios = synthesizer.convert(chunk, language).await?;
        if audios.is_empty() {
            debug!("Chunk {} returned no audio", i);
            continue;
        }
        payloads.push(audios.swap_remove(0));
    }

    Ok(SynthesisOutput {
        payloads,
        chunks: chunks.len(),
    })
}

#[derive(Serialize)]
struct ConvertRequest<'a> {
    text: &'a str,
    model: &'a str,
    speaker: &'a str,
    target_language_code: &'a str,
    enable_preprocessing: bool,
}

#[derive(Deserialize)]
struct ConvertResponse {
    #[serde(default)]
    audios: Vec<String>,
    #[serde(default)]
    request_id: Option<String>,
}

/// Sarvam text-to-speech HTTP client
pub struct SarvamTts {
    client: reqwest::Client,
    config: SynthesisConfig,
}

impl SarvamTts {
    pub fn new(config: SynthesisConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.request_timeout_secs)?,
            config,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for SarvamTts {
    async fn convert(&self, text: &str, language: Language) -> Result<Vec<String>> {
        let body = ConvertRequest {
            text,
            model: &self.config.tts_model,
            speaker: &self.config.speaker,
            target_language_code: language.code(),
            enable_preprocessing: self.config.enable_preprocessing,
        };

        let response = self
            .client
            .post(&self.config.tts_url)
            .header("api-subscription-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Synthesis(error_body(response).await));
        }

        let parsed: ConvertResponse = response.json().await?;
        debug!(
            "TTS request {:?}: {} chars -> {} payloads",
            parsed.request_id,
            text.chars().count(),
            parsed.audios.len()
        );
        Ok(parsed.audios)
    }
}
