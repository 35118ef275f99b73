//! Clients for the external chat backend and speech vendor

mod chat;
mod stt;
mod tts;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use chat::{ChatBackend, RagChatClient};
pub use stt::{SarvamStt, SpeechTranscriber, NO_TRANSCRIPT};
pub use tts::{synthesize_text, SarvamTts, SpeechSynthesizer, SynthesisOutput};

/// Spoken language of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Kannada,
}

impl Language {
    /// BCP-47 code understood by the speech vendor
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en-IN",
            Language::Kannada => "kn-IN",
        }
    }
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Body of a non-2xx response, for error messages
async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) if !body.is_empty() => format!("status {}: {}", status, body),
        _ => format!("status {}", status),
    }
}
