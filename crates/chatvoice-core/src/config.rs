//! Configuration types for the chatvoice engine

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level configuration, deserialized by the server from file + environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub assembly: AssemblyConfig,

    #[serde(default)]
    pub synthesis: SynthesisConfig,

    #[serde(default)]
    pub chat_backend: ChatBackendConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.assembly.validate()?;
        if self.synthesis.request_timeout_secs == 0 {
            return Err(Error::Config(
                "synthesis.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.server.session_idle_secs == 0 || self.server.session_sweep_secs == 0 {
            return Err(Error::Config(
                "server.session_idle_secs and server.session_sweep_secs must be greater than zero"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Speech assembly pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Maximum characters per synthesis request
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Texts shorter than this go out as a single synthesis request
    #[serde(default = "default_single_request_threshold")]
    pub single_request_threshold: usize,

    /// Declared sample rate multiplier applied before encoding
    #[serde(default = "default_slowdown_factor")]
    pub slowdown_factor: f64,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            single_request_threshold: default_single_request_threshold(),
            slowdown_factor: default_slowdown_factor(),
        }
    }
}

impl AssemblyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(Error::Config(
                "assembly.max_chunk_size must be greater than zero".to_string(),
            ));
        }
        if !self.slowdown_factor.is_finite() || self.slowdown_factor <= 0.0 {
            return Err(Error::Config(format!(
                "assembly.slowdown_factor must be a positive number, got {}",
                self.slowdown_factor
            )));
        }
        Ok(())
    }
}

fn default_max_chunk_size() -> usize {
    270
}

fn default_single_request_threshold() -> usize {
    270
}

fn default_slowdown_factor() -> f64 {
    0.9
}

/// Speech vendor (TTS/STT) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default = "default_tts_url")]
    pub tts_url: String,

    #[serde(default = "default_stt_url")]
    pub stt_url: String,

    /// Sent as the `api-subscription-key` header
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    #[serde(default = "default_stt_model")]
    pub stt_model: String,

    #[serde(default = "default_speaker")]
    pub speaker: String,

    #[serde(default = "default_enable_preprocessing")]
    pub enable_preprocessing: bool,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            tts_url: default_tts_url(),
            stt_url: default_stt_url(),
            api_key: String::new(),
            tts_model: default_tts_model(),
            stt_model: default_stt_model(),
            speaker: default_speaker(),
            enable_preprocessing: default_enable_preprocessing(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_tts_url() -> String {
    "https://api.sarvam.ai/text-to-speech".to_string()
}

fn default_stt_url() -> String {
    "https://api.sarvam.ai/speech-to-text".to_string()
}

fn default_tts_model() -> String {
    "bulbul:v2".to_string()
}

fn default_stt_model() -> String {
    "saarika:v2.5".to_string()
}

fn default_speaker() -> String {
    "manisha".to_string()
}

fn default_enable_preprocessing() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Retrieval/LLM chat backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatBackendConfig {
    #[serde(default = "default_chat_url")]
    pub url: String,
}

impl Default for ChatBackendConfig {
    fn default() -> Self {
        Self {
            url: default_chat_url(),
        }
    }
}

fn default_chat_url() -> String {
    "http://127.0.0.1:8031/chatjs/query".to_string()
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Prefix used when rendering playback handles as URLs
    #[serde(default)]
    pub public_base_url: String,

    /// Seconds a chat session may sit unused before it is torn down
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,

    /// Seconds between sweeps for idle sessions
    #[serde(default = "default_session_sweep_secs")]
    pub session_sweep_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: default_cors_enabled(),
            cors_origins: default_cors_origins(),
            public_base_url: String::new(),
            session_idle_secs: default_session_idle_secs(),
            session_sweep_secs: default_session_sweep_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_enabled() -> bool {
    true
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_session_idle_secs() -> u64 {
    1800
}

fn default_session_sweep_secs() -> u64 {
    60
}
