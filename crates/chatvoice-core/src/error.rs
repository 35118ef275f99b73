//! Error types for the chatvoice engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Audio decoding error: {0}")]
    Decode(String),

    #[error("Audio format mismatch in payload {index}: expected {expected_channels}ch @ {expected_rate} Hz, got {channels}ch @ {rate} Hz")]
    FormatMismatch {
        index: usize,
        expected_channels: u16,
        expected_rate: u32,
        channels: u16,
        rate: u32,
    },

    #[error("Audio encoding error: {0}")]
    Encode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chat backend error: {0}")]
    Backend(String),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Speech transcription error: {0}")]
    Transcription(String),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<hound::Error> for Error {
    fn from(e: hound::Error) -> Self {
        Error::Decode(e.to_string())
    }
}

impl From<symphonia::core::errors::Error> for Error {
    fn from(e: symphonia::core::errors::Error) -> Self {
        Error::Decode(e.to_string())
    }
}
