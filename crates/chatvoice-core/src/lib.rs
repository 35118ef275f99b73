//! chatvoice core - speech synthesis assembly for the website chat widget
//!
//! Answers from the chat backend are spoken by an external TTS vendor that
//! limits the size of each request. This crate splits the answer into
//! sentence-aligned chunks, synthesizes them in order, decodes and joins the
//! returned payloads, slows them down by relabelling the sample rate and
//! serves the result as a WAV file behind a revocable handle.
//!
//! # Example
//!
//! ```ignore
//! use chatvoice_core::{AssemblyConfig, PlaybackSession, PlaybackStore, SpeechAssembler};
//!
//! let assembler = SpeechAssembler::new(&AssemblyConfig::default())?;
//! let mut session = PlaybackSession::new(PlaybackStore::new("http://localhost:8080"));
//! let handle = assembler.play(payloads, true, &mut session).await;
//! ```

pub mod audio;
pub mod client;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod playback;
pub mod service;
pub mod text;

pub use audio::{AudioBuffer, AudioDecoder, AudioEncoder, EncodedAudioBlob};
pub use client::{ChatBackend, Language, SpeechSynthesizer, SpeechTranscriber};
pub use config::{AppConfig, AssemblyConfig, ChatBackendConfig, ServerConfig, SynthesisConfig};
pub use error::{Error, Result};
pub use pipeline::SpeechAssembler;
pub use playback::{PlaybackHandle, PlaybackSession, PlaybackStore};
pub use service::{ChatReply, ChatService};
pub use text::{split_text_into_chunks, TextChunker};
