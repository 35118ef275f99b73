//! Chat turn orchestration: backend answer plus optional spoken reply

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::client::{synthesize_text, ChatBackend, Language, SpeechSynthesizer};
use crate::config::AssemblyConfig;
use crate::error::Result;
use crate::pipeline::SpeechAssembler;
use crate::playback::{PlaybackHandle, PlaybackSession};

/// Text shown when the chat backend cannot answer
pub const APOLOGY: &str = "Sorry, an error occurred. Please try again.";

/// One answered chat turn
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub text: String,
    pub audio: Option<PlaybackHandle>,
}

pub struct ChatService {
    backend: Arc<dyn ChatBackend>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    assembler: SpeechAssembler,
    assembly: AssemblyConfig,
}

impl ChatService {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        assembly: AssemblyConfig,
    ) -> Result<Self> {
        assembly.validate()?;
        Ok(Self {
            backend,
            synthesizer,
            assembler: SpeechAssembler::new(&assembly)?,
            assembly,
        })
    }

    pub fn assembler(&self) -> &SpeechAssembler {
        &self.assembler
    }

    /// Answer `message`, speaking the answer when `audio_enabled`.
    ///
    /// The text is always returned; audio problems only leave `audio` empty.
    pub async fn generate_response(
        &self,
        message: &str,
        audio_enabled: bool,
        language: Language,
        session: &mut PlaybackSession,
    ) -> ChatReply {
        session.clear();

        let text = match self.backend.query(message).await {
            Ok(text) => text,
            Err(e) => {
                error!("Chat backend failed: {}", e);
                return ChatReply {
                    text: APOLOGY.to_string(),
                    audio: None,
                };
            }
        };

        let audio = if audio_enabled {
            match self.speak(&text, language, session).await {
                Ok(handle) => handle,
                Err(e) => {
                    warn!("Speech synthesis failed, replying with text only: {}", e);
                    None
                }
            }
        } else {
            None
        };

        ChatReply { text, audio }
    }

    /// Synthesize and assemble `text` into the session's current handle
    pub async fn speak(
        &self,
        text: &str,
        language: Language,
        session: &mut PlaybackSession,
    ) -> Result<Option<PlaybackHandle>> {
        let output =
            synthesize_text(self.synthesizer.as_ref(), text, language, &self.assembly).await?;
        info!(
            "Synthesized {} payloads from {} chunks",
            output.payloads.len(),
            output.chunks
        );
        Ok(self.assembler.play(output.payloads, true, session).await)
    }
}
