//! Audio encoding to playable containers

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use super::buffer::AudioBuffer;
use crate::error::{Error, Result};

/// Size of the canonical PCM WAV header
pub const WAV_HEADER_LEN: usize = 44;

const BYTES_PER_SAMPLE: usize = 2;

/// Supported audio output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// WAV format (16-bit PCM)
    Wav,
}

impl AudioFormat {
    /// Get content type for format
    pub fn content_type(self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
        }
    }
}

/// Encoded audio bytes with their MIME type
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedAudioBlob {
    pub data: Bytes,
    pub content_type: &'static str,
    /// Shape of the encoded audio, absent for pass-through payloads
    pub info: Option<BlobInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobInfo {
    pub frames: usize,
    pub channels: u16,
    pub sample_rate: u32,
    pub duration_ms: f32,
}

impl EncodedAudioBlob {
    /// Wrap already-encoded bytes without inspecting them
    pub fn raw(data: impl Into<Bytes>, format: AudioFormat) -> Self {
        Self {
            data: data.into(),
            content_type: format.content_type(),
            info: None,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Serializes a PCM buffer into a container
pub trait AudioEncoder: Send + Sync {
    fn encode(&self, buffer: &AudioBuffer) -> Result<EncodedAudioBlob>;

    fn format(&self) -> AudioFormat;
}

/// Canonical 44-byte-header WAV writer, 16-bit little-endian PCM
#[derive(Debug, Clone, Copy, Default)]
pub struct WavEncoder;

impl WavEncoder {
    /// Header for `frames` interleaved 16-bit frames
    pub fn header(channels: u16, sample_rate: u32, frames: usize) -> Result<[u8; WAV_HEADER_LEN]> {
        let data_len = data_len(channels, frames)?;
        let block_align = channels
            .checked_mul(BYTES_PER_SAMPLE as u16)
            .ok_or_else(|| Error::Encode(format!("too many channels: {}", channels)))?;
        let byte_rate = sample_rate
            .checked_mul(block_align as u32)
            .ok_or_else(|| Error::Encode(format!("byte rate overflows at {} Hz", sample_rate)))?;

        let mut header = [0u8; WAV_HEADER_LEN];
        let mut out = &mut header[..];
        out.put_slice(b"RIFF");
        out.put_u32_le(36 + data_len);
        out.put_slice(b"WAVE");

        out.put_slice(b"fmt ");
        out.put_u32_le(16);
        out.put_u16_le(1);
        out.put_u16_le(channels);
        out.put_u32_le(sample_rate);
        out.put_u32_le(byte_rate);
        out.put_u16_le(block_align);
        out.put_u16_le(16);

        out.put_slice(b"data");
        out.put_u32_le(data_len);

        Ok(header)
    }
}

impl AudioEncoder for WavEncoder {
    fn encode(&self, buffer: &AudioBuffer) -> Result<EncodedAudioBlob> {
        let channels = buffer.num_channels();
        let frames = buffer.frames();
        let header = Self::header(channels, buffer.sample_rate(), frames)?;

        let mut out = BytesMut::with_capacity(WAV_HEADER_LEN + frames * channels as usize * 2);
        out.put_slice(&header);
        for i in 0..frames {
            for channel in buffer.channels() {
                out.put_i16_le(to_pcm16(channel[i]));
            }
        }

        debug!(
            "Encoded {} frames x {}ch @ {} Hz to WAV ({} bytes)",
            frames,
            channels,
            buffer.sample_rate(),
            out.len()
        );

        Ok(EncodedAudioBlob {
            data: out.freeze(),
            content_type: AudioFormat::Wav.content_type(),
            info: Some(BlobInfo {
                frames,
                channels,
                sample_rate: buffer.sample_rate(),
                duration_ms: buffer.duration_ms(),
            }),
        })
    }

    fn format(&self) -> AudioFormat {
        AudioFormat::Wav
    }
}

fn data_len(channels: u16, frames: usize) -> Result<u32> {
    frames
        .checked_mul(channels as usize * BYTES_PER_SAMPLE)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| n.checked_add(36).is_some())
        .ok_or_else(|| {
            Error::Encode(format!(
                "{} frames x {} channels does not fit in a WAV file",
                frames, channels
            ))
        })
}

/// Clamp to [-1, 1], then scale asymmetrically onto the i16 range
fn to_pcm16(sample: f32) -> i16 {
    let s = if sample.is_nan() { 0.0 } else { sample.clamp(-1.0, 1.0) };
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}
