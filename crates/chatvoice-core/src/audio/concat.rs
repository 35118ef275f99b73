//! Decoding synthesized payloads and joining them into one buffer

use base64::Engine;
use tracing::debug;

use super::buffer::AudioBuffer;
use super::decoder::AudioDecoder;
use crate::error::{Error, Result};

/// Base64 payload to raw container bytes
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    Ok(base64::engine::general_purpose::STANDARD.decode(payload.trim())?)
}

/// Base64 payload to PCM via `decoder`
pub fn decode_payload(payload: &str, decoder: &dyn AudioDecoder) -> Result<AudioBuffer> {
    let bytes = decode_base64(payload).map_err(|e| Error::Decode(e.to_string()))?;
    decoder.decode(&bytes)
}

/// Decode every payload in order and join them end to end.
///
/// Any payload that fails to decode aborts the whole operation. All buffers
/// must share the first buffer's channel count and sample rate.
pub fn decode_and_concatenate<S: AsRef<str>>(
    payloads: &[S],
    decoder: &dyn AudioDecoder,
) -> Result<AudioBuffer> {
    if payloads.is_empty() {
        return Err(Error::Decode("no payloads".to_string()));
    }

    let buffers = payloads
        .iter()
        .enumerate()
        .map(|(i, p)| {
            decode_payload(p.as_ref(), decoder)
                .map_err(|e| Error::Decode(format!("payload {}: {}", i, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    let first = &buffers[0];
    for (index, buffer) in buffers.iter().enumerate().skip(1) {
        if !first.same_format(buffer) {
            return Err(Error::FormatMismatch {
                index,
                expected_channels: first.num_channels(),
                expected_rate: first.sample_rate(),
                channels: buffer.num_channels(),
                rate: buffer.sample_rate(),
            });
        }
    }

    let joined = AudioBuffer::concatenate(&buffers)?;
    debug!(
        "Concatenated {} payloads into {} frames ({}ch @ {} Hz)",
        buffers.len(),
        joined.frames(),
        joined.num_channels(),
        joined.sample_rate()
    );
    Ok(joined)
}
