//! Decoding encoded audio bytes into PCM buffers

use std::io::{Cursor, ErrorKind};

use hound::{SampleFormat, WavReader};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use super::buffer::AudioBuffer;
use crate::error::{Error, Result};

/// Turns one encoded audio stream (container bytes) into PCM samples
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer>;
}

/// RIFF/WAVE decoder for integer and float PCM
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl AudioDecoder for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer> {
        let reader = WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(Error::Decode(format!(
                        "unsupported bit depth: {}",
                        spec.bits_per_sample
                    )));
                }
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        debug!(
            "Decoded WAV: {}ch @ {} Hz, {}-bit, {} samples",
            spec.channels,
            spec.sample_rate,
            spec.bits_per_sample,
            samples.len()
        );
        AudioBuffer::from_interleaved(spec.sample_rate, spec.channels, &samples)
    }
}

/// Decoder for any container/codec pair symphonia can probe
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder;

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer> {
        let source = Cursor::new(bytes.to_vec());
        let mss = MediaSourceStream::new(Box::new(source), Default::default());

        let probed = symphonia::default::get_probe().format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format = probed.format;

        let (track_id, params) = {
            let track = format
                .tracks()
                .iter()
                .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
                .ok_or_else(|| Error::Decode("no supported audio track".to_string()))?;
            (track.id, track.codec_params.clone())
        };

        let mut decoder =
            symphonia::default::get_codecs().make(&params, &DecoderOptions::default())?;

        let mut sample_rate = params.sample_rate;
        let mut num_channels = params.channels.map(|c| c.count());
        let mut interleaved = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            };
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = decoder.decode(&packet)?;
            let spec = *decoded.spec();
            sample_rate = Some(spec.rate);
            num_channels = Some(spec.channels.count());

            let mut samples = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            samples.copy_interleaved_ref(decoded);
            interleaved.extend_from_slice(samples.samples());
        }

        let sample_rate =
            sample_rate.ok_or_else(|| Error::Decode("stream has no sample rate".to_string()))?;
        let num_channels = num_channels
            .and_then(|n| u16::try_from(n).ok())
            .ok_or_else(|| Error::Decode("stream has no channel layout".to_string()))?;

        debug!(
            "Decoded stream: {}ch @ {} Hz, {} samples",
            num_channels,
            sample_rate,
            interleaved.len()
        );
        AudioBuffer::from_interleaved(sample_rate, num_channels, &interleaved)
    }
}

/// Picks [`WavDecoder`] for RIFF/WAVE input and [`SymphoniaDecoder`] otherwise.
///
/// WAV variants hound rejects are retried through symphonia.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecoder;

impl AudioDecoder for AutoDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer> {
        if is_riff_wave(bytes) {
            match WavDecoder.decode(bytes) {
                Ok(buffer) => return Ok(buffer),
                Err(e) => debug!("WAV decode failed ({}), retrying with symphonia", e),
            }
        }
        SymphoniaDecoder.decode(bytes)
    }
}

fn is_riff_wave(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn wav_i16(channels: u16, sample_rate: u32, interleaved: &[i16]) -> Vec<u8> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for &s in interleaved {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn wav_f32(sample_rate: u32, samples: &[f32]) -> Vec<u8> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_wav_decoder_int16_stereo() {
        let bytes = wav_i16(2, 22050, &[16384, -16384, 0, 32767, -32768, 8192]);
        let buffer = WavDecoder.decode(&bytes).unwrap();
        assert_eq!(buffer.num_channels(), 2);
        assert_eq!(buffer.sample_rate(), 22050);
        assert_eq!(buffer.frames(), 3);
        assert_eq!(buffer.channel(0).unwrap(), &[0.5, 0.0, -1.0]);
        assert_eq!(buffer.channel(1).unwrap()[0], -0.5);
        assert_eq!(buffer.channel(1).unwrap()[2], 0.25);
    }

    #[test]
    fn test_wav_decoder_float() {
        let bytes = wav_f32(16000, &[0.25, -0.75]);
        let buffer = WavDecoder.decode(&bytes).unwrap();
        assert_eq!(buffer.channel(0).unwrap(), &[0.25, -0.75]);
    }

    #[test]
    fn test_wav_decoder_rejects_garbage() {
        assert!(matches!(
            WavDecoder.decode(b"definitely not audio"),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_symphonia_decoder_reads_wav() {
        let bytes = wav_i16(1, 8000, &[0, 16384, -16384, 0]);
        let buffer = SymphoniaDecoder.decode(&bytes).unwrap();
        assert_eq!(buffer.num_channels(), 1);
        assert_eq!(buffer.sample_rate(), 8000);
        assert_eq!(buffer.frames(), 4);
        assert!((buffer.channel(0).unwrap()[1] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_auto_decoder() {
        let bytes = wav_i16(1, 24000, &[100, 200, 300]);
        assert_eq!(AutoDecoder.decode(&bytes).unwrap().frames(), 3);
        assert!(AutoDecoder.decode(&[0u8; 64]).is_err());
    }

    #[test]
    fn test_riff_sniffing() {
        assert!(is_riff_wave(&wav_i16(1, 8000, &[0])));
        assert!(!is_riff_wave(b"RIFF"));
        assert!(!is_riff_wave(b"ID3\x03\x00\x00\x00\x00\x00\x00\x00\x00"));
    }
}
