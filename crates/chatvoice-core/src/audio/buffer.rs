//! Multi-channel PCM buffer

use crate::error::{Error, Result};

/// Decoded PCM audio, one `Vec<f32>` per channel, nominally in [-1, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Build a buffer from per-channel sample data.
    ///
    /// Every channel must hold the same number of frames.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if channels.is_empty() {
            return Err(Error::Decode("audio buffer has no channels".to_string()));
        }
        if channels.len() > u16::MAX as usize {
            return Err(Error::Decode(format!(
                "audio buffer has too many channels: {}",
                channels.len()
            )));
        }
        if sample_rate == 0 {
            return Err(Error::Decode("audio buffer has a zero sample rate".to_string()));
        }
        let frames = channels[0].len();
        if let Some(bad) = channels.iter().position(|c| c.len() != frames) {
            return Err(Error::Decode(format!(
                "channel {} has {} frames, expected {}",
                bad,
                channels[bad].len(),
                frames
            )));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Silent buffer of the given shape
    pub fn silence(sample_rate: u32, num_channels: u16, frames: usize) -> Result<Self> {
        Self::new(sample_rate, vec![vec![0.0; frames]; num_channels as usize])
    }

    /// Split interleaved samples (frame by frame) into channels
    pub fn from_interleaved(sample_rate: u32, num_channels: u16, samples: &[f32]) -> Result<Self> {
        if num_channels == 0 {
            return Err(Error::Decode("audio buffer has no channels".to_string()));
        }
        let n = num_channels as usize;
        if samples.len() % n != 0 {
            return Err(Error::Decode(format!(
                "{} interleaved samples do not divide into {} channels",
                samples.len(),
                n
            )));
        }
        let frames = samples.len() / n;
        let mut channels = vec![Vec::with_capacity(frames); n];
        for frame in samples.chunks_exact(n) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
        Self::new(sample_rate, channels)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_channels(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn duration_ms(&self) -> f32 {
        (self.frames() as f32 / self.sample_rate as f32) * 1000.0
    }

    /// Whether `other` has the same channel count and sample rate
    pub fn same_format(&self, other: &AudioBuffer) -> bool {
        self.sample_rate == other.sample_rate && self.channels.len() == other.channels.len()
    }

    /// Join buffers end to end in order.
    ///
    /// The result takes its channel count and sample rate from the first
    /// buffer. Callers validate formats beforehand (see [`AudioBuffer::same_format`]).
    pub fn concatenate(buffers: &[AudioBuffer]) -> Result<AudioBuffer> {
        let first = buffers
            .first()
            .ok_or_else(|| Error::Decode("nothing to concatenate".to_string()))?;
        let num_channels = first.channels.len();
        let total_frames: usize = buffers.iter().map(AudioBuffer::frames).sum();

        let mut channels = vec![vec![0.0f32; total_frames]; num_channels];
        let mut offset = 0;
        for buffer in buffers {
            let frames = buffer.frames();
            for (ch, out) in channels.iter_mut().enumerate() {
                let src = buffer.channels.get(ch).ok_or_else(|| {
                    Error::Encode(format!(
                        "buffer has {} channels, expected {}",
                        buffer.channels.len(),
                        num_channels
                    ))
                })?;
                out[offset..offset + frames].copy_from_slice(src);
            }
            offset += frames;
        }

        AudioBuffer::new(first.sample_rate, channels)
    }

    /// Same samples declared at `floor(sample_rate * factor)`.
    ///
    /// No interpolation: playback of the result is slower and lower pitched
    /// for factors below one.
    pub fn slowed_down(&self, factor: f64) -> Result<AudioBuffer> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(Error::Config(format!(
                "slowdown factor must be a positive number, got {}",
                factor
            )));
        }
        let rate = (self.sample_rate as f64 * factor).floor();
        if rate < 1.0 || rate > u32::MAX as f64 {
            return Err(Error::Config(format!(
                "slowdown factor {} gives an unusable sample rate from {} Hz",
                factor, self.sample_rate
            )));
        }
        Ok(AudioBuffer {
            sample_rate: rate as u32,
            channels: self.channels.clone(),
        })
    }
}
