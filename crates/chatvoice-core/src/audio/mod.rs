//! Audio assembly: decoding, concatenation, slowdown and WAV encoding

mod buffer;
mod concat;
mod decoder;
mod encoder;

pub use buffer::AudioBuffer;
pub use concat::{decode_and_concatenate, decode_base64, decode_payload};
pub use decoder::{AudioDecoder, AutoDecoder, SymphoniaDecoder, WavDecoder};
pub use encoder::{
    AudioEncoder, AudioFormat, BlobInfo, EncodedAudioBlob, WavEncoder, WAV_HEADER_LEN,
};
