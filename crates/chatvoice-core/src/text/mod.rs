//! Text preparation for speech synthesis

mod chunker;

pub use chunker::{needs_chunking, split_text_into_chunks, TextChunker, DEFAULT_MAX_CHUNK_SIZE};
