//! Sentence-aware text chunking for per-request synthesis limits
//!
//! Text is first split into sentences on `.`, `?`, `!` and newlines, then
//! sentences are packed greedily into chunks no longer than the limit.
//! A sentence is only cut mid-way when it alone exceeds the limit.
//! All lengths are counted in characters, not bytes.

use tracing::debug;

use crate::error::{Error, Result};

/// Default per-request character limit of the speech vendor
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 270;

const SENTENCE_DELIMITERS: [char; 4] = ['.', '?', '!', '\n'];

/// Splits text into synthesis-sized chunks
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_chunk_size: usize,
}

impl TextChunker {
    pub fn new(max_chunk_size: usize) -> Result<Self> {
        if max_chunk_size == 0 {
            return Err(Error::Config(
                "max_chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(Self { max_chunk_size })
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        split_text_into_chunks(text, self.max_chunk_size)
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

/// Whether `text` is long enough to need the chunked synthesis path
pub fn needs_chunking(text: &str, threshold: usize) -> bool {
    text.chars().count() >= threshold
}

/// Split `text` into ordered chunks of at most `max_chunk_size` characters.
///
/// A `max_chunk_size` of zero is treated as one.
pub fn split_text_into_chunks(text: &str, max_chunk_size: usize) -> Vec<String> {
    let max_chunk_size = max_chunk_size.max(1);
    let sentences = split_sentences(text);

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in sentences {
        let sentence_len = sentence.chars().count();

        if sentence_len > max_chunk_size {
            if current_len > 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            hard_split(&sentence, max_chunk_size, &mut chunks);
            continue;
        }

        let separator = usize::from(current_len > 0);
        if current_len + separator + sentence_len > max_chunk_size {
            chunks.push(std::mem::replace(&mut current, sentence));
            current_len = sentence_len;
        } else {
            if separator == 1 {
                current.push(' ');
            }
            current.push_str(&sentence);
            current_len += separator + sentence_len;
        }
    }

    if current_len > 0 {
        chunks.push(current);
    }

    debug!(
        "Split {} characters into {} chunks (max {})",
        text.chars().count(),
        chunks.len(),
        max_chunk_size
    );
    chunks
}

/// Trimmed, non-empty sentences in input order. The delimiter stays with
/// the sentence it closes.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        current.push(c);
        if SENTENCE_DELIMITERS.contains(&c) {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
                current.clear();
            }
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }

    sentences
}

fn hard_split(sentence: &str, max_chunk_size: usize, chunks: &mut Vec<String>) {
    let chars: Vec<char> = sentence.chars().collect();
    for piece in chars.chunks(max_chunk_size) {
        chunks.push(piece.iter().collect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_both_sentences_fit_in_one_chunk() {
        let chunks = split_text_into_chunks("Hello world. This is a test.", 100);
        assert_eq!(chunks, vec!["Hello world. This is a test."]);
    }

    #[test]
    fn test_splits_at_sentence_boundary() {
        let chunks = split_text_into_chunks("Hello world. This is a test.", 15);
        assert_eq!(chunks, vec!["Hello world.", "This is a test."]);
    }

    #[test]
    fn test_sentence_longer_than_limit_is_hard_split() {
        // "This is a test." is 15 characters, so a limit of 12 must cut it.
        let chunks = split_text_into_chunks("Hello world. This is a test.", 12);
        assert_eq!(chunks, vec!["Hello world.", "This is a te", "st."]);
    }

    #[test]
    fn test_oversized_sentence_hard_split() {
        let sentence = "a".repeat(300);
        let chunks = split_text_into_chunks(&sentence, 270);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 270);
        assert_eq!(chunks[1].len(), 30);
        assert_eq!(chunks.concat(), sentence);
    }

    #[test]
    fn test_oversized_sentence_flushes_pending_chunk() {
        let text = format!("Short one. {}", "b".repeat(25));
        let chunks = split_text_into_chunks(&text, 10);
        assert_eq!(chunks[0], "Short one.");
        assert_eq!(chunks[1..].concat(), "b".repeat(25));
        assert_eq!(chunks.len(), 4);
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(split_text_into_chunks("", 270).is_empty());
        assert!(split_text_into_chunks("   \n\t  ", 270).is_empty());
    }

    #[test]
    fn test_trailing_text_without_delimiter() {
        let chunks = split_text_into_chunks("First. and then some", 270);
        assert_eq!(chunks, vec!["First. and then some"]);
    }

    #[test]
    fn test_newline_and_punctuation_delimiters() {
        let chunks = split_text_into_chunks("Line one\nIs it? Yes!", 8);
        assert_eq!(chunks, vec!["Line one", "Is it?", "Yes!"]);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "ನಮಸ್ಕಾರ. ಹೇಗಿದ್ದೀರಿ?";
        let chunks = split_text_into_chunks(text, 5);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 5);
        }
        assert_eq!(non_whitespace(&chunks.concat()), non_whitespace(text));
    }

    #[test]
    fn test_size_bound_and_reconstruction() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(20)
            + "An extremely long run-on sentence without any stop that keeps going and going well past any reasonable limit for a single request"
            + "\nWhat now? Done!";
        for max in [1, 7, 30, 45, 100, 270] {
            let chunks = split_text_into_chunks(&text, max);
            assert!(chunks.iter().all(|c| !c.is_empty()));
            assert!(chunks.iter().all(|c| c.chars().count() <= max));
            assert_eq!(non_whitespace(&chunks.concat()), non_whitespace(&text));
        }
    }

    #[test]
    fn test_zero_limit_treated_as_one() {
        assert_eq!(split_text_into_chunks("ab", 0), vec!["a", "b"]);
    }

    #[test]
    fn test_chunker_rejects_zero_limit() {
        assert!(TextChunker::new(0).is_err());
        let chunker = TextChunker::new(15).unwrap();
        assert_eq!(chunker.split("Hello world. This is a test.").len(), 2);
        assert_eq!(TextChunker::default().max_chunk_size(), 270);
    }

    #[test]
    fn test_needs_chunking() {
        assert!(!needs_chunking("short", 270));
        assert!(needs_chunking(&"x".repeat(270), 270));
    }
}
