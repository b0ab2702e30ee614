//! Byte-bounded text segmentation.
//!
//! The short-text endpoint rejects requests whose text exceeds 1024 bytes, so
//! long text is split into chunks that each fit under that limit. Chunk
//! boundaries never fall inside a multi-byte UTF-8 character: a boundary that
//! would land mid-character is pulled back to the start of that character.
//!
//! A character whose encoding is wider than the limit cannot be split at all.
//! It is emitted as a chunk of its own, which is the only case where a chunk
//! exceeds the limit.

use super::base::{TTSError, TTSResult};

/// Largest text the short-text endpoint accepts, in bytes.
pub const DEFAULT_MAX_CHUNK_BYTES: usize = 1024;

/// A contiguous slice of the original text tagged with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// 0-based ordinal position in the original text
    pub index: usize,
    pub content: String,
}

/// Splits text into ordered chunks of at most `max_bytes` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegmenter {
    max_bytes: usize,
}

impl Default for TextSegmenter {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_CHUNK_BYTES,
        }
    }
}

impl TextSegmenter {
    pub fn new(max_bytes: usize) -> TTSResult<Self> {
        if max_bytes == 0 {
            return Err(TTSError::InvalidConfiguration(
                "chunk size must be at least 1 byte".to_string(),
            ));
        }
        Ok(Self { max_bytes })
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Split `text` into indexed chunks. Empty text yields no chunks.
    pub fn split(&self, text: &str) -> Vec<TextChunk> {
        chunk_bounds(text, self.max_bytes)
            .enumerate()
            .map(|(index, (start, end))| TextChunk {
                index,
                content: text[start..end].to_string(),
            })
            .collect()
    }
}

/// Split `text` into string slices of at most `max_bytes` bytes.
///
/// A `max_bytes` of zero is treated as one byte, which puts every character
/// in its own chunk.
pub fn split_text(text: &str, max_bytes: usize) -> Vec<&str> {
    chunk_bounds(text, max_bytes.max(1))
        .map(|(start, end)| &text[start..end])
        .collect()
}

/// Yields `(start, end)` byte ranges covering `text` in order.
fn chunk_bounds(text: &str, max_bytes: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut start = 0;
    std::iter::from_fn(move || {
        if start >= text.len() {
            return None;
        }

        let mut end = (start + max_bytes).min(text.len());
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }

        // A single character wider than the limit: take it whole
        if end == start {
            end = start + 1;
            while !text.is_char_boundary(end) {
                end += 1;
            }
        }

        let bounds = (start, end);
        start = end;
        Some(bounds)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(split_text("", 4).is_empty());
        assert!(TextSegmenter::default().split("").is_empty());
    }

    #[test]
    fn test_ascii_even_split() {
        assert_eq!(split_text("AAAABBBBCCCC", 4), vec!["AAAA", "BBBB", "CCCC"]);
    }

    #[test]
    fn test_ascii_remainder() {
        assert_eq!(split_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_text_shorter_than_limit() {
        assert_eq!(split_text("hello", 1024), vec!["hello"]);
    }

    #[test]
    fn test_boundary_pulled_back_before_multibyte_char() {
        // "abc" + "中" (3 bytes) + "cd": a 5 byte window would end inside 中
        let text = "abc中cd";
        let chunks = split_text(text, 5);
        assert_eq!(chunks, vec!["abc", "中cd"]);
        assert!(chunks.iter().all(|c| c.len() <= 5));
    }

    #[test]
    fn test_no_chunk_ends_mid_character() {
        let text = "中华兴盛，辛有斌哥。How are you? 😀 ñandú".repeat(7);
        for max_bytes in 1..=20 {
            let chunks = split_text(&text, max_bytes);
            assert_eq!(chunks.concat(), text, "max_bytes={max_bytes}");
            for chunk in &chunks {
                assert!(!chunk.is_empty());
                // Oversized chunks may only hold one character
                if chunk.len() > max_bytes {
                    assert_eq!(chunk.chars().count(), 1, "max_bytes={max_bytes}");
                }
            }
        }
    }

    #[test]
    fn test_oversized_character_emitted_alone() {
        // 😀 is 4 bytes, wider than the 2 byte limit
        assert_eq!(split_text("a😀b", 2), vec!["a", "😀", "b"]);
        assert_eq!(split_text("中中", 1), vec!["中", "中"]);
    }

    #[test]
    fn test_segmenter_indexes_chunks_in_order() {
        let segmenter = TextSegmenter::new(4).unwrap();
        let chunks = segmenter.split("AAAABBBBCCCC");
        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
        assert_eq!(chunks[2].content, "CCCC");
    }

    #[test]
    fn test_split_is_deterministic() {
        let segmenter = TextSegmenter::new(7).unwrap();
        let text = "昏黑的夜色中，月光如水洒落，静谧而神秘。";
        assert_eq!(segmenter.split(text), segmenter.split(text));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(matches!(
            TextSegmenter::new(0),
            Err(TTSError::InvalidConfiguration(_))
        ));
        assert_eq!(split_text("ab", 0), vec!["a", "b"]);
    }

    #[test]
    fn test_default_limit() {
        let segmenter = TextSegmenter::default();
        assert_eq!(segmenter.max_bytes(), DEFAULT_MAX_CHUNK_BYTES);

        let text = "x".repeat(2500);
        let chunks = segmenter.split(&text);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content.len(), 1024);
        assert_eq!(chunks[2].content.len(), 452);
    }
}
