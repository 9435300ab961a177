//! Text chunking with configurable size and overlap.
//!
//! Sizes are counted in Unicode scalar values. Each chunk ends on the best
//! natural boundary found in the back half of its window, and the next chunk
//! starts `chunk_overlap` characters before that end.

use crate::types::Chunk;
use docbrain_core::config::ChunkingSettings;
use docbrain_core::{AppError, AppResult};

/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between adjacent chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Break preferences, strongest first. Separators stay with the left chunk.
const BREAK_TIERS: &[&[&str]] = &[&["\n\n"], &["\n"], &[". ", "! ", "? "], &[" "]];

/// Deterministic overlapping text splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    /// Create a chunker, rejecting geometry that could not make progress.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::Config(
                "Chunk size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(AppError::Config(format!(
                "Chunk overlap {} must be smaller than chunk size {}",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn from_settings(settings: &ChunkingSettings) -> AppResult<Self> {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into chunks attributed to `source`.
    ///
    /// Empty or whitespace-only text yields no chunks.
    pub fn split(&self, text: &str, source: &str) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        // Byte offset of every char plus the end, so slices never split a code point
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = chars.len();

        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let window_end = (start + self.chunk_size).min(total);
            let end = if window_end == total {
                total
            } else {
                self.find_break(&chars, start, window_end)
            };

            chunks.push(Chunk {
                text: text[offsets[start]..offsets[end]].to_string(),
                source: source.to_string(),
                sequence_index: chunks.len(),
                char_start: start,
            });

            if end == total {
                break;
            }

            // find_break guarantees end - start > overlap
            start = end - self.chunk_overlap;
        }

        tracing::debug!(
            source,
            chunks = chunks.len(),
            chunk_size = self.chunk_size,
            chunk_overlap = self.chunk_overlap,
            "Chunked text"
        );

        chunks
    }

    /// Pick the end of the chunk starting at `start`, at most `window_end`.
    fn find_break(&self, chars: &[char], start: usize, window_end: usize) -> usize {
        // Only the back half of the window is eligible, and the chunk must
        // outgrow the overlap or the walk would stall.
        let min_len = (self.chunk_size / 2).max(self.chunk_overlap + 1);
        let min_end = start + min_len;
        if min_end > window_end {
            return window_end;
        }

        for tier in BREAK_TIERS {
            let best = tier
                .iter()
                .filter_map(|sep| last_separator_end(chars, sep, min_end, window_end))
                .max();
            if let Some(end) = best {
                return end;
            }
        }

        window_end
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Latest position `p` in `min_end..=window_end` such that `chars[..p]` ends with `sep`.
fn last_separator_end(chars: &[char], sep: &str, min_end: usize, window_end: usize) -> Option<usize> {
    let sep: Vec<char> = sep.chars().collect();
    (min_end..=window_end)
        .rev()
        .find(|&end| end >= sep.len() && chars[end - sep.len()..end] == sep[..])
}
