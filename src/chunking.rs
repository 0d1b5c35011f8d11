//! Deterministic, overlap-aware text segmentation.
//!
//! Documents are split into fixed-size character windows that advance by
//! `chunk_size - overlap` per step, so consecutive chunks share a region of
//! `overlap` characters. The same input always yields the same sequence.

use crate::errors::DocRagError;
use crate::Result;

/// Splitter with a fixed window size and overlap, both in characters
#[derive(Debug, Clone, Copy)]
pub struct ChunkSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkSplitter {
    /// Create a splitter. Requires `0 < overlap < chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if overlap == 0 || overlap >= chunk_size {
            return Err(DocRagError::InvalidChunking {
                chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Create a splitter from the installation's chunking configuration
    pub fn from_config(config: &crate::config::ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into overlapping chunks.
    ///
    /// Every chunk except the last has exactly `chunk_size` characters; the
    /// last may be shorter. Empty input yields an empty sequence. Boundaries
    /// are counted in characters, never splitting a UTF-8 code point.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, plus the end of the text
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        let total_chars = boundaries.len() - 1;

        let step = self.chunk_size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let end = usize::min(start + self.chunk_size, total_chars);
            chunks.push(text[boundaries[start]..boundaries[end]].to_string());
            if end == total_chars {
                break;
            }
            start += step;
        }

        chunks
    }
}
