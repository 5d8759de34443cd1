//! Overlapping text chunking that prefers natural boundaries

use std::collections::VecDeque;

use crate::types::Chunk;

/// Target chunk length in characters
pub const CHUNK_SIZE: usize = 1000;
/// Characters shared between consecutive chunks
pub const CHUNK_OVERLAP: usize = 150;

/// Boundaries tried in order: paragraph, line, sentence, word, character
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " ", ""];

/// Recursive character chunker.
///
/// Text is split at the coarsest separator it contains; pieces still longer
/// than the target are split again with the next separator down, ending at
/// single characters. Adjacent pieces are then greedily merged up to the
/// target length, carrying up to `overlap` characters of trailing pieces
/// into the next chunk. Lengths are measured in characters, not bytes.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between chunks
    overlap: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(CHUNK_SIZE, CHUNK_OVERLAP)
    }
}

impl TextChunker {
    /// Create a new chunker; overlap is clamped below the chunk size
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    /// Chunk a document's text, numbering chunks from 1
    pub fn chunk_document(&self, source: &str, text: &str) -> Vec<Chunk> {
        self.split_text(text)
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk::new(text, source, i as u32 + 1))
            .collect()
    }

    /// Split text into ordered, trimmed, non-empty segments
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (separator, remaining) = match separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s))
        {
            Some(i) => (separators[i], &separators[i + 1..]),
            None => ("", &[][..]),
        };

        let pieces = split_keeping_separator(text, separator);

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                chunks.extend(self.merge(&pending));
                pending.clear();
            }

            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge(&pending));
        }

        chunks
    }

    /// Greedily merge consecutive pieces, keeping a tail for overlap
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                push_joined(&mut chunks, &window);

                while total > self.overlap || (total > 0 && total + len > self.chunk_size) {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }

            window.push_back((piece, len));
            total += len;
        }

        push_joined(&mut chunks, &window);
        chunks
    }
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<(&str, usize)>) {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split at `separator`, attaching it to the end of the preceding piece.
/// An empty separator splits into single characters.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}
