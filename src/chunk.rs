//! Recursive character-boundary text chunker.
//!
//! Splits page text into windows of at most `chunk_size` characters with up
//! to `chunk_overlap` characters carried over between consecutive windows.
//! Splitting prefers paragraph breaks, then line breaks, then spaces, and
//! only falls back to cutting between individual characters when a run of
//! text has none of those.
//!
//! Lengths are counted in `char`s, never bytes, so multi-byte text is never
//! cut inside a code point.

use anyhow::{bail, Result};
use std::collections::VecDeque;

use crate::models::{Chunk, DocumentPage};

/// Separators in priority order. The empty separator splits into characters.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// A fixed-size, overlapping text splitter.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            bail!("chunk size must be > 0");
        }
        if chunk_overlap >= chunk_size {
            bail!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap,
                chunk_size
            );
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split text into trimmed, non-empty windows.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, &SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // Pick the highest-priority separator that occurs in the text.
        let mut separator = separators.last().copied().unwrap_or("");
        let mut finer: &[&str] = &[];
        for (i, &sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = sep;
                break;
            }
            if text.contains(sep) {
                separator = sep;
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut out = Vec::new();
        let mut pending: Vec<String> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                out.extend(self.merge(&pending));
                pending.clear();
            }
            if finer.is_empty() {
                out.push(piece);
            } else {
                out.extend(self.split_with(&piece, finer));
            }
        }

        if !pending.is_empty() {
            out.extend(self.merge(&pending));
        }

        out
    }

    /// Greedily packs pieces into windows, keeping an overlapping tail.
    fn merge(&self, pieces: &[String]) -> Vec<String> {
        let mut windows = Vec::new();
        let mut current: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !current.is_empty() {
                if let Some(window) = join_trimmed(&current) {
                    windows.push(window);
                }
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match current.pop_front() {
                        Some((_, n)) => total -= n,
                        None => break,
                    }
                }
            }

            current.push_back((piece.as_str(), len));
            total += len;
        }

        if let Some(window) = join_trimmed(&current) {
            windows.push(window);
        }

        windows
    }
}

/// Split pages into chunks, copying each page's metadata onto its chunks.
pub fn chunk_pages(pages: &[DocumentPage], splitter: &RecursiveSplitter) -> Vec<Chunk> {
    let chunks: Vec<Chunk> = pages
        .iter()
        .flat_map(|page| {
            splitter
                .split_text(&page.text)
                .into_iter()
                .map(move |text| Chunk {
                    text,
                    metadata: page.metadata.clone(),
                })
        })
        .collect();

    tracing::info!(
        pages = pages.len(),
        chunks = chunks.len(),
        chunk_size = splitter.chunk_size(),
        chunk_overlap = splitter.chunk_overlap(),
        "chunked pages"
    );

    chunks
}

/// Splits on `separator`, attaching it to the front of each following piece.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut parts = text.split(separator);
    let mut out = Vec::new();
    if let Some(first) = parts.next() {
        if !first.is_empty() {
            out.push(first.to_string());
        }
    }
    for part in parts {
        out.push(format!("{}{}", separator, part));
    }
    out
}

fn join_trimmed(pieces: &VecDeque<(&str, usize)>) -> Option<String> {
    let joined: String = pieces.iter().map(|(s, _)| *s).collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
