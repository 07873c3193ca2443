//! Core data models used throughout paperchat.
//!
//! These types represent the pages, chunks, and chat results that flow
//! through the ingestion and question-answering pipeline.

use serde::{Deserialize, Serialize};

/// Where a piece of text came from: a PDF file name and a 1-based page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// File name relative to the PDF directory (e.g. `"handbook.pdf"`).
    pub source: String,
    /// 1-based page number within `source`.
    pub page: u32,
}

/// Text extracted from a single PDF page.
#[derive(Debug, Clone)]
pub struct DocumentPage {
    pub metadata: PageMetadata,
    pub text: String,
}

/// A window of page text, the unit of embedding and retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: PageMetadata,
}

/// A chunk returned from the vector index with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// One completed exchange held in conversation memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

/// The answer produced by the chain plus the chunks it was grounded on.
#[derive(Debug, Clone)]
pub struct ChatResult {
    pub answer: String,
    pub source_chunks: Vec<ScoredChunk>,
}

/// A citation as rendered to HTTP clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRef {
    pub file: String,
    pub page: u32,
    pub link: String,
}

impl SourceRef {
    /// Builds the citation for a chunk, linking into the `/files` route.
    ///
    /// The file name is percent-encoded so names containing `#`, `?`, `%`
    /// or spaces still resolve.
    pub fn from_metadata(meta: &PageMetadata) -> Self {
        Self {
            file: meta.source.clone(),
            page: meta.page,
            link: format!(
                "/files/{}#page={}",
                urlencoding::encode(&meta.source),
                meta.page
            ),
        }
    }
}
