//! Persistent brute-force vector index.
//!
//! Holds one [`VectorEntry`] per chunk and answers top-k queries by cosine
//! similarity over every stored vector. The index is built once from the
//! PDF corpus, written to a directory, and reloaded verbatim on later starts
//! so no embedding calls are repeated.
//!
//! # On-disk layout
//!
//! ```text
//! faiss_index/
//! ├── index.json   model, dims, checksum, chunk text + metadata per entry
//! └── index.vec    little-endian f32 vectors, `dims` floats per entry
//! ```
//!
//! `index.vec` is written last and is the existence check: a directory
//! without it is treated as "no index". There is no incremental update;
//! a changed corpus means [`remove`] and rebuild.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob, EmbeddingProvider};
use crate::models::{Chunk, ScoredChunk};

pub const DOCSTORE_FILE: &str = "index.json";
pub const VECTORS_FILE: &str = "index.vec";

/// An embedded chunk.
#[derive(Debug, Clone)]
pub struct VectorEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct Docstore {
    model: String,
    dims: usize,
    vectors_sha256: String,
    entries: Vec<Chunk>,
}

/// In-memory similarity index over embedded chunks.
#[derive(Debug)]
pub struct VectorIndex {
    model: String,
    dims: usize,
    entries: Vec<VectorEntry>,
}

impl VectorIndex {
    /// Assemble an index from already-embedded entries.
    ///
    /// All vectors must share one dimensionality.
    pub fn from_entries(model: &str, entries: Vec<VectorEntry>) -> Result<Self> {
        let dims = entries.first().map(|e| e.vector.len()).unwrap_or(0);
        if let Some((i, bad)) = entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.vector.len() != dims)
        {
            bail!(
                "embedding {} has {} dimensions, expected {}",
                i,
                bad.vector.len(),
                dims
            );
        }
        Ok(Self {
            model: model.to_string(),
            dims,
            entries,
        })
    }

    /// Embed every chunk and build the index.
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn EmbeddingProvider) -> Result<Self> {
        if chunks.is_empty() {
            bail!("No text chunks to index; the PDF directory has no extractable text");
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder
            .embed_documents(&texts)
            .await
            .context("Failed to embed chunks")?;

        if vectors.len() != chunks.len() {
            bail!(
                "Embedding provider returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            );
        }

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| VectorEntry { chunk, vector })
            .collect();

        Self::from_entries(embedder.model_name(), entries)
    }

    /// Read a persisted index directory.
    pub fn load(dir: &Path) -> Result<Self> {
        let docstore_path = dir.join(DOCSTORE_FILE);
        let vectors_path = dir.join(VECTORS_FILE);

        let raw = std::fs::read_to_string(&docstore_path)
            .with_context(|| format!("Failed to read {}", docstore_path.display()))?;
        let docstore: Docstore = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", docstore_path.display()))?;
        let blob = std::fs::read(&vectors_path)
            .with_context(|| format!("Failed to read {}", vectors_path.display()))?;

        if sha256_hex(&blob) != docstore.vectors_sha256 {
            bail!(
                "{} does not match {}; delete {} and rebuild",
                VECTORS_FILE,
                DOCSTORE_FILE,
                dir.display()
            );
        }

        let row_bytes = docstore
            .dims
            .checked_mul(4)
            .with_context(|| format!("{} declares an impossible dimensionality", DOCSTORE_FILE))?;
        let expected = docstore
            .entries
            .len()
            .checked_mul(row_bytes)
            .with_context(|| format!("{} declares an impossible index size", DOCSTORE_FILE))?;
        if blob.len() != expected {
            bail!(
                "{} holds {} bytes, expected {} for {} entries of {} dimensions",
                VECTORS_FILE,
                blob.len(),
                expected,
                docstore.entries.len(),
                docstore.dims
            );
        }

        let entries = docstore
            .entries
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| VectorEntry {
                chunk,
                vector: blob_to_vec(&blob[i * row_bytes..(i + 1) * row_bytes]),
            })
            .collect();

        Ok(Self {
            model: docstore.model,
            dims: docstore.dims,
            entries,
        })
    }

    /// Write the index to `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create index directory {}", dir.display()))?;

        let mut blob = Vec::with_capacity(self.entries.len() * self.dims * 4);
        for entry in &self.entries {
            blob.extend_from_slice(&vec_to_blob(&entry.vector));
        }

        let docstore = Docstore {
            model: self.model.clone(),
            dims: self.dims,
            vectors_sha256: sha256_hex(&blob),
            entries: self.entries.iter().map(|e| e.chunk.clone()).collect(),
        };

        let docstore_path = dir.join(DOCSTORE_FILE);
        std::fs::write(&docstore_path, serde_json::to_vec(&docstore)?)
            .with_context(|| format!("Failed to write {}", docstore_path.display()))?;

        let vectors_path = dir.join(VECTORS_FILE);
        std::fs::write(&vectors_path, &blob)
            .with_context(|| format!("Failed to write {}", vectors_path.display()))?;

        Ok(())
    }

    /// Top-`k` chunks by cosine similarity, best first.
    ///
    /// Equal scores keep index order. A query whose dimensionality differs
    /// from the stored vectors is an error.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if !self.entries.is_empty() && query.len() != self.dims {
            bail!(
                "query embedding has {} dimensions but the index (model {}) has {}; \
                 rebuild it with `paperchat index --rebuild`",
                query.len(),
                self.model,
                self.dims
            );
        }

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|e| ScoredChunk {
                chunk: e.chunk.clone(),
                score: cosine_similarity(query, &e.vector),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[VectorEntry] {
        &self.entries
    }
}

/// Whether a persisted index is present in `dir`.
pub fn exists(dir: &Path) -> bool {
    dir.join(VECTORS_FILE).is_file()
}

/// Delete a persisted index directory. Missing directories are fine.
pub fn remove(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to remove index directory {}", dir.display()))?;
    }
    Ok(())
}

/// Load the index from `dir` if present; otherwise build it from the chunks
/// produced by `chunk_source` and save it.
///
/// The load path never calls the embedding provider and never runs
/// `chunk_source`, so a persisted index is used even if the PDFs changed.
pub async fn open_or_build<F>(
    dir: &Path,
    embedder: &dyn EmbeddingProvider,
    chunk_source: F,
) -> Result<VectorIndex>
where
    F: FnOnce() -> Result<Vec<Chunk>>,
{
    if exists(dir) {
        tracing::info!(dir = %dir.display(), "loading vector index from disk");
        let index = VectorIndex::load(dir)?;
        if index.model_name() != embedder.model_name() {
            tracing::warn!(
                index_model = index.model_name(),
                configured_model = embedder.model_name(),
                "persisted index was built with a different embedding model"
            );
        }
        return Ok(index);
    }

    tracing::info!(dir = %dir.display(), "building vector index and saving to disk");
    let chunks = chunk_source()?;
    let index = VectorIndex::build(chunks, embedder).await?;
    index.save(dir)?;
    tracing::info!(entries = index.len(), dims = index.dims(), "vector index ready");
    Ok(index)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
