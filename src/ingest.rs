//! Ingestion pipeline orchestration.
//!
//! Coordinates the startup flow: PDF directory → pages → chunks → embedded
//! vector index. When a persisted index exists the whole pipeline is skipped
//! and the index is loaded as-is.

use anyhow::Result;
use std::sync::Arc;

use crate::chain::ConversationalChain;
use crate::chunk::{chunk_pages, RecursiveSplitter};
use crate::config::{self, Config};
use crate::embedding::{EmbeddingProvider, GoogleEmbeddings};
use crate::index::{self, VectorIndex};
use crate::llm::{ChatModel, GeminiChat};
use crate::loader::load_pdf_pages;
use crate::models::Chunk;

/// The hosted model clients used by the chain.
pub struct Services {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub chat: Arc<dyn ChatModel>,
}

impl Services {
    /// Builds the Gemini clients. Fails if `GOOGLE_API_KEY` is not set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config::api_key()?;
        let embedder =
            GoogleEmbeddings::new(&config.embedding, config.embedding_url(), api_key.clone())?;
        let chat = GeminiChat::new(&config.chat, config.chat_url(), api_key)?;
        Ok(Self {
            embedder: Arc::new(embedder),
            chat: Arc::new(chat),
        })
    }
}

/// Read and chunk every PDF page in `[data].dir`.
pub fn load_chunks(config: &Config) -> Result<Vec<Chunk>> {
    let splitter =
        RecursiveSplitter::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?;
    let pages = load_pdf_pages(&config.data.dir)?;
    Ok(chunk_pages(&pages, &splitter))
}

/// Load the persisted index or build it from the PDF directory.
pub async fn open_index(config: &Config, embedder: &dyn EmbeddingProvider) -> Result<VectorIndex> {
    index::open_or_build(&config.index.dir, embedder, || load_chunks(config)).await
}

/// Run ingestion and wire up a ready-to-use chain.
pub async fn build_chain(config: &Config, services: Services) -> Result<ConversationalChain> {
    let index = open_index(config, services.embedder.as_ref()).await?;
    Ok(ConversationalChain::new(
        Arc::new(index),
        services.embedder,
        services.chat,
        config.retrieval.k,
    ))
}

/// `paperchat index`: build (or rebuild) and persist the vector index.
pub async fn run_index(config: &Config, rebuild: bool) -> Result<()> {
    let services = Services::from_config(config)?;
    if rebuild {
        index::remove(&config.index.dir)?;
    }

    let already_built = index::exists(&config.index.dir);
    let index = open_index(config, services.embedder.as_ref()).await?;

    println!("index {}", config.index.dir.display());
    if already_built {
        println!("  loaded existing index (use --rebuild to re-embed)");
    } else {
        println!("  built from: {}", config.data.dir.display());
    }
    println!("  entries: {}", index.len());
    println!("  dimensions: {}", index.dims());
    println!("  model: {}", index.model_name());
    println!("ok");

    Ok(())
}
