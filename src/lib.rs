//! # paperchat
//!
//! Conversational question answering over a folder of PDF documents.
//!
//! At startup the PDFs are split into overlapping text chunks, embedded with
//! a hosted Gemini embedding model, and stored in a vector index that is
//! persisted to disk. Each question is answered by retrieving the closest
//! chunks and handing them, together with the running conversation, to a
//! Gemini chat model. Answers come back as HTML bullet lists with links to
//! the cited PDF pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────┐   ┌──────────────┐
//! │  loader  │──▶│  chunk  │──▶│    index     │◀── faiss_index/
//! │  (PDF)   │   │         │   │ (embeddings) │
//! └──────────┘   └─────────┘   └──────┬───────┘
//!                                     │ top-k
//!                 ┌────────┐    ┌─────▼─────┐    ┌──────────┐
//!  HTTP ─────────▶│ server │───▶│   chain   │───▶│   llm    │
//!                 └────────┘    │ + memory  │    │ (Gemini) │
//!                               └───────────┘    └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`extract`] | Per-page PDF text extraction |
//! | [`loader`] | PDF directory loader |
//! | [`chunk`] | Recursive character text splitter |
//! | [`gemini`] | Generative Language API client with retry |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`llm`] | Chat model abstraction |
//! | [`index`] | Persistent vector index |
//! | [`memory`] | Shared conversation history |
//! | [`chain`] | Conversational retrieval chain |
//! | [`format`] | Answer-to-HTML formatting and citations |
//! | [`ingest`] | Startup pipeline and `index` command |
//! | [`ask`] | `ask` command |
//! | [`server`] | HTTP server |

pub mod ask;
pub mod chain;
pub mod chunk;
pub mod config;
pub mod embedding;
pub mod extract;
pub mod format;
pub mod gemini;
pub mod index;
pub mod ingest;
pub mod llm;
pub mod loader;
pub mod logging;
pub mod memory;
pub mod models;
pub mod server;
