//! # paperchat CLI
//!
//! ## Usage
//!
//! ```bash
//! paperchat --config ./config/paperchat.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `paperchat serve` | Ingest (or load the saved index) and start the HTTP server |
//! | `paperchat index` | Build the vector index without serving |
//! | `paperchat index --rebuild` | Delete the saved index and re-embed every PDF |
//! | `paperchat ask "<question>"` | Answer one question and exit |
//!
//! `GOOGLE_API_KEY` must be set, either in the environment or in a `.env`
//! file in the working directory.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use paperchat::{ask, config, ingest, logging, server};

/// Conversational question answering over a folder of PDFs.
#[derive(Parser)]
#[command(
    name = "paperchat",
    about = "Chat with a folder of PDF documents",
    version,
    long_about = "paperchat splits the PDFs in a directory into chunks, embeds them with a \
    Gemini embedding model, and answers questions by retrieving the most relevant chunks and \
    passing them to a Gemini chat model. Answers cite the file and page they came from."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/paperchat.toml`. Built-in defaults are used when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/paperchat.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP chat server.
    ///
    /// Loads the persisted index from `[index].dir`, or builds it from the
    /// PDFs in `[data].dir` on first run, then listens on `[server].bind`.
    Serve,

    /// Build and save the vector index.
    Index {
        /// Delete the saved index first and re-embed every PDF.
        ///
        /// Needed whenever the PDF directory changes: a saved index is
        /// never refreshed automatically.
        #[arg(long)]
        rebuild: bool,
    },

    /// Ask a single question and print the answer with its sources.
    Ask {
        /// The question to ask.
        question: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let cfg = config::load_config_or_default(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            let services = ingest::Services::from_config(&cfg)?;
            let chain = ingest::build_chain(&cfg, services).await?;
            server::run_server(&cfg, Arc::new(chain)).await?;
        }
        Commands::Index { rebuild } => {
            ingest::run_index(&cfg, rebuild).await?;
        }
        Commands::Ask { question } => {
            ask::run_ask(&cfg, &question).await?;
        }
    }

    Ok(())
}
