//! `paperchat ask`: one-shot question from the command line.

use anyhow::Result;

use crate::config::Config;
use crate::format::{bullet_prompt, sources_for};
use crate::ingest::{build_chain, Services};

pub async fn run_ask(config: &Config, question: &str) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        anyhow::bail!("Question is required");
    }

    let services = Services::from_config(config)?;
    let chain = build_chain(config, services).await?;
    let result = chain.ask(&bullet_prompt(question)).await?;

    println!("{}", result.answer.trim());
    let sources = sources_for(&result.source_chunks);
    if !sources.is_empty() {
        println!();
        println!("Sources:");
        for (i, (src, hit)) in sources.iter().zip(&result.source_chunks).enumerate() {
            println!(
                "  {}. {} p.{}  (score {:.3})",
                i + 1,
                src.file,
                src.page,
                hit.score
            );
        }
    }

    Ok(())
}
