//! Conversational chain behavior against stub model providers.

mod common;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{sample_chain, sample_chunks, StubChat, StubEmbedder};
use paperchat::chain::ConversationalChain;
use paperchat::embedding::EmbeddingProvider;
use paperchat::index::VectorIndex;

/// Embeds into a different space than the index was built with.
struct OtherModelEmbedder;

#[async_trait]
impl EmbeddingProvider for OtherModelEmbedder {
    fn model_name(&self) -> &str {
        "other-model"
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }

    async fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }
}

#[tokio::test]
async fn test_first_question_is_not_condensed() {
    let chat = Arc::new(StubChat::with_replies(vec![Ok("Gamma rays are energetic.")]));
    let (chain, embedder) = sample_chain(chat.clone(), 2).await;

    let result = chain.ask("tell me about gamma").await.unwrap();

    assert_eq!(result.answer, "Gamma rays are energetic.");
    assert_eq!(result.source_chunks.len(), 2);
    assert_eq!(result.source_chunks[0].chunk.metadata.source, "physics.pdf");
    assert_eq!(result.source_chunks[0].chunk.metadata.page, 4);

    let prompts = chat.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("gamma rays are energetic"));
    assert!(prompts[0].ends_with("Question: tell me about gamma\nHelpful Answer:"));
    assert_eq!(embedder.query_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_follow_up_is_condensed_with_history() {
    let chat = Arc::new(StubChat::with_replies(vec![
        Ok("Alpha is first."),
        Ok("What does delta mean?"),
        Ok("A river mouth."),
    ]));
    let (chain, _embedder) = sample_chain(chat.clone(), 1).await;

    chain.ask("what is alpha").await.unwrap();
    let second = chain.ask("and the other one?").await.unwrap();

    let prompts = chat.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[1].contains(
        "Chat History:\n\nHuman: what is alpha\nAssistant: Alpha is first.\n\
         Follow Up Input: and the other one?\nStandalone question:"
    ));
    // Retrieval and the answer prompt use the condensed question.
    assert_eq!(second.source_chunks[0].chunk.metadata.source, "geo.pdf");
    assert!(prompts[2].ends_with("Question: What does delta mean?\nHelpful Answer:"));

    let turns = chain.memory().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[1].question, "and the other one?");
    assert_eq!(turns[1].answer, "A river mouth.");
}

#[tokio::test]
async fn test_failure_leaves_memory_untouched() {
    let chat = Arc::new(StubChat::with_replies(vec![Err("quota exceeded")]));
    let (chain, _embedder) = sample_chain(chat, 4).await;

    let err = chain.ask("alpha?").await.unwrap_err();
    assert!(err.to_string().contains("quota exceeded"));
    assert!(chain.memory().is_empty());
}

#[tokio::test]
async fn test_memory_is_shared_across_callers() {
    let chat = Arc::new(StubChat::with_replies(vec![
        Ok("one"),
        Ok("standalone"),
        Ok("two"),
    ]));
    let (chain, _embedder) = sample_chain(chat, 4).await;
    let chain = Arc::new(chain);

    let a = chain.clone();
    tokio::spawn(async move { a.ask("from client A").await.unwrap() })
        .await
        .unwrap();
    let b = chain.clone();
    tokio::spawn(async move { b.ask("from client B").await.unwrap() })
        .await
        .unwrap();

    let turns = chain.memory().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].question, "from client A");
    assert_eq!(turns[1].question, "from client B");
}

#[tokio::test]
async fn test_k_bounds_sources() {
    let chat = Arc::new(StubChat::with_replies(vec![Ok("ok")]));
    let (chain, _embedder) = sample_chain(chat, 10).await;
    let result = chain.ask("alpha beta").await.unwrap();
    assert_eq!(result.source_chunks.len(), 4);
    assert_eq!(chain.index().len(), 4);
}

#[tokio::test]
async fn test_embedding_dimension_mismatch_is_an_error() {
    let index = VectorIndex::build(sample_chunks(), &StubEmbedder::default())
        .await
        .unwrap();
    let chat = Arc::new(StubChat::with_replies(vec![Ok("should not be used")]));
    let chain = ConversationalChain::new(
        Arc::new(index),
        Arc::new(OtherModelEmbedder),
        chat.clone(),
        2,
    );

    let err = chain.ask("what is alpha?").await.unwrap_err();

    assert!(format!("{:#}", err).contains("dimensions"), "{:#}", err);
    assert!(chat.prompts().is_empty());
    assert!(chain.memory().is_empty());
}
