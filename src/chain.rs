//! Conversational retrieval chain.
//!
//! Each [`ConversationalChain::ask`] call:
//! 1. Condenses the question against the shared history into a standalone
//!    question (skipped while the history is empty).
//! 2. Embeds the standalone question and retrieves the top-k chunks.
//! 3. Asks the chat model to answer from those chunks.
//! 4. Records the turn in memory.
//!
//! Errors from any upstream call propagate unchanged and leave the memory
//! untouched.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::embedding::EmbeddingProvider;
use crate::index::VectorIndex;
use crate::llm::ChatModel;
use crate::memory::{render_turns, ConversationMemory};
use crate::models::{ChatResult, ChatTurn};

pub struct ConversationalChain {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    chat: Arc<dyn ChatModel>,
    memory: ConversationMemory,
    k: usize,
}

impl ConversationalChain {
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatModel>,
        k: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            chat,
            memory: ConversationMemory::new(),
            k,
        }
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub async fn ask(&self, question: &str) -> Result<ChatResult> {
        let history = self.memory.turns();

        let standalone = if history.is_empty() {
            question.to_string()
        } else {
            let prompt = condense_prompt(&render_turns(&history), question);
            let rephrased = self
                .chat
                .generate(&prompt)
                .await
                .context("Failed to condense follow-up question")?;
            rephrased.trim().to_string()
        };

        let query_vec = self
            .embedder
            .embed_query(&standalone)
            .await
            .context("Failed to embed question")?;
        let source_chunks = self.index.search(&query_vec, self.k)?;

        let context = source_chunks
            .iter()
            .map(|s| s.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let answer = self
            .chat
            .generate(&answer_prompt(&context, &standalone))
            .await?;

        tracing::debug!(
            sources = source_chunks.len(),
            history = history.len(),
            "answered question"
        );

        self.memory.push(ChatTurn {
            question: question.to_string(),
            answer: answer.clone(),
        });

        Ok(ChatResult {
            answer,
            source_chunks,
        })
    }
}

pub fn condense_prompt(chat_history: &str, question: &str) -> String {
    format!(
        "Given the following conversation and a follow up question, rephrase the follow up \
         question to be a standalone question, in its original language.\n\n\
         Chat History:\n{chat_history}\nFollow Up Input: {question}\nStandalone question:"
    )
}

pub fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "Use the following pieces of context to answer the question at the end. If you don't \
         know the answer, just say that you don't know, don't try to make up an answer.\n\n\
         {context}\n\nQuestion: {question}\nHelpful Answer:"
    )
}
