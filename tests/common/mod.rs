#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use paperchat::chain::ConversationalChain;
use paperchat::embedding::EmbeddingProvider;
use paperchat::index::VectorIndex;
use paperchat::llm::ChatModel;
use paperchat::models::{Chunk, PageMetadata};

const VOCAB: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

/// Embeds text as keyword counts over a tiny vocabulary and counts calls.
#[derive(Default)]
pub struct StubEmbedder {
    pub document_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
}

impl StubEmbedder {
    pub fn total_calls(&self) -> usize {
        self.document_calls.load(Ordering::SeqCst) + self.query_calls.load(Ordering::SeqCst)
    }
}

pub fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    VOCAB
        .iter()
        .map(|w| lower.matches(w).count() as f32)
        .collect()
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    fn model_name(&self) -> &str {
        "stub-embedding"
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| keyword_vector(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(keyword_vector(text))
    }
}

/// Returns scripted replies in order and records every prompt.
#[derive(Default)]
pub struct StubChat {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubChat {
    pub fn with_replies(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for StubChat {
    fn model_name(&self) -> &str {
        "stub-chat"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(e)) => Err(anyhow!(e)),
            None => Err(anyhow!("no scripted reply left")),
        }
    }
}

pub fn chunk(text: &str, source: &str, page: u32) -> Chunk {
    Chunk {
        text: text.to_string(),
        metadata: PageMetadata {
            source: source.to_string(),
            page,
        },
    }
}

/// A small corpus where each chunk is about one vocabulary word.
pub fn sample_chunks() -> Vec<Chunk> {
    vec![
        chunk("alpha is the first letter", "greek.pdf", 1),
        chunk("beta follows alpha", "greek.pdf", 2),
        chunk("gamma rays are energetic", "physics.pdf", 4),
        chunk("delta is a river mouth", "geo.pdf", 7),
    ]
}

pub async fn sample_chain(
    chat: Arc<StubChat>,
    k: usize,
) -> (ConversationalChain, Arc<StubEmbedder>) {
    let embedder = Arc::new(StubEmbedder::default());
    let index = VectorIndex::build(sample_chunks(), embedder.as_ref())
        .await
        .unwrap();
    let chain = ConversationalChain::new(Arc::new(index), embedder.clone(), chat, k);
    (chain, embedder)
}

/// Minimal valid PDF with one page per entry; an empty entry yields a page
/// with no text. Byte offsets in the xref table are computed as written.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let kids = (0..pages.len())
        .map(|i| format!("{} 0 R", 4 + 2 * i))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, pages.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];
    for (i, text) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents {} 0 R \
             /Resources << /Font << /F1 3 0 R >> >> >>",
            5 + 2 * i
        ));
        let stream = if text.is_empty() {
            "BT ET".to_string()
        } else {
            format!("BT /F1 12 Tf 100 700 Td ({}) Tj ET", text)
        };
        objects.push(format!(
            "<< /Length {} >> stream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj {} endobj\n", i + 1, body).as_bytes());
    }

    let xref_start = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for off in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer << /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_start
        )
        .as_bytes(),
    );
    out
}
