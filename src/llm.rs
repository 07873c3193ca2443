//! Chat model abstraction and the Gemini `generateContent` implementation.

use anyhow::Result;
use async_trait::async_trait;

use crate::config::ChatConfig;
use crate::gemini::GeminiClient;

/// A hosted language model that turns a prompt into text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn model_name(&self) -> &str;

    /// Send a single user prompt and return the model's reply.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct GeminiChat {
    client: GeminiClient,
    model: String,
    temperature: f32,
}

impl GeminiChat {
    pub fn new(config: &ChatConfig, base_url: &str, api_key: String) -> Result<Self> {
        let client = GeminiClient::new(base_url, api_key, config.timeout_secs, config.max_retries)?;
        Ok(Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl ChatModel for GeminiChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": self.temperature },
        });
        let url = self.client.method_url(&self.model, "generateContent");
        let json = self.client.post_json(&url, &body).await?;
        parse_generate_response(&json)
    }
}

/// Concatenates the text parts of the first candidate.
fn parse_generate_response(json: &serde_json::Value) -> Result<String> {
    let candidate = json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| match json.pointer("/promptFeedback/blockReason") {
            Some(reason) => anyhow::anyhow!("Gemini returned no candidates (blocked: {})", reason),
            None => anyhow::anyhow!("Gemini returned no candidates"),
        })?;

    let parts = candidate
        .pointer("/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid Gemini response: missing content parts"))?;

    Ok(parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect::<Vec<_>>()
        .join(""))
}
