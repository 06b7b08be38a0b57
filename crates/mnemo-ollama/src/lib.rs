//! Ollama-backed implementations of the memory model traits.
//!
//! Talks to an Ollama server over its native HTTP API: `/api/embed` for
//! embeddings and `/api/chat` for chat completions (always non-streaming).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use mnemo_core::{ChatClient, EmbeddingProvider, MemoryConfig, MemoryError, Message};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Ollama client serving both the embedding and the chat seam.
pub struct OllamaClient {
    client: Client,
    base_url: String,
    chat_model: String,
    embedding_model: String,
}

impl OllamaClient {
    /// Client against a local Ollama with the default model names.
    pub fn new() -> Self {
        Self::from_config(&MemoryConfig::default())
    }

    /// Client with model names taken from `config`.
    pub fn from_config(config: &MemoryConfig) -> Self {
        Self {
            client: build_http_client(),
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
        }
    }

    /// Set a custom base URL (for non-local Ollama hosts)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the chat model to use
    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    /// Set the embedding model to use
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

fn build_http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .expect("Failed to build reqwest client")
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let request = EmbedRequest {
            model: &self.embedding_model,
            input: text,
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            anyhow::bail!("Ollama embed error {}: {}", status, error_text);
        }

        let data: EmbedResponse = response.json().await?;
        data.embeddings
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No embedding returned"))
    }

    fn model_name(&self) -> &str {
        &self.embedding_model
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    fn model(&self) -> &str {
        &self.chat_model
    }

    async fn chat(&self, messages: &[Message]) -> mnemo_core::Result<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| MemoryError::Chat(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .map_err(|e| MemoryError::Chat(e.to_string()))?;
            return Err(MemoryError::Chat(format!(
                "Ollama chat error {}: {}",
                status, error_text
            )));
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| MemoryError::Chat(e.to_string()))?;

        Ok(data.message.content)
    }
}
