use anyhow::Result;
use async_trait::async_trait;

/// Text embedding provider
///
/// One vector per call; the model is fixed by the provider instance.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get model name.
    fn model_name(&self) -> &str;
}
