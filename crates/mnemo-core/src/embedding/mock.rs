//! Deterministic mock embedding provider for tests.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

use super::EmbeddingProvider;

/// A mock embedding provider returning canned vectors.
///
/// Texts registered with [`with_vector`](Self::with_vector) get exactly that
/// vector; any other text falls back to a deterministic byte-histogram vector
/// so unscripted calls still embed to something nonzero. [`failing`](Self::failing)
/// builds a provider whose every call errors, for exercising degraded paths.
#[derive(Clone)]
pub struct MockEmbedding {
    model: String,
    vectors: HashMap<String, Vec<f32>>,
    fail: bool,
    calls: Arc<Mutex<usize>>,
}

impl MockEmbedding {
    pub fn new() -> Self {
        Self {
            model: "mock-embed".to_string(),
            vectors: HashMap::new(),
            fail: false,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Provider whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Register an exact text-to-vector mapping.
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }

    /// Number of embed calls made so far.
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }

    fn fallback_vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; 8];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % 8] += byte as f32 / 255.0;
        }
        vector
    }
}

impl Default for MockEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        *self.calls.lock() += 1;

        if self.fail {
            anyhow::bail!("mock embedding failure");
        }

        match self.vectors.get(text) {
            Some(vector) => Ok(vector.clone()),
            None => Ok(Self::fallback_vector(text)),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
