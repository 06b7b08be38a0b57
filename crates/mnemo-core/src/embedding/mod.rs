//! Embedding provider trait and the deterministic mock.

mod mock;
mod provider;

pub use mock::MockEmbedding;
pub use provider::EmbeddingProvider;
