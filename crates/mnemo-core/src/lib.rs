//! Mnemo Core - lightweight long-term memory for chat assistants
//!
//! This crate provides:
//! - Semantic recall over stored conversation snippets (embeddings + cosine
//!   similarity, linear scan)
//! - LLM-synthesized per-user profile summaries
//! - Context assembly for system-prompt injection
//! - Plain pretty-printed JSON persistence, no database
//! - A memory engine facade that never lets memory failures block replies

pub mod config;
pub mod context;
pub mod conversation;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod history;
pub mod llm;
mod persist;
pub mod profile;
pub mod similarity;
pub mod synthesis;
mod text;

// Re-export commonly used types
pub use config::MemoryConfig;
pub use context::ContextBuilder;
pub use conversation::{ConversationLog, ConversationRecord};
pub use embedding::{EmbeddingProvider, MockEmbedding};
pub use engine::MemoryEngine;
pub use error::{MemoryError, Result};
pub use history::TurnHistory;
pub use llm::{ChatClient, Message, MockChatClient, MockReply, Role};
pub use profile::ProfileStore;
pub use similarity::cosine_similarity;
pub use synthesis::{ProfileSynthesizer, summarize_conversation};
