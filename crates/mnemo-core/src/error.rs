//! Error types for the memory subsystem

use thiserror::Error;

/// Memory subsystem error types
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for memory operations
pub type Result<T> = std::result::Result<T, MemoryError>;
