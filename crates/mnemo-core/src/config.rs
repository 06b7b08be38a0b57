//! Memory subsystem configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{MemoryError, Result};

// Default configuration constants
const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
const DEFAULT_CHAT_MODEL: &str = "gpt-oss:20b";
const DEFAULT_DATA_DIR: &str = "./mnemo_memory";
const DEFAULT_MAX_RECORDS: usize = 500;
const DEFAULT_TOP_N: usize = 3;
const DEFAULT_MIN_SCORE: f32 = 0.3;
const DEFAULT_SNIPPET_MAX_CHARS: usize = 200;
const DEFAULT_SUMMARY_WORD_LIMIT: usize = 100;
const DEFAULT_PROFILE_REFRESH_CHANCE: f64 = 0.1;

/// Memory subsystem configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Embedding model name the embedding provider is configured with.
    pub embedding_model: String,
    /// Chat model name used for summary synthesis.
    pub chat_model: String,
    /// Directory holding the two JSON store files.
    pub data_dir: PathBuf,
    /// Maximum conversation records kept before FIFO eviction.
    pub max_records: usize,
    /// Number of documents retrieval returns by default.
    pub top_n: usize,
    /// Similarity threshold; results scoring at or below it are dropped.
    pub min_score: f32,
    /// Per-turn character cap when rendering raw-turn documents.
    pub snippet_max_chars: usize,
    /// Word-limit guidance embedded in the profile prompt.
    pub summary_word_limit: usize,
    /// Probability that a turn triggers profile synthesis.
    pub profile_refresh_chance: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            max_records: DEFAULT_MAX_RECORDS,
            top_n: DEFAULT_TOP_N,
            min_score: DEFAULT_MIN_SCORE,
            snippet_max_chars: DEFAULT_SNIPPET_MAX_CHARS,
            summary_word_limit: DEFAULT_SUMMARY_WORD_LIMIT,
            profile_refresh_chance: DEFAULT_PROFILE_REFRESH_CHANCE,
        }
    }
}

impl MemoryConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.max_records == 0 {
            return Err(MemoryError::Config(
                "max_records must be at least 1".to_string(),
            ));
        }

        if self.top_n == 0 {
            return Err(MemoryError::Config("top_n must be at least 1".to_string()));
        }

        if !(-1.0..=1.0).contains(&self.min_score) {
            return Err(MemoryError::Config(
                "min_score must be within [-1, 1]".to_string(),
            ));
        }

        if self.snippet_max_chars == 0 {
            return Err(MemoryError::Config(
                "snippet_max_chars must be at least 1".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.profile_refresh_chance) {
            return Err(MemoryError::Config(
                "profile_refresh_chance must be within [0, 1]".to_string(),
            ));
        }

        Ok(())
    }
}
