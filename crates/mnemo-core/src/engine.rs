//! Memory engine: the single entry point the chat layer talks to.
//!
//! Owns both stores plus the model clients and enforces the failure policy:
//! memory must never break reply delivery, so every method here degrades
//! (warn log, empty result) instead of surfacing storage or model errors.
//! Construction is the only fallible surface.

use std::sync::Arc;

use crate::config::MemoryConfig;
use crate::context::ContextBuilder;
use crate::conversation::ConversationLog;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::llm::{ChatClient, Message};
use crate::profile::ProfileStore;
use crate::synthesis::{ProfileSynthesizer, summarize_conversation};

pub struct MemoryEngine {
    config: MemoryConfig,
    profiles: ProfileStore,
    conversations: ConversationLog,
    embedder: Arc<dyn EmbeddingProvider>,
    chat: Arc<dyn ChatClient>,
}

impl MemoryEngine {
    /// Build an engine over file-backed stores under `config.data_dir`,
    /// creating the directory when missing.
    pub async fn new(
        config: MemoryConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatClient>,
    ) -> Result<Self> {
        config.validate()?;

        let profiles = ProfileStore::open(&config.data_dir).await?;
        let conversations = ConversationLog::open(&config.data_dir, &config).await?;
        tracing::info!("Memory stores opened under {}", config.data_dir.display());

        Ok(Self {
            config,
            profiles,
            conversations,
            embedder,
            chat,
        })
    }

    /// Engine over in-memory stores with identical semantics, for tests.
    pub fn in_memory(
        config: MemoryConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatClient>,
    ) -> Result<Self> {
        config.validate()?;

        let profiles = ProfileStore::in_memory();
        let conversations = ConversationLog::in_memory(&config);

        Ok(Self {
            config,
            profiles,
            conversations,
            embedder,
            chat,
        })
    }

    /// Memory block for one inbound message, or `None` when there is nothing
    /// worth injecting.
    pub async fn context_for(
        &self,
        user_id: &str,
        message: &str,
        channel_id: Option<&str>,
    ) -> Option<String> {
        ContextBuilder::new(&self.profiles, &self.conversations, &self.config)
            .build(user_id, message, channel_id, self.embedder.as_ref())
            .await
    }

    /// Record the turns as a raw-turn snippet. Failures are logged and
    /// swallowed; an empty turn list records nothing.
    pub async fn record(&self, channel_id: &str, turns: &[Message]) {
        self.store_snippet(channel_id, turns, None).await;
    }

    /// Record the turns as an LLM-digested snippet.
    ///
    /// When the digest fails (or comes back empty) the raw-turn document is
    /// stored instead so the snippet is never lost to a flaky model.
    pub async fn record_summarized(&self, channel_id: &str, turns: &[Message]) {
        if turns.is_empty() {
            return;
        }

        let summary = match summarize_conversation(self.chat.as_ref(), turns).await {
            Ok(summary) => Some(summary).filter(|s| !s.is_empty()),
            Err(e) => {
                tracing::warn!("Conversation summary failed, storing raw turns: {}", e);
                None
            }
        };

        self.store_snippet(channel_id, turns, summary).await;
    }

    /// Regenerate the user's profile summary from the buffered turns.
    ///
    /// Returns the new summary, or `None` when there was no evidence to work
    /// from or synthesis failed (failure leaves the stored profile untouched).
    pub async fn refresh_profile(
        &self,
        user_id: &str,
        display_name: &str,
        turns: &[Message],
    ) -> Option<String> {
        let synthesizer = ProfileSynthesizer::new(&self.profiles, self.chat.as_ref(), &self.config);
        match synthesizer.synthesize(user_id, display_name, turns).await {
            Ok(summary) if summary.is_empty() => None,
            Ok(summary) => {
                tracing::debug!("Refreshed profile summary for user {}", user_id);
                Some(summary)
            }
            Err(e) => {
                tracing::warn!("Profile synthesis failed for user {}: {}", user_id, e);
                None
            }
        }
    }

    /// Roll `profile_refresh_chance` and refresh the profile on a hit.
    ///
    /// Keeps synthesis cost amortized across turns instead of paying an LLM
    /// call on every message.
    pub async fn maybe_refresh_profile(
        &self,
        user_id: &str,
        display_name: &str,
        turns: &[Message],
    ) -> Option<String> {
        if rand::random::<f64>() < self.config.profile_refresh_chance {
            self.refresh_profile(user_id, display_name, turns).await
        } else {
            None
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn conversations(&self) -> &ConversationLog {
        &self.conversations
    }

    async fn store_snippet(&self, channel_id: &str, turns: &[Message], summary: Option<String>) {
        if turns.is_empty() {
            return;
        }

        match self
            .conversations
            .append(channel_id, turns, summary, self.embedder.as_ref())
            .await
        {
            Ok(id) => tracing::debug!("Recorded conversation snippet {}", id),
            Err(e) => tracing::warn!("Failed to record conversation: {}", e),
        }
    }
}
