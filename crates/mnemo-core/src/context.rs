//! Assembles the memory block injected into system prompts.

use crate::config::MemoryConfig;
use crate::conversation::ConversationLog;
use crate::embedding::EmbeddingProvider;
use crate::profile::ProfileStore;

/// How many retrieved documents a context block may carry.
const CONTEXT_DOCUMENTS: usize = 2;

/// Composes profile summary and relevant past conversations into one block.
///
/// Both concerns are optional per call; when neither yields anything the
/// result is `None` so callers skip memory injection entirely instead of
/// prepending an empty section.
pub struct ContextBuilder<'a> {
    profiles: &'a ProfileStore,
    conversations: &'a ConversationLog,
    min_score: f32,
    include_user_summary: bool,
    include_conversation_history: bool,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(
        profiles: &'a ProfileStore,
        conversations: &'a ConversationLog,
        config: &MemoryConfig,
    ) -> Self {
        Self {
            profiles,
            conversations,
            min_score: config.min_score,
            include_user_summary: true,
            include_conversation_history: true,
        }
    }

    /// Toggle the "About this user" part. On by default.
    pub fn with_user_summary(mut self, include: bool) -> Self {
        self.include_user_summary = include;
        self
    }

    /// Toggle the retrieved-conversations part. On by default.
    pub fn with_conversation_history(mut self, include: bool) -> Self {
        self.include_conversation_history = include;
        self
    }

    /// Build the context block for one inbound message.
    ///
    /// Makes at most one embedding call (the current message doubles as the
    /// retrieval query). Returns `None` when no part produced content.
    pub async fn build(
        &self,
        user_id: &str,
        current_message: &str,
        channel_id: Option<&str>,
        embedder: &dyn EmbeddingProvider,
    ) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();

        if self.include_user_summary
            && let Some(summary) = self.profiles.get_summary(user_id).await
            && !summary.is_empty()
        {
            parts.push(format!("About this user: {}", summary));
        }

        if self.include_conversation_history {
            let documents = self
                .conversations
                .query(
                    channel_id,
                    current_message,
                    embedder,
                    CONTEXT_DOCUMENTS,
                    self.min_score,
                )
                .await;
            if !documents.is_empty() {
                parts.push(format!(
                    "Relevant past conversations:\n{}",
                    documents.join("\n---\n")
                ));
            }
        }

        if parts.is_empty() {
            return None;
        }
        Some(parts.join("\n\n"))
    }
}
