//! LLM-backed summary synthesis: user profiles and conversation digests.

use crate::config::MemoryConfig;
use crate::error::Result;
use crate::llm::{ChatClient, Message, Role};
use crate::profile::ProfileStore;
use crate::text::render_turns;

/// How many of a user's recent turns feed the profile prompt.
const PROFILE_EVIDENCE_TURNS: usize = 10;

/// How many trailing turns feed the conversation summary prompt.
const SUMMARY_TURNS: usize = 10;

/// Per-turn character cap when rendering turns for the summary prompt.
const SUMMARY_TURN_MAX_CHARS: usize = 300;

/// Synthesizes a user's profile summary from their recent turns and stores it.
pub struct ProfileSynthesizer<'a> {
    profiles: &'a ProfileStore,
    chat: &'a dyn ChatClient,
    word_limit: usize,
}

impl<'a> ProfileSynthesizer<'a> {
    pub fn new(profiles: &'a ProfileStore, chat: &'a dyn ChatClient, config: &MemoryConfig) -> Self {
        Self {
            profiles,
            chat,
            word_limit: config.summary_word_limit,
        }
    }

    /// Regenerate and store the summary for `user_id`.
    ///
    /// Evidence is the user's own turns: `Role::User` entries whose content
    /// carries the `"{display_name}:"` prefix the chat layer prepends, capped
    /// to the last 10. Without evidence this is a no-op returning an empty
    /// string; nothing is written and no LLM call is made. Otherwise the chat
    /// model rewrites the whole summary (prior facts are carried forward
    /// through the prompt, not merged field by field) and the result replaces
    /// the stored value.
    pub async fn synthesize(
        &self,
        user_id: &str,
        user_display_name: &str,
        recent_turns: &[Message],
    ) -> Result<String> {
        let prefix = format!("{}:", user_display_name);
        let evidence: Vec<&str> = recent_turns
            .iter()
            .filter(|m| matches!(m.role, Role::User) && m.content.starts_with(&prefix))
            .map(|m| m.content.as_str())
            .collect();

        if evidence.is_empty() {
            return Ok(String::new());
        }

        let start = evidence.len().saturating_sub(PROFILE_EVIDENCE_TURNS);
        let messages_text = evidence[start..].join("\n");

        let existing_context = match self.profiles.get_summary(user_id).await {
            Some(existing) if !existing.is_empty() => {
                format!("Previous summary: {}\n\n", existing)
            }
            _ => String::new(),
        };

        let prompt = format!(
            "{existing_context}Based on these recent messages from {user_display_name}, \
             write a brief summary of what you know about them.\n\
             Include: personality traits, interests, how they communicate, any facts they've shared.\n\
             Keep it under {word_limit} words. Be factual, not speculative.\n\
             \n\
             Recent messages:\n\
             {messages_text}",
            word_limit = self.word_limit,
        );

        let summary = self.chat.chat(&[Message::user(prompt)]).await?;
        self.profiles.set_summary(user_id, summary.as_str()).await?;

        Ok(summary)
    }
}

/// Digest the trailing turns of a conversation into a 2-3 sentence summary.
///
/// The result is meant to become the stored document of a conversation
/// record; it is not persisted here.
pub async fn summarize_conversation(chat: &dyn ChatClient, turns: &[Message]) -> Result<String> {
    let conversation_text = render_turns(turns, SUMMARY_TURNS, SUMMARY_TURN_MAX_CHARS);

    let prompt = format!(
        "Summarize this conversation in 2-3 sentences. Focus on the main topic \
         and any important information exchanged.\n\
         \n\
         {conversation_text}"
    );

    chat.chat(&[Message::user(prompt)]).await
}
