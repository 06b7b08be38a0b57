//! Deterministic mock chat client for tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ChatClient, Message, Role};
use crate::error::{MemoryError, Result};

/// Scripted reply for the mock chat client.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return a plain assistant reply.
    Text(String),
    /// Return a chat error.
    Error(String),
}

impl MockReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }
}

/// A deterministic mock chat client driven by scripted replies.
///
/// With an empty script every call echoes the last user message, so tests
/// that only need "some reply" work without setup. Requests are recorded for
/// asserting on prompts and call counts.
#[derive(Debug, Clone, Default)]
pub struct MockChatClient {
    model: String,
    script: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockChatClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn from_replies(model: impl Into<String>, replies: Vec<MockReply>) -> Self {
        Self {
            model: model.into(),
            script: Arc::new(Mutex::new(VecDeque::from(replies))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push_reply(&self, reply: MockReply) {
        self.script.lock().push_back(reply);
    }

    /// Number of chat calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Messages of the most recent chat call.
    pub fn last_messages(&self) -> Option<Vec<Message>> {
        self.calls.lock().last().cloned()
    }

    fn fallback_reply(messages: &[Message]) -> String {
        messages
            .iter()
            .rev()
            .find(|msg| matches!(msg.role, Role::User))
            .map(|msg| format!("mock-echo: {}", msg.content))
            .unwrap_or_else(|| "mock-ok".to_string())
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, messages: &[Message]) -> Result<String> {
        self.calls.lock().push(messages.to_vec());

        let reply = self.script.lock().pop_front();
        match reply {
            None => Ok(Self::fallback_reply(messages)),
            Some(MockReply::Text(content)) => Ok(content),
            Some(MockReply::Error(message)) => Err(MemoryError::Chat(message)),
        }
    }
}
