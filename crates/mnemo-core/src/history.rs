//! Bounded per-channel turn buffer feeding recording and synthesis.

use std::collections::VecDeque;

use crate::llm::Message;

/// Default number of turns kept per channel.
const DEFAULT_HISTORY_TURNS: usize = 20;

/// Rolling window of recent chat turns, oldest evicted first.
///
/// User turns are stored with the `"{display_name}: {content}"` rendering the
/// rest of the subsystem expects (profile synthesis matches on that prefix);
/// assistant turns are stored verbatim.
#[derive(Debug, Clone)]
pub struct TurnHistory {
    turns: VecDeque<Message>,
    capacity: usize,
}

impl TurnHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_TURNS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an inbound user turn as `"{display_name}: {content}"`.
    pub fn push_user(&mut self, display_name: &str, content: &str) {
        self.push(Message::user(format!("{}: {}", display_name, content)));
    }

    /// Record an assistant reply verbatim.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Message::assistant(content));
    }

    fn push(&mut self, message: Message) {
        if self.capacity == 0 {
            return;
        }
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(message);
    }

    /// The buffered turns, oldest first.
    pub fn turns(&self) -> Vec<Message> {
        self.turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for TurnHistory {
    fn default() -> Self {
        Self::new()
    }
}
