//! Text helpers shared by the conversation log and the synthesizers.

use crate::llm::Message;

/// Truncate to at most `max_chars` characters without splitting a code point.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Render the trailing `max_turns` turns as `"{role}: {content}"` lines,
/// each content truncated to `max_chars` characters.
pub(crate) fn render_turns(turns: &[Message], max_turns: usize, max_chars: usize) -> String {
    let start = turns.len().saturating_sub(max_turns);
    turns[start..]
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), truncate_chars(&m.content, max_chars)))
        .collect::<Vec<_>>()
        .join("\n")
}
