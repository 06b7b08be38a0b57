//! Chat client trait, message types, and the scripted mock.

mod client;
mod mock;

pub use client::{ChatClient, Message, Role};
pub use mock::{MockChatClient, MockReply};
