use serde::Serialize;

use crate::types::{Message, MessageRole};

/// The ordered record of a conversation.
///
/// A transcript always starts with exactly one system message, which is never
/// removed.  After that it only grows, except that the most recent user message
/// can be taken back with [`Transcript::pop_user`] when its round trip fails.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Create a transcript holding only the system message.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// Append a user message.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Append an assistant message.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Remove the last message if it is a user message.
    ///
    /// Returns the removed message.  Anything else at the tail, including the
    /// system message, is left in place.
    pub fn pop_user(&mut self) -> Option<Message> {
        match self.messages.last() {
            Some(last) if last.role() == MessageRole::User => self.messages.pop(),
            _ => None,
        }
    }

    /// The system message that opens the transcript.
    pub fn system(&self) -> &Message {
        &self.messages[0]
    }

    /// All messages in conversation order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages, including the system message.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when only the system message is present.
    pub fn is_empty(&self) -> bool {
        self.messages.len() == 1
    }
}
