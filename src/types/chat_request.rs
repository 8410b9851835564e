use serde::Serialize;

use crate::types::Message;

/// Body of the outbound request: the whole transcript, in order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest<'a> {
    /// Every message in the transcript, starting with the system message.
    pub messages: &'a [Message],
}

impl<'a> ChatRequest<'a> {
    /// Create a request carrying the given messages.
    pub fn new(messages: &'a [Message]) -> Self {
        Self { messages }
    }
}
