//! The responder capability.
//!
//! A responder maps a transcript to a reply or an error.  The HTTP
//! implementation lives in [`crate::client::Relay`]; [`FnResponder`] wraps a
//! plain function so sessions can be driven without a network.

use std::sync::Arc;

use crate::error::Result;
use crate::types::{Message, Reply};

/// Something that answers a transcript.
///
/// Implementations must classify their own failures: a failed exchange is
/// [`Error::Transport`](crate::Error::Transport), an error reported by the far
/// side is [`Error::Responder`](crate::Error::Responder), and an unusable reply
/// is [`Error::Format`](crate::Error::Format).
#[async_trait::async_trait]
pub trait Responder: Send + Sync {
    /// Produce a reply to the given messages.
    async fn respond(&self, messages: &[Message]) -> Result<Reply>;
}

#[async_trait::async_trait]
impl<R: Responder + ?Sized> Responder for Arc<R> {
    async fn respond(&self, messages: &[Message]) -> Result<Reply> {
        self.as_ref().respond(messages).await
    }
}

#[async_trait::async_trait]
impl<R: Responder + ?Sized> Responder for Box<R> {
    async fn respond(&self, messages: &[Message]) -> Result<Reply> {
        self.as_ref().respond(messages).await
    }
}

/// A responder backed by a synchronous function.
///
/// # Example
///
/// ```
/// use relaychat::{FnResponder, Message, Reply};
///
/// let echo = FnResponder::new(|messages: &[Message]| {
///     let last = messages.last().map(|m| m.content().to_string()).unwrap_or_default();
///     Ok(Reply::new(last))
/// });
/// # let _ = echo;
/// ```
pub struct FnResponder<F> {
    func: F,
}

impl<F> FnResponder<F>
where
    F: Fn(&[Message]) -> Result<Reply> + Send + Sync,
{
    /// Wrap a function as a responder.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait::async_trait]
impl<F> Responder for FnResponder<F>
where
    F: Fn(&[Message]) -> Result<Reply> + Send + Sync,
{
    async fn respond(&self, messages: &[Message]) -> Result<Reply> {
        (self.func)(messages)
    }
}
