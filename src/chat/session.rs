//! Core chat session management.
//!
//! This module provides the `ChatSession` struct, which owns the transcript,
//! renders to a [`Surface`], and relays each submission to a [`Responder`].

use std::sync::Arc;

use parking_lot::Mutex;

use crate::chat::config::ChatConfig;
use crate::client_logger::ClientLogger;
use crate::error::{Error, FailureKind, Result};
use crate::observability::{
    SESSION_ABANDONED, SESSION_FORMAT_ERRORS, SESSION_IGNORED, SESSION_REJECTED, SESSION_RESPONDER_ERRORS,
    SESSION_ROLLBACKS, SESSION_SUBMISSIONS, SESSION_SUCCESSES, SESSION_TRANSPORT_ERRORS,
};
use crate::responder::Responder;
use crate::surface::{Entry, Surface};
use crate::types::{Reply, Transcript, Usage};

/// Notice shown when a submission arrives while another is pending.
pub const BUSY_NOTICE: &str =
    "Still waiting for the previous reply. Please wait before sending another message.";

/// Where a session is in its submit cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Ready for a submission.
    Idle,
    /// A request is in flight.
    Pending,
}

/// What a call to [`ChatSession::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The input was blank; nothing happened.
    Ignored,
    /// The responder answered and the reply was recorded.
    Replied(Reply),
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Messages in the transcript, including the system message.
    pub message_count: usize,
    /// Submissions that reached the responder.
    pub submissions: u64,
    /// Submissions that produced a reply.
    pub successes: u64,
    /// Submissions that failed and were rolled back.
    pub failures: u64,
    /// Failures at the transport level.
    pub transport_errors: u64,
    /// Failures reported by the responder.
    pub responder_errors: u64,
    /// Failures caused by a malformed reply.
    pub format_errors: u64,
    /// Submissions turned away because another was pending.
    pub rejected: u64,
    /// Submissions dropped before an outcome was observed.
    pub abandoned: u64,
    /// Token usage summed over every reply that reported it.
    pub total_usage: Usage,
    /// Token usage of the last reply, if reported.
    pub last_turn_usage: Option<Usage>,
}

struct SessionInner {
    transcript: Transcript,
    state: SessionState,
    stats: SessionStats,
}

impl SessionInner {
    fn rollback(&mut self) {
        self.transcript.pop_user();
        self.state = SessionState::Idle;
    }
}

/// A chat session that manages the transcript and responder interaction.
///
/// `submit` takes `&self`, so several submissions may be polled at once.  Only
/// one may be pending; the others are rejected with [`Error::Busy`].
pub struct ChatSession<R: Responder, S: Surface> {
    responder: R,
    surface: S,
    config: ChatConfig,
    logger: Option<Arc<dyn ClientLogger>>,
    inner: Mutex<SessionInner>,
}

impl<R: Responder, S: Surface> ChatSession<R, S> {
    /// Creates a new chat session.
    pub fn new(responder: R, surface: S, config: ChatConfig) -> Self {
        let transcript = Transcript::new(config.system_prompt.clone());
        Self {
            responder,
            surface,
            config,
            logger: None,
            inner: Mutex::new(SessionInner {
                transcript,
                state: SessionState::Idle,
                stats: SessionStats::default(),
            }),
        }
    }

    /// Attach a diagnostic logger for failed submissions.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Render the configured greeting.
    ///
    /// The greeting is display-only and never enters the transcript.
    pub fn greet(&self) {
        if let Some(greeting) = &self.config.greeting {
            self.surface.append(Entry::assistant(greeting.clone()));
        }
    }

    /// Submits user text and waits for the reply.
    ///
    /// This method:
    /// 1. Appends the trimmed text to the transcript and renders it
    /// 2. Renders the pending indicator
    /// 3. Sends the whole transcript to the responder
    /// 4. Removes the pending indicator
    /// 5. Records and renders the reply, or rolls back and renders an error
    ///
    /// Blank input is ignored.  If the returned future is dropped while the
    /// request is in flight, the submission is rolled back as if it failed.
    ///
    /// # Errors
    ///
    /// Returns the responder's error after it has been rendered, or
    /// [`Error::Busy`] if another submission is pending.
    pub async fn submit(&self, raw_text: &str) -> Result<Submission> {
        let text = raw_text.trim();
        if text.is_empty() {
            SESSION_IGNORED.click();
            return Ok(Submission::Ignored);
        }

        let messages = {
            let mut inner = self.inner.lock();
            if inner.state == SessionState::Pending {
                inner.stats.rejected += 1;
                None
            } else {
                inner.transcript.push_user(text);
                inner.state = SessionState::Pending;
                inner.stats.submissions += 1;
                Some(inner.transcript.messages().to_vec())
            }
        };
        let Some(messages) = messages else {
            SESSION_REJECTED.click();
            self.surface.append(Entry::notice(BUSY_NOTICE));
            return Err(Error::busy());
        };

        SESSION_SUBMISSIONS.click();
        self.surface.append(Entry::user(text));
        self.surface.append(Entry::pending(self.config.pending_text.clone()));

        let mut in_flight = InFlight {
            inner: &self.inner,
            surface: &self.surface,
            armed: true,
        };
        let result = self
            .responder
            .respond(&messages)
            .await
            .and_then(|reply| {
                if reply.content.is_empty() {
                    Err(Error::format())
                } else {
                    Ok(reply)
                }
            });
        in_flight.armed = false;
        self.surface.remove_pending();

        match result {
            Ok(reply) => {
                {
                    let mut inner = self.inner.lock();
                    inner.transcript.push_assistant(reply.content.clone());
                    inner.state = SessionState::Idle;
                    inner.stats.successes += 1;
                    inner.stats.last_turn_usage = reply.usage;
                    if let Some(usage) = reply.usage {
                        inner.stats.total_usage = inner.stats.total_usage + usage;
                    }
                }
                SESSION_SUCCESSES.click();
                self.surface.append(Entry::assistant(reply.content.clone()));
                Ok(Submission::Replied(reply))
            }
            Err(err) => {
                {
                    let mut inner = self.inner.lock();
                    inner.rollback();
                    inner.stats.failures += 1;
                    match err.kind() {
                        Some(FailureKind::Transport) => inner.stats.transport_errors += 1,
                        Some(FailureKind::Responder) => inner.stats.responder_errors += 1,
                        Some(FailureKind::Format) => inner.stats.format_errors += 1,
                        None => {}
                    }
                }
                SESSION_ROLLBACKS.click();
                match err.kind() {
                    Some(FailureKind::Transport) => SESSION_TRANSPORT_ERRORS.click(),
                    Some(FailureKind::Responder) => SESSION_RESPONDER_ERRORS.click(),
                    Some(FailureKind::Format) => SESSION_FORMAT_ERRORS.click(),
                    None => {}
                }
                if let Some(logger) = &self.logger {
                    logger.log_error(&err);
                }
                self.surface.append(Entry::error(failure_text(&err)));
                Err(err)
            }
        }
    }

    /// Starts over with a transcript holding only the system message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] while a submission is pending.
    pub fn reset(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state == SessionState::Pending {
            return Err(Error::busy());
        }
        inner.transcript = Transcript::new(self.config.system_prompt.clone());
        Ok(())
    }

    /// A snapshot of the transcript.
    pub fn transcript(&self) -> Transcript {
        self.inner.lock().transcript.clone()
    }

    /// Returns the number of messages in the transcript.
    pub fn message_count(&self) -> usize {
        self.inner.lock().transcript.len()
    }

    /// The current submit state.
    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        let inner = self.inner.lock();
        SessionStats {
            message_count: inner.transcript.len(),
            ..inner.stats.clone()
        }
    }

    /// The system instructions that open every transcript.
    pub fn system_prompt(&self) -> &str {
        &self.config.system_prompt
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// The session configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// The display surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The responder.
    pub fn responder(&self) -> &R {
        &self.responder
    }
}

/// Rolls a submission back if its future is dropped mid-flight.
struct InFlight<'a, S: Surface> {
    inner: &'a Mutex<SessionInner>,
    surface: &'a S,
    armed: bool,
}

impl<S: Surface> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.surface.remove_pending();
        let mut inner = self.inner.lock();
        inner.rollback();
        inner.stats.abandoned += 1;
        SESSION_ROLLBACKS.click();
        SESSION_ABANDONED.click();
    }
}

/// Text of the error entry rendered for a failed submission.
pub fn failure_text(err: &Error) -> String {
    format!("Sorry, an error occurred: {err}. Please try again.")
}
