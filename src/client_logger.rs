//! Diagnostic logging for relay traffic.
//!
//! This module provides the [`ClientLogger`] trait, which receives every
//! outbound transcript, every parsed response, and every failed submission.
//! It is meant for developers; nothing logged here is shown in the chat.

use crate::Error;
use crate::types::{ChatResponse, Message};

/// A trait for logging relay operations.
///
/// # Example
///
/// ```rust,ignore
/// use relaychat::{ChatResponse, ClientLogger, Error, Message};
/// use std::io::Write;
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_request(&self, endpoint: &str, messages: &[Message]) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "POST {endpoint}: {} messages", messages.len()).unwrap();
///     }
///
///     fn log_response(&self, status: u16, response: &ChatResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{status}: {}", serde_json::to_string(response).unwrap()).unwrap();
///     }
///
///     fn log_error(&self, error: &Error) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "error: {error}").unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a transcript about to be sent.
    fn log_request(&self, endpoint: &str, messages: &[Message]);

    /// Log a response body that parsed successfully.
    ///
    /// This is called before the response is classified, so it also sees
    /// responses that carry an error or no reply.
    fn log_response(&self, status: u16, response: &ChatResponse);

    /// Log a failed submission.
    fn log_error(&self, error: &Error);
}

/// Writes diagnostics to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrLogger;

impl ClientLogger for StderrLogger {
    fn log_request(&self, endpoint: &str, messages: &[Message]) {
        eprintln!("[relaychat] POST {endpoint} ({} messages)", messages.len());
    }

    fn log_response(&self, status: u16, response: &ChatResponse) {
        match serde_json::to_string(response) {
            Ok(json) => eprintln!("[relaychat] {status} {json}"),
            Err(e) => eprintln!("[relaychat] {status} <serialization error: {e}>"),
        }
    }

    fn log_error(&self, error: &Error) {
        match error {
            Error::Transport {
                status_code: Some(_),
                message,
                ..
            } if !message.is_empty() => {
                eprintln!("[relaychat] error in chat submission: {error}: {message}")
            }
            _ => eprintln!("[relaychat] error in chat submission: {error}"),
        }
    }
}
