//! Chat session module.
//!
//! This module provides the session controller and the pieces the REPL
//! binary builds on:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: the transcript, the submit cycle, and rollback
//! - [`commands`]: slash command parsing

mod commands;
mod config;
mod session;

pub use crate::surface::{Entry, EntryKind, MemorySurface, PlainTextSurface, Surface};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{
    ChatArgs, ChatConfig, DEFAULT_GREETING, DEFAULT_PENDING_TEXT, DEFAULT_SYSTEM_PROMPT,
    ENDPOINT_ENV_VAR,
};
pub use session::{BUSY_NOTICE, ChatSession, SessionState, SessionStats, Submission, failure_text};
