//! A chat client that keeps an append-only transcript, relays it to a remote
//! responder over HTTP, and renders the exchange to a display surface.

// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod observability;
pub mod responder;
pub mod surface;
pub mod types;

// Re-exports
pub use client::{DEFAULT_ENDPOINT, Relay};
pub use client_logger::{ClientLogger, StderrLogger};
pub use error::{Error, FailureKind, Result};
pub use observability::register_biometrics;
pub use responder::{FnResponder, Responder};
pub use surface::{Entry, EntryKind, MemorySurface, PlainTextSurface, Surface};
pub use types::*;
