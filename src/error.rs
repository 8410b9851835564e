//! Error types for relaychat.
//!
//! Every failure a submission can observe is one of three kinds: the request
//! never produced a successful HTTP exchange, the responder reported an error
//! of its own, or the reply did not have the expected shape.  The remaining
//! variants cover local problems such as a bad endpoint URL.

use std::error;
use std::fmt;
use std::sync::Arc;

/// The three ways a submission can fail once it has been sent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Network failure or non-success status code.
    Transport,
    /// The responder returned an application-level error payload.
    Responder,
    /// The reply was missing, empty, or not the expected shape.
    Format,
}

/// The main error type for relaychat.
#[derive(Clone, Debug)]
pub enum Error {
    /// The request failed at the transport level.
    Transport {
        /// HTTP status code, when the server answered at all.
        status_code: Option<u16>,
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The responder answered successfully but reported an error.
    Responder {
        /// Error text reported by the responder.
        message: String,
        /// Error type string from the responder, if any.
        error_type: Option<String>,
    },

    /// The reply payload was malformed or empty.
    Format {
        /// Human-readable error message.
        message: String,
    },

    /// A submission was attempted while another one was still pending.
    Busy,

    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A URL parsing error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },

    /// Error during validation of configuration or input.
    Validation {
        /// Human-readable error message.
        message: String,
        /// Parameter that failed validation.
        param: Option<String>,
    },
}

/// Message used for every reply that cannot be interpreted.
pub const INVALID_RESPONSE_FORMAT: &str = "Invalid response format from server";

impl Error {
    /// Creates a transport error for a non-success status code.
    pub fn status(status_code: u16, message: impl Into<String>) -> Self {
        Error::Transport {
            status_code: Some(status_code),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transport error for a request that never got a status.
    pub fn transport(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Transport {
            status_code: None,
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a responder-reported error.
    pub fn responder(message: impl Into<String>, error_type: Option<String>) -> Self {
        Error::Responder {
            message: message.into(),
            error_type,
        }
    }

    /// Creates the generic invalid response format error.
    pub fn format() -> Self {
        Error::Format {
            message: INVALID_RESPONSE_FORMAT.to_string(),
        }
    }

    /// Creates a busy error.
    pub fn busy() -> Self {
        Error::Busy
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Creates a new validation error.
    pub fn validation(message: impl Into<String>, param: Option<String>) -> Self {
        Error::Validation {
            message: message.into(),
            param,
        }
    }

    /// Returns the submission failure class of this error, if it has one.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Error::Transport { .. } => Some(FailureKind::Transport),
            Error::Responder { .. } => Some(FailureKind::Responder),
            Error::Format { .. } => Some(FailureKind::Format),
            _ => None,
        }
    }

    /// Returns true if this error is a transport failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }

    /// Returns true if this error was reported by the responder.
    pub fn is_responder(&self) -> bool {
        matches!(self, Error::Responder { .. })
    }

    /// Returns true if this error is a malformed reply.
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format { .. })
    }

    /// Returns true if a submission was rejected because another was pending.
    pub fn is_busy(&self) -> bool {
        matches!(self, Error::Busy)
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Transport { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport {
                status_code: Some(status_code),
                ..
            } => {
                write!(f, "Server request failed with status {status_code}")
            }
            Error::Transport { message, .. } => {
                write!(f, "Server request failed: {message}")
            }
            Error::Responder { message, .. } => {
                write!(f, "{message}")
            }
            Error::Format { message } => {
                write!(f, "{message}")
            }
            Error::Busy => {
                write!(f, "A reply is still pending")
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
            Error::Validation { message, param } => {
                if let Some(param) = param {
                    write!(f, "Validation error: {message} (parameter: {param})")
                } else {
                    write!(f, "Validation error: {message}")
                }
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Transport { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

/// A specialized Result type for relaychat operations.
pub type Result<T> = std::result::Result<T, Error>;
