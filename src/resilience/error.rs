//! Failure taxonomy for backend calls.
//!
//! Every operation handed to the executor fails with a [`CallError`]: a
//! message plus a machine-inspectable [`ErrorKind`]. The kind drives retry
//! decisions; the message is preserved verbatim for the caller.

use std::time::Duration;
use thiserror::Error;

/// Machine-inspectable category of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Backend credential missing or rejected.
    Authentication,
    /// DNS, connection refused/reset, fetch failure.
    Network,
    /// Local deadline exceeded, or the remote side reported a timeout.
    Timeout,
    /// Explicitly transient upstream failure (429, 502, 503).
    Transient,
    /// Backend answered without a usable payload.
    MalformedResponse,
    /// Anything else.
    Other,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Authentication => "authentication",
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Transient => "transient",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::Other => "other",
        }
    }
}

/// How a final failure is surfaced to the end user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Authentication,
    Network,
    Timeout,
    Other,
}

/// A failed backend call.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CallError {
    kind: ErrorKind,
    message: String,
}

impl CallError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// Local deadline expiry for a single attempt.
    pub fn timeout(after: Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("Operation timeout after {} ms", after.as_millis()),
        )
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transient, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedResponse, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Other, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Classify the failure for user-facing translation.
    ///
    /// Tags win; untagged failures fall back to message inspection so that
    /// errors bubbling up from lower layers still land in the right bucket.
    pub fn class(&self) -> FailureClass {
        match self.kind {
            ErrorKind::Authentication => return FailureClass::Authentication,
            ErrorKind::Network => return FailureClass::Network,
            ErrorKind::Timeout => return FailureClass::Timeout,
            _ => {}
        }

        if self.message.contains("Unauthorized") {
            return FailureClass::Authentication;
        }

        let message = self.message.to_lowercase();
        if message.contains("connect timeout")
            || message.contains("fetch failed")
            || message.contains("connection")
        {
            FailureClass::Network
        } else if message.contains("timeout") {
            FailureClass::Timeout
        } else {
            FailureClass::Other
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.class() == FailureClass::Timeout
    }

    pub fn is_network(&self) -> bool {
        self.class() == FailureClass::Network
    }
}

/// Result type for backend calls.
pub type CallResult<T> = Result<T, CallError>;
