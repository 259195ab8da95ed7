//! Error types for the job lifecycle client.
//!
//! Failures fall into three families that callers handle differently:
//! - [`TransportError`]: the network or HTTP layer failed; usually worth retrying
//! - [`ProtocolError`]: the provider answered with something that breaks the contract
//! - [`Error::Timeout`]: the job is still running when the deadline passed; the
//!   carried [`JobHandle`] lets the caller resume later instead of resubmitting

use std::fmt;
use std::time::Duration;

use crate::job::{JobHandle, JobStatus};

/// Result type alias for job lifecycle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the job lifecycle client.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Network or HTTP-layer failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response violated the expected contract.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The deadline passed while the job was still non-terminal.
    #[error(
        "job {} on endpoint {} still {last_status} after {:.1}s",
        .handle.job_id(),
        .handle.endpoint().id(),
        .elapsed.as_secs_f64()
    )]
    Timeout {
        /// Handle for resuming the poll sequence later.
        handle: JobHandle,
        /// Status observed on the last poll.
        last_status: JobStatus,
        /// Wall-clock time spent polling.
        elapsed: Duration,
    },

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether a single failed call may be attempted again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_retryable(),
            _ => false,
        }
    }
}

/// Error raised by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    /// The error kind.
    pub kind: TransportErrorKind,
    /// Human readable detail.
    pub message: String,
}

/// Categories of transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportErrorKind {
    /// Connection, DNS or body read failure.
    Network,
    /// The request did not finish within the configured request timeout.
    Timeout,
    /// The credential was rejected (401/403).
    Unauthorized,
    /// The endpoint or job does not exist (404).
    NotFound,
    /// Any other non-success HTTP status.
    Status(u16),
}

impl TransportError {
    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Network,
            message: message.into(),
        }
    }

    /// Create a request timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Timeout,
            message: message.into(),
        }
    }

    /// Create an error from a non-success HTTP status and its body.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        let kind = match status {
            401 | 403 => TransportErrorKind::Unauthorized,
            404 => TransportErrorKind::NotFound,
            other => TransportErrorKind::Status(other),
        };
        Self {
            kind,
            message: format!("HTTP {status}: {}", body.into()),
        }
    }

    /// Whether the failure is transient.
    ///
    /// Client errors other than 408 and 429 will not go away on their own.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self.kind {
            TransportErrorKind::Network | TransportErrorKind::Timeout => true,
            TransportErrorKind::Unauthorized | TransportErrorKind::NotFound => false,
            TransportErrorKind::Status(code) => !matches!(code, 400..=499) || code == 408 || code == 429,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TransportErrorKind::Network => write!(f, "network error: {}", self.message),
            TransportErrorKind::Timeout => write!(f, "request timed out: {}", self.message),
            TransportErrorKind::Unauthorized => {
                write!(f, "credential rejected: {}", self.message)
            }
            TransportErrorKind::NotFound => write!(f, "not found: {}", self.message),
            TransportErrorKind::Status(_) => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(err.to_string())
        } else if let Some(status) = err.status() {
            Self::http_status(status.as_u16(), err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

/// The provider's response did not match the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// A submit response carried no job identifier.
    #[error("response has no job id")]
    MissingJobId,

    /// The response body was not valid JSON.
    #[error("invalid response body: {0}")]
    InvalidBody(String),

    /// Too many consecutive polls returned a status we could not interpret.
    #[error("unrecognized job status {status:?} on {occurrences} consecutive polls")]
    UnrecognizedStatus {
        /// The last raw status value, if any.
        status: Option<String>,
        /// How many polls in a row were unrecognized.
        occurrences: u32,
    },

    /// A completed job had no result at any candidate path.
    #[error("completed job has no result at any of {tried:?}")]
    NoResult {
        /// The JSON pointers that were tried, in order.
        tried: Vec<String>,
    },
}
