//! Enumeration error types.
//!
//! ## Security Note
//!
//! Error messages must not leak credential material. Bind failures carry
//! the directory's response, never the password or hash that was sent.

use std::time::Duration;

use thiserror::Error;

/// Boxed underlying cause reported by a directory collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while running an enumeration job.
#[derive(Debug, Error)]
pub enum SweepError {
    /// Invalid job, credential or query configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Connect or bind failed (bad credentials, unreachable host, rejected bind).
    #[error("authentication failed: {0}")]
    Authentication(#[source] DirectoryFailure),

    /// Search or paging failed mid-stream.
    #[error("query failed: {0}")]
    Query(#[source] DirectoryFailure),

    /// The job was cancelled between page pulls.
    #[error("enumeration cancelled")]
    Cancelled,
}

/// Underlying reason for an authentication or query failure.
#[derive(Debug, Error)]
pub enum DirectoryFailure {
    /// The operation exceeded its deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// The directory or the transport reported an error.
    #[error("{message}")]
    Transport {
        /// Human readable description.
        message: String,
        /// Original error, kept for diagnostics.
        #[source]
        source: Option<BoxError>,
    },
}

impl DirectoryFailure {
    /// Creates a transport failure without an underlying error.
    #[must_use]
    pub fn message(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
            source: None,
        }
    }

    /// Wraps an underlying error, using its display text as the message.
    #[must_use]
    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl SweepError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an authentication error from a plain message.
    #[must_use]
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(DirectoryFailure::message(msg))
    }

    /// Creates a query error from a plain message.
    #[must_use]
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(DirectoryFailure::message(msg))
    }

    /// Checks if this is an authentication (connect/bind) error.
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Checks if this is a query error.
    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    /// Checks if either phase ran out of time.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Authentication(DirectoryFailure::Timeout(_))
                | Self::Query(DirectoryFailure::Timeout(_))
        )
    }
}

/// Result type for enumeration operations.
pub type SweepResult<T> = Result<T, SweepError>;
