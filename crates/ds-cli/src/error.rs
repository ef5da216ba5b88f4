//! CLI error types.

use ds_core::SweepError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Engine rejected the job setup.
    #[error(transparent)]
    Sweep(#[from] SweepError),

    /// LDAP settings rejected.
    #[error(transparent)]
    Ldap(#[from] ds_ldap::LdapError),

    /// A job task panicked or was aborted.
    #[error("job task failed: {0}")]
    Task(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
