//! LDAP-specific error types.
//!
//! ## Security Note
//!
//! Error messages must not leak sensitive information like passwords,
//! hashes or key material.

use ds_core::{DirectoryFailure, SweepError};
use thiserror::Error;

/// LDAP-specific errors.
#[derive(Debug, Error)]
pub enum LdapError {
    /// Invalid configuration.
    #[error("LDAP configuration error: {0}")]
    Configuration(String),

    /// TCP/TLS connection could not be established.
    #[error("LDAP connection failed: {0}")]
    Connection(#[source] ldap3::LdapError),

    /// Bind (authentication) failed.
    #[error("LDAP bind failed: {0}")]
    Bind(#[source] ldap3::LdapError),

    /// The credential needs a bind mechanism this build cannot perform.
    #[error("unsupported bind mechanism: {0}")]
    UnsupportedMechanism(String),

    /// Search operation failed.
    #[error("LDAP search failed: {0}")]
    Search(#[source] ldap3::LdapError),

    /// Paging parameters the server or client cannot honour.
    #[error("LDAP paging error: {0}")]
    Paging(String),

    /// Unbind failed.
    #[error("LDAP unbind failed: {0}")]
    Unbind(#[source] ldap3::LdapError),
}

impl LdapError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an unsupported-mechanism error.
    #[must_use]
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedMechanism(msg.into())
    }

    /// Checks if this error belongs to the connect/bind phase.
    #[must_use]
    pub const fn is_bind_phase(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Bind(_) | Self::UnsupportedMechanism(_)
        )
    }
}

/// Result type for LDAP operations.
pub type LdapResult<T> = Result<T, LdapError>;

impl From<LdapError> for SweepError {
    fn from(err: LdapError) -> Self {
        match err {
            LdapError::Configuration(msg) => Self::Configuration(msg),
            e @ (LdapError::Connection(_)
            | LdapError::Bind(_)
            | LdapError::UnsupportedMechanism(_)) => {
                Self::Authentication(DirectoryFailure::from_error(e))
            }
            e @ (LdapError::Search(_) | LdapError::Paging(_) | LdapError::Unbind(_)) => {
                Self::Query(DirectoryFailure::from_error(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    fn io_failure() -> ldap3::LdapError {
        ldap3::LdapError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ))
    }

    #[test]
    fn phase_mapping() {
        let auth: SweepError = LdapError::Connection(io_failure()).into();
        assert!(auth.is_authentication());

        let mech: SweepError = LdapError::unsupported("pass-the-hash").into();
        assert!(mech.is_authentication());

        let query: SweepError = LdapError::Search(io_failure()).into();
        assert!(query.is_query());

        let paging: SweepError = LdapError::Paging("page size too large".to_string()).into();
        assert!(paging.is_query());

        let config: SweepError = LdapError::config("host is empty").into();
        assert!(matches!(config, SweepError::Configuration(_)));
    }

    #[test]
    fn cause_chain_reaches_ldap3() {
        let err: SweepError = LdapError::Bind(io_failure()).into();
        let failure = err.source().unwrap();
        let ldap = failure.source().unwrap();
        assert!(ldap.to_string().contains("LDAP bind failed"));
        assert!(ldap.source().is_some());
        assert!(LdapError::Bind(io_failure()).is_bind_phase());
        assert!(!LdapError::Search(io_failure()).is_bind_phase());
    }
}
