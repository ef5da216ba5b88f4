//! LDAP connection settings.
//!
//! The [`Endpoint`](ds_core::Endpoint) says *where* to connect; these
//! settings say *how*: scheme, port, timeouts and search scope.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LdapError, LdapResult};

// ============================================================================
// Scheme and Scope
// ============================================================================

/// Transport used to reach the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain LDAP (port 389).
    #[default]
    Ldap,
    /// LDAP over TLS (port 636).
    Ldaps,
}

impl Scheme {
    /// URL scheme prefix.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ldap => "ldap",
            Self::Ldaps => "ldaps",
        }
    }

    /// Conventional port.
    #[must_use]
    pub const fn default_port(&self) -> u16 {
        match self {
            Self::Ldap => 389,
            Self::Ldaps => 636,
        }
    }
}

/// LDAP search scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchScope {
    /// Search only the base DN.
    Base,
    /// Search one level below the base DN.
    OneLevel,
    /// Search the entire subtree.
    #[default]
    Subtree,
}

impl SearchScope {
    /// Converts to ldap3 scope.
    #[must_use]
    pub const fn to_ldap3(&self) -> ldap3::Scope {
        match self {
            Self::Base => ldap3::Scope::Base,
            Self::OneLevel => ldap3::Scope::OneLevel,
            Self::Subtree => ldap3::Scope::Subtree,
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

/// How to talk to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LdapSettings {
    /// Transport scheme.
    pub scheme: Scheme,

    /// Port override; the scheme's conventional port when `None`.
    pub port: Option<u16>,

    /// TCP/TLS connect timeout.
    pub connection_timeout: Duration,

    /// Timeout applied to each bind, search and unbind request.
    pub operation_timeout: Duration,

    /// Search scope below the base DN.
    pub search_scope: SearchScope,

    /// Whether to validate server certificates (ldaps only).
    pub validate_certificates: bool,

    /// Mark the paged results control critical.
    pub paging_critical: bool,
}

impl Default for LdapSettings {
    fn default() -> Self {
        LdapSettingsBuilder::new().settings
    }
}

impl LdapSettings {
    /// Creates a new settings builder.
    #[must_use]
    pub fn builder() -> LdapSettingsBuilder {
        LdapSettingsBuilder::new()
    }

    /// Effective port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.scheme.default_port())
    }

    /// Connection URL for a host.
    #[must_use]
    pub fn url_for(&self, host: &str) -> String {
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_string()
        };
        format!("{}://{}:{}", self.scheme.as_str(), host, self.port())
    }

    /// Validates the settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if a timeout is zero or the port is zero.
    pub fn validate(&self) -> LdapResult<()> {
        if self.port == Some(0) {
            return Err(LdapError::config("port cannot be zero"));
        }
        if self.connection_timeout.is_zero() {
            return Err(LdapError::config("connection_timeout cannot be zero"));
        }
        if self.operation_timeout.is_zero() {
            return Err(LdapError::config("operation_timeout cannot be zero"));
        }
        Ok(())
    }
}

// ============================================================================
// Settings Builder
// ============================================================================

/// Builder for LDAP settings.
#[derive(Debug)]
pub struct LdapSettingsBuilder {
    settings: LdapSettings,
}

impl Default for LdapSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LdapSettingsBuilder {
    /// Creates a new builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: LdapSettings {
                scheme: Scheme::Ldap,
                port: None,
                connection_timeout: Duration::from_secs(5),
                operation_timeout: Duration::from_secs(30),
                search_scope: SearchScope::Subtree,
                validate_certificates: true,
                paging_critical: true,
            },
        }
    }

    /// Sets the scheme.
    #[must_use]
    pub const fn scheme(mut self, scheme: Scheme) -> Self {
        self.settings.scheme = scheme;
        self
    }

    /// Overrides the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.settings.port = Some(port);
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.settings.connection_timeout = timeout;
        self
    }

    /// Sets the per-operation timeout.
    #[must_use]
    pub const fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.settings.operation_timeout = timeout;
        self
    }

    /// Sets the search scope.
    #[must_use]
    pub const fn search_scope(mut self, scope: SearchScope) -> Self {
        self.settings.search_scope = scope;
        self
    }

    /// Sets whether to validate certificates.
    #[must_use]
    pub const fn validate_certificates(mut self, validate: bool) -> Self {
        self.settings.validate_certificates = validate;
        self
    }

    /// Sets whether the paging control is critical.
    #[must_use]
    pub const fn paging_critical(mut self, critical: bool) -> Self {
        self.settings.paging_critical = critical;
        self
    }

    /// Builds and validates the settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> LdapResult<LdapSettings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}
