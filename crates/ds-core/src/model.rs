//! Directory data model: endpoints, query specs and records.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SweepError, SweepResult};

/// Filter selecting every user account.
pub const USER_FILTER: &str = "(objectClass=user)";

/// Account name attribute (Active Directory).
pub const SAM_ACCOUNT_NAME: &str = "sAMAccountName";

/// Free-text description attribute.
pub const DESCRIPTION: &str = "description";

/// Account control bitmask attribute.
pub const USER_ACCOUNT_CONTROL: &str = "userAccountControl";

/// Page size requested when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

// ============================================================================
// Endpoint
// ============================================================================

/// Directory server and the naming context to search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    host: String,
    base_dn: String,
}

impl Endpoint {
    /// Creates an endpoint.
    #[must_use]
    pub fn new(host: impl Into<String>, base_dn: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            base_dn: base_dn.into(),
        }
    }

    /// Creates an endpoint whose base DN is derived from a DNS domain.
    #[must_use]
    pub fn for_domain(host: impl Into<String>, domain: &str) -> Self {
        Self::new(host, base_dn_from_domain(domain))
    }

    /// Server host name or address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Search base.
    #[must_use]
    pub fn base_dn(&self) -> &str {
        &self.base_dn
    }
}

/// Converts `corp.example.com` into `dc=corp,dc=example,dc=com`.
#[must_use]
pub fn base_dn_from_domain(domain: &str) -> String {
    domain
        .split('.')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| format!("dc={part}"))
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// Query Spec
// ============================================================================

/// Filter, attribute list and page size for one paged query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    filter: String,
    attributes: Vec<String>,
    page_size: u32,
}

impl QuerySpec {
    /// Creates a query spec.
    ///
    /// ## Errors
    ///
    /// Returns a configuration error if the page size is zero or the filter is empty.
    pub fn new(
        filter: impl Into<String>,
        attributes: Vec<String>,
        page_size: u32,
    ) -> SweepResult<Self> {
        let filter = filter.into();
        if filter.trim().is_empty() {
            return Err(SweepError::config("search filter cannot be empty"));
        }
        if page_size == 0 {
            return Err(SweepError::config("page size must be greater than zero"));
        }
        Ok(Self {
            filter,
            attributes,
            page_size,
        })
    }

    /// The user/description query: every user, with account name,
    /// description and control bitmask.
    ///
    /// ## Errors
    ///
    /// Returns a configuration error if the page size is zero.
    pub fn user_descriptions(page_size: u32) -> SweepResult<Self> {
        Self::new(
            USER_FILTER,
            vec![
                SAM_ACCOUNT_NAME.to_string(),
                DESCRIPTION.to_string(),
                USER_ACCOUNT_CONTROL.to_string(),
            ],
            page_size,
        )
    }

    /// Search filter expression.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Requested attributes, in order.
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Entries per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            filter: USER_FILTER.to_string(),
            attributes: vec![
                SAM_ACCOUNT_NAME.to_string(),
                DESCRIPTION.to_string(),
                USER_ACCOUNT_CONTROL.to_string(),
            ],
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// One directory entry as returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// Distinguished Name.
    pub dn: String,

    /// Attributes (all values are multi-valued).
    pub attributes: HashMap<String, Vec<String>>,
}

impl RawRecord {
    /// Creates a record with no attributes.
    #[must_use]
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: HashMap::new(),
        }
    }

    /// Adds a single-valued attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), vec![value.into()]);
        self
    }

    /// Gets the first value of an attribute.
    ///
    /// Attribute names are matched exactly first, then ASCII
    /// case-insensitively.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Gets all values of an attribute.
    #[must_use]
    pub fn values(&self, name: &str) -> Option<&[String]> {
        if let Some(values) = self.attributes.get(name) {
            return Some(values);
        }
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
    }
}

/// Account state derived from the control bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account can log on.
    Enabled,
    /// `ACCOUNTDISABLE` bit set.
    Disabled,
}

impl AccountStatus {
    /// Lowercase name used in reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user whose description matched a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    /// Account name.
    pub primary_key: String,
    /// Description that matched.
    pub description: String,
    /// Enabled or disabled.
    pub status: AccountStatus,
}

impl fmt::Display for ClassifiedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} : {}", self.primary_key, self.description, self.status)
    }
}
