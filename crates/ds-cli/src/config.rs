//! CLI configuration.
//!
//! Loaded from `~/.descsweep/config.toml` when present. Every field has a
//! default, and command-line flags override whatever the file says.
//! Passwords and hashes are never read from or written to the file.

use std::path::{Path, PathBuf};

use ds_core::model::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Default account name.
    pub username: Option<String>,

    /// Default authentication domain.
    pub domain: Option<String>,

    /// Default search base; derived from the domain when unset.
    pub base_dn: Option<String>,

    /// Comma-separated description keywords.
    pub keywords: Option<String>,

    /// Entries per page.
    pub page_size: u32,

    /// Connect and bind deadline in seconds; 0 waits forever.
    pub connect_timeout_secs: u64,

    /// Per-page deadline in seconds; 0 waits forever.
    pub page_timeout_secs: u64,

    /// Output format.
    pub output_format: OutputFormat,

    /// LDAP transport settings.
    pub ldap: LdapConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            username: None,
            domain: None,
            base_dn: None,
            keywords: None,
            page_size: DEFAULT_PAGE_SIZE,
            connect_timeout_secs: 10,
            page_timeout_secs: 60,
            output_format: OutputFormat::default(),
            ldap: LdapConfig::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from an explicit path, or the default path.
    ///
    /// A missing default file yields the defaults; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::config_path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Loads configuration from a file.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> CliResult<Self> {
        toml::from_str(content).map_err(|e| CliError::Config(format!("failed to parse config: {e}")))
    }

    /// Gets the configuration file path.
    pub fn config_path() -> CliResult<PathBuf> {
        let home = dirs_next::home_dir()
            .ok_or_else(|| CliError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".descsweep").join("config.toml"))
    }
}

/// LDAP transport section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LdapConfig {
    /// Use LDAPS.
    pub ldaps: bool,

    /// Port override.
    pub port: Option<u16>,

    /// Validate server certificates over LDAPS.
    pub validate_certificates: bool,

    /// Per-request timeout in seconds.
    pub operation_timeout_secs: u64,
}

impl Default for LdapConfig {
    fn default() -> Self {
        Self {
            ldaps: false,
            port: None,
            validate_certificates: true,
            operation_timeout_secs: 30,
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Progress lines, highlighted matches and a summary table.
    #[default]
    Table,
    /// A JSON array of job reports on stdout.
    Json,
    /// Matches only, one per line.
    Quiet,
}
