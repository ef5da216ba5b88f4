//! CLI argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ds_core::{Credential, Endpoint, JobConfig, PasswordCredential, TicketCredential};
use ds_ldap::{LdapSettings, Scheme};

use crate::config::{CliConfig, OutputFormat};
use crate::error::{CliError, CliResult};

/// descsweep - find directory accounts with secrets in their description.
#[derive(Debug, Parser)]
#[command(name = "descsweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory servers to query; one job runs per host.
    #[arg(required = true, value_name = "HOST")]
    pub targets: Vec<String>,

    /// Account to bind as.
    #[arg(short, long, env = "DESCSWEEP_USERNAME")]
    pub username: Option<String>,

    /// Authentication domain, e.g. corp.local.
    #[arg(short, long, env = "DESCSWEEP_DOMAIN")]
    pub domain: Option<String>,

    /// Password.
    #[arg(short, long, env = "DESCSWEEP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Hashes in LM:NT or NT form.
    #[arg(short = 'H', long, env = "DESCSWEEP_HASHES", hide_env_values = true)]
    pub hashes: Option<String>,

    /// Bind with a Kerberos ticket from the credential cache (cannot be
    /// combined with --password or --hashes).
    #[arg(short, long)]
    pub kerberos: bool,

    /// AES key for Kerberos (implies --kerberos). The LDAP transport only
    /// binds from the credential cache and refuses it.
    #[arg(long, hide_env_values = true, env = "DESCSWEEP_AES_KEY")]
    pub aes_key: Option<String>,

    /// KDC host override for Kerberos.
    #[arg(long)]
    pub kdc_host: Option<String>,

    /// Search base (derived from the domain when omitted).
    #[arg(short, long)]
    pub base_dn: Option<String>,

    /// Comma-separated keywords to look for in descriptions.
    #[arg(short, long, value_name = "KEYWORDS")]
    pub search: Option<String>,

    /// Entries per page.
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Use LDAPS.
    #[arg(long)]
    pub ldaps: bool,

    /// Port override.
    #[arg(long)]
    pub port: Option<u16>,

    /// Skip certificate validation over LDAPS.
    #[arg(long)]
    pub no_verify: bool,

    /// Connect and bind deadline in seconds. 0 lifts the deadline on the
    /// whole connect and bind; the TCP connect alone still gives up after
    /// the transport default of 5 seconds.
    #[arg(long, value_name = "SECS")]
    pub connect_timeout: Option<u64>,

    /// Per-page deadline in seconds (0 disables).
    #[arg(long, value_name = "SECS")]
    pub page_timeout: Option<u64>,

    /// Output format.
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Configuration file (defaults to ~/.descsweep/config.toml).
    #[arg(short, long, env = "DESCSWEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show raw records and debug logs.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Effective output format.
    #[must_use]
    pub fn output_format(&self, config: &CliConfig) -> OutputFormat {
        self.output.unwrap_or(config.output_format)
    }

    /// Builds the bind credential.
    pub fn credential(&self, config: &CliConfig) -> CliResult<Credential> {
        let username = self
            .username
            .clone()
            .or_else(|| config.username.clone())
            .ok_or_else(|| CliError::InvalidArgument("--username is required".to_string()))?;
        let domain = self.domain(config)?.to_string();

        if self.kerberos || self.aes_key.is_some() {
            if self.password.is_some() || self.hashes.is_some() {
                return Err(CliError::InvalidArgument(
                    "--password and --hashes cannot be used with --kerberos; \
                     tickets come from the credential cache"
                        .to_string(),
                ));
            }
            let mut ticket = TicketCredential::new(username, domain);
            if let Some(key) = &self.aes_key {
                ticket = ticket.with_aes_key(key);
            }
            if let Some(kdc) = &self.kdc_host {
                ticket = ticket.with_kdc_host(kdc);
            }
            return Ok(ticket.into());
        }

        let mut password = PasswordCredential::new(
            username,
            domain,
            self.password.clone().unwrap_or_default(),
        );
        if let Some(hashes) = &self.hashes {
            password = password.with_hashes(hashes)?;
        }
        Ok(password.into())
    }

    /// Builds the endpoint for one host.
    pub fn endpoint(&self, host: &str, config: &CliConfig) -> CliResult<Endpoint> {
        match self.base_dn.as_ref().or(config.base_dn.as_ref()) {
            Some(base_dn) => Ok(Endpoint::new(host, base_dn.clone())),
            None => Ok(Endpoint::for_domain(host, self.domain(config)?)),
        }
    }

    /// Builds the job configuration for one host.
    pub fn job_config(&self, host: &str, config: &CliConfig) -> CliResult<JobConfig> {
        let keywords = self
            .search
            .as_deref()
            .or(config.keywords.as_deref())
            .unwrap_or_default();

        let job = JobConfig::from_keyword_list(
            self.endpoint(host, config)?,
            self.credential(config)?,
            keywords,
        )
        .with_page_size(self.page_size.unwrap_or(config.page_size))?
        .with_connect_timeout(seconds(
            self.connect_timeout.unwrap_or(config.connect_timeout_secs),
        ))
        .with_page_timeout(seconds(
            self.page_timeout.unwrap_or(config.page_timeout_secs),
        ));
        Ok(job)
    }

    /// Builds the LDAP transport settings.
    pub fn ldap_settings(&self, config: &CliConfig) -> CliResult<LdapSettings> {
        let scheme = if self.ldaps || config.ldap.ldaps {
            Scheme::Ldaps
        } else {
            Scheme::Ldap
        };
        let mut builder = LdapSettings::builder()
            .scheme(scheme)
            .validate_certificates(config.ldap.validate_certificates && !self.no_verify)
            .operation_timeout(Duration::from_secs(config.ldap.operation_timeout_secs));
        if let Some(port) = self.port.or(config.ldap.port) {
            builder = builder.port(port);
        }
        if let Some(timeout) = seconds(self.connect_timeout.unwrap_or(config.connect_timeout_secs)) {
            builder = builder.connection_timeout(timeout);
        }
        Ok(builder.build()?)
    }

    fn domain<'a>(&'a self, config: &'a CliConfig) -> CliResult<&'a str> {
        self.domain
            .as_deref()
            .or(config.domain.as_deref())
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| CliError::InvalidArgument("--domain is required".to_string()))
    }
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
