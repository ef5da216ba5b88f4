//! Connecting and binding.
//!
//! ## Security
//!
//! Bind secrets are handed to `ldap3` and never logged. A password
//! credential with an empty password is refused instead of being sent,
//! since an empty simple bind is an unauthenticated bind that most
//! directories accept silently. Ticket binds use the ambient credential
//! cache only, so a ticket credential carrying an AES key or KDC override
//! is refused rather than bound as whoever owns that cache.

use async_trait::async_trait;
use ds_core::{
    Credential, DirectoryConnector, Endpoint, PasswordCredential, SweepResult, TicketCredential,
};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings};

use crate::config::LdapSettings;
use crate::error::{LdapError, LdapResult};
use crate::search::LdapSession;

/// Opens [`LdapSession`]s using `ldap3`.
#[derive(Debug, Clone, Default)]
pub struct LdapConnector {
    settings: LdapSettings,
}

impl LdapConnector {
    /// Creates a connector.
    #[must_use]
    pub fn new(settings: LdapSettings) -> Self {
        Self { settings }
    }

    /// Returns the settings.
    #[must_use]
    pub fn settings(&self) -> &LdapSettings {
        &self.settings
    }

    /// Connects and binds, staying in LDAP error terms.
    pub async fn connect(
        &self,
        endpoint: &Endpoint,
        credential: &Credential,
    ) -> LdapResult<LdapSession> {
        if endpoint.host().trim().is_empty() {
            return Err(LdapError::config("host cannot be empty"));
        }
        // Refuse unusable credentials before touching the network.
        check_credential(credential)?;

        let url = self.settings.url_for(endpoint.host());
        tracing::debug!(
            url = %url,
            user = credential.username(),
            mechanism = credential.mechanism(),
            "Connecting to directory"
        );

        let mut ldap = self.create_connection(&url).await?;

        match credential {
            Credential::Password(c) => self.password_bind(&mut ldap, c).await?,
            Credential::Ticket(c) => self.ticket_bind(&mut ldap, endpoint, c).await?,
        }

        tracing::debug!(url = %url, "Bind succeeded");
        Ok(LdapSession::new(
            ldap,
            endpoint.base_dn().to_string(),
            self.settings.clone(),
        ))
    }

    async fn create_connection(&self, url: &str) -> LdapResult<Ldap> {
        let conn_settings = LdapConnSettings::new()
            .set_conn_timeout(self.settings.connection_timeout)
            .set_no_tls_verify(!self.settings.validate_certificates);

        let (conn, ldap) = LdapConnAsync::with_settings(conn_settings, url)
            .await
            .map_err(LdapError::Connection)?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                tracing::warn!("LDAP connection driver error: {}", e);
            }
        });

        Ok(ldap)
    }

    async fn password_bind(&self, ldap: &mut Ldap, credential: &PasswordCredential) -> LdapResult<()> {
        let principal = credential.principal();
        ldap.with_timeout(self.settings.operation_timeout)
            .simple_bind(&principal, credential.password())
            .await
            .map_err(LdapError::Bind)?
            .success()
            .map_err(LdapError::Bind)?;
        Ok(())
    }

    #[cfg(feature = "gssapi")]
    async fn ticket_bind(
        &self,
        ldap: &mut Ldap,
        endpoint: &Endpoint,
        credential: &TicketCredential,
    ) -> LdapResult<()> {
        tracing::debug!(principal = credential.username(), "GSSAPI bind from credential cache");
        ldap.with_timeout(self.settings.operation_timeout)
            .sasl_gssapi_bind(endpoint.host())
            .await
            .map_err(LdapError::Bind)?
            .success()
            .map_err(LdapError::Bind)?;
        Ok(())
    }

    #[cfg(not(feature = "gssapi"))]
    async fn ticket_bind(
        &self,
        _ldap: &mut Ldap,
        _endpoint: &Endpoint,
        _credential: &TicketCredential,
    ) -> LdapResult<()> {
        Err(LdapError::unsupported(
            "kerberos binds need ds-ldap built with the `gssapi` feature",
        ))
    }
}

#[async_trait]
impl DirectoryConnector for LdapConnector {
    type Session = LdapSession;

    async fn open(&self, endpoint: &Endpoint, credential: &Credential) -> SweepResult<LdapSession> {
        Ok(self.connect(endpoint, credential).await?)
    }
}

fn check_credential(credential: &Credential) -> LdapResult<()> {
    match credential {
        Credential::Password(c) if c.password().is_empty() && c.has_hashes() => Err(
            LdapError::unsupported("pass-the-hash is not available with LDAP simple bind"),
        ),
        Credential::Password(c) if c.password().is_empty() => Err(LdapError::unsupported(
            "empty password would perform an unauthenticated bind",
        )),
        Credential::Ticket(c) if c.aes_key().is_some() => Err(LdapError::unsupported(
            "requesting a ticket with an AES key is not supported; use the credential cache",
        )),
        Credential::Ticket(c) if c.kdc_host().is_some() => Err(LdapError::unsupported(
            "KDC host overrides are not supported; configure the KDC in krb5.conf",
        )),
        Credential::Ticket(_) if !cfg!(feature = "gssapi") => Err(LdapError::unsupported(
            "kerberos binds need ds-ldap built with the `gssapi` feature",
        )),
        _ => Ok(()),
    }
}
