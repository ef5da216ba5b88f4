//! Credentials used to bind to the directory.
//!
//! ## Security
//!
//! Passwords, hashes and key material are redacted from `Debug` output.
//! Nothing in this module is ever logged.

use std::fmt;

use crate::error::{SweepError, SweepResult};

/// Length in bytes of an LM or NT hash.
const HASH_LEN: usize = 16;

/// Credential material for one session.
///
/// Exactly one variant is active per session, and the value is immutable
/// once constructed.
#[derive(Clone)]
pub enum Credential {
    /// Password or hash-based bind.
    Password(PasswordCredential),
    /// Ticket-based (Kerberos) bind.
    Ticket(TicketCredential),
}

impl Credential {
    /// Returns the account name the session binds as.
    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            Self::Password(c) => &c.username,
            Self::Ticket(c) => &c.username,
        }
    }

    /// Returns the authentication domain.
    #[must_use]
    pub fn domain(&self) -> &str {
        match self {
            Self::Password(c) => &c.domain,
            Self::Ticket(c) => &c.domain,
        }
    }

    /// Short name of the authentication path, for logs.
    #[must_use]
    pub const fn mechanism(&self) -> &'static str {
        match self {
            Self::Password(_) => "password",
            Self::Ticket(_) => "kerberos",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password(c) => f.debug_tuple("Password").field(c).finish(),
            Self::Ticket(c) => f.debug_tuple("Ticket").field(c).finish(),
        }
    }
}

impl From<PasswordCredential> for Credential {
    fn from(value: PasswordCredential) -> Self {
        Self::Password(value)
    }
}

impl From<TicketCredential> for Credential {
    fn from(value: TicketCredential) -> Self {
        Self::Ticket(value)
    }
}

/// Username/password credential with optional precomputed hashes.
#[derive(Clone)]
pub struct PasswordCredential {
    username: String,
    domain: String,
    password: String,
    lm_hash: Option<String>,
    nt_hash: Option<String>,
}

impl PasswordCredential {
    /// Creates a password credential.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        domain: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            domain: domain.into(),
            password: password.into(),
            lm_hash: None,
            nt_hash: None,
        }
    }

    /// Attaches hash material in `LM:NT` or bare `NT` notation.
    ///
    /// ## Errors
    ///
    /// Returns a configuration error when a hash is not 32 hex characters.
    pub fn with_hashes(mut self, hashes: &str) -> SweepResult<Self> {
        let (lm, nt) = match hashes.split_once(':') {
            Some((lm, nt)) => (lm.trim(), nt.trim()),
            None => ("", hashes.trim()),
        };

        self.lm_hash = if lm.is_empty() {
            None
        } else {
            Some(normalize_hash("LM", lm)?)
        };
        self.nt_hash = if nt.is_empty() {
            None
        } else {
            Some(normalize_hash("NT", nt)?)
        };
        Ok(self)
    }

    /// Account name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Authentication domain.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Cleartext password; may be empty when only hashes are known.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// LM hash as lowercase hex.
    #[must_use]
    pub fn lm_hash(&self) -> Option<&str> {
        self.lm_hash.as_deref()
    }

    /// NT hash as lowercase hex.
    #[must_use]
    pub fn nt_hash(&self) -> Option<&str> {
        self.nt_hash.as_deref()
    }

    /// Whether hash material is available.
    #[must_use]
    pub fn has_hashes(&self) -> bool {
        self.lm_hash.is_some() || self.nt_hash.is_some()
    }

    /// Bind principal in `user@domain` form.
    ///
    /// Usernames that already carry a domain (`user@realm` or
    /// `DOMAIN\user`) are returned unchanged.
    #[must_use]
    pub fn principal(&self) -> String {
        if self.domain.is_empty() || self.username.contains('@') || self.username.contains('\\') {
            self.username.clone()
        } else {
            format!("{}@{}", self.username, self.domain)
        }
    }
}

impl fmt::Debug for PasswordCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredential")
            .field("username", &self.username)
            .field("domain", &self.domain)
            .field("password", &redacted(!self.password.is_empty()))
            .field("lm_hash", &redacted(self.lm_hash.is_some()))
            .field("nt_hash", &redacted(self.nt_hash.is_some()))
            .finish()
    }
}

/// Kerberos credential backed by the ambient ticket cache.
#[derive(Clone)]
pub struct TicketCredential {
    username: String,
    domain: String,
    aes_key: Option<String>,
    kdc_host: Option<String>,
}

impl TicketCredential {
    /// Creates a ticket credential.
    #[must_use]
    pub fn new(username: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            domain: domain.into(),
            aes_key: None,
            kdc_host: None,
        }
    }

    /// Sets a pre-derived AES key (hex).
    #[must_use]
    pub fn with_aes_key(mut self, key: impl Into<String>) -> Self {
        self.aes_key = Some(key.into());
        self
    }

    /// Overrides the ticket-issuing host.
    #[must_use]
    pub fn with_kdc_host(mut self, host: impl Into<String>) -> Self {
        self.kdc_host = Some(host.into());
        self
    }

    /// Account name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Kerberos realm / domain.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Pre-derived AES key, if any.
    #[must_use]
    pub fn aes_key(&self) -> Option<&str> {
        self.aes_key.as_deref()
    }

    /// Ticket-issuing host override, if any.
    #[must_use]
    pub fn kdc_host(&self) -> Option<&str> {
        self.kdc_host.as_deref()
    }
}

impl fmt::Debug for TicketCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketCredential")
            .field("username", &self.username)
            .field("domain", &self.domain)
            .field("aes_key", &redacted(self.aes_key.is_some()))
            .field("kdc_host", &self.kdc_host)
            .finish()
    }
}

fn redacted(present: bool) -> &'static str {
    if present {
        "<redacted>"
    } else {
        "<none>"
    }
}

fn normalize_hash(kind: &str, value: &str) -> SweepResult<String> {
    let bytes = hex::decode(value)
        .map_err(|e| SweepError::config(format!("{kind} hash is not valid hex: {e}")))?;
    if bytes.len() != HASH_LEN {
        return Err(SweepError::config(format!(
            "{kind} hash must be {} hex characters, got {}",
            HASH_LEN * 2,
            value.len()
        )));
    }
    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NT: &str = "31D6CFE0D16AE931B73C59D7E0C089C0";
    const LM: &str = "aad3b435b51404eeaad3b435b51404ee";

    #[test]
    fn parses_lm_nt_pair() {
        let cred = PasswordCredential::new("svc", "corp.local", "")
            .with_hashes(&format!("{LM}:{NT}"))
            .unwrap();

        assert_eq!(cred.lm_hash(), Some(LM));
        assert_eq!(cred.nt_hash(), Some("31d6cfe0d16ae931b73c59d7e0c089c0"));
        assert!(cred.has_hashes());
    }

    #[test]
    fn parses_bare_and_empty_lm() {
        let bare = PasswordCredential::new("svc", "corp.local", "")
            .with_hashes(NT)
            .unwrap();
        assert_eq!(bare.lm_hash(), None);
        assert!(bare.nt_hash().is_some());

        let empty_lm = PasswordCredential::new("svc", "corp.local", "")
            .with_hashes(&format!(":{NT}"))
            .unwrap();
        assert_eq!(empty_lm.lm_hash(), None);
        assert!(empty_lm.nt_hash().is_some());
    }

    #[test]
    fn rejects_malformed_hash() {
        let short = PasswordCredential::new("svc", "corp.local", "").with_hashes("abcd");
        assert!(matches!(short, Err(SweepError::Configuration(_))));

        let not_hex = PasswordCredential::new("svc", "corp.local", "")
            .with_hashes("zz d6cfe0d16ae931b73c59d7e0c089c0");
        assert!(matches!(not_hex, Err(SweepError::Configuration(_))));
    }

    #[test]
    fn principal_forms() {
        assert_eq!(
            PasswordCredential::new("alice", "corp.local", "x").principal(),
            "alice@corp.local"
        );
        assert_eq!(
            PasswordCredential::new("CORP\\alice", "corp.local", "x").principal(),
            "CORP\\alice"
        );
        assert_eq!(PasswordCredential::new("alice", "", "x").principal(), "alice");
    }

    #[test]
    fn debug_redacts_secrets() {
        let cred: Credential = PasswordCredential::new("alice", "corp.local", "Summer2024!")
            .with_hashes(NT)
            .unwrap()
            .into();
        let out = format!("{cred:?}");
        assert!(out.contains("alice"));
        assert!(!out.contains("Summer2024!"));
        assert!(!out.to_lowercase().contains("31d6cfe0"));

        let ticket: Credential = TicketCredential::new("alice", "corp.local")
            .with_aes_key("00112233445566778899aabbccddeeff")
            .with_kdc_host("dc01.corp.local")
            .into();
        let out = format!("{ticket:?}");
        assert!(!out.contains("00112233"));
        assert!(out.contains("dc01.corp.local"));
        assert_eq!(ticket.mechanism(), "kerberos");
    }
}
