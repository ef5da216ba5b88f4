//! # ds-ldap
//!
//! LDAP directory sessions for descsweep, built on `ldap3`.
//!
//! [`LdapConnector`] implements [`ds_core::DirectoryConnector`]: it opens
//! a connection, binds with the job's credential and returns an
//! [`LdapSession`] that serves paged searches.
//!
//! ```no_run
//! use ds_core::{Endpoint, PasswordCredential};
//! use ds_ldap::{LdapConnector, LdapSettings};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let connector = LdapConnector::new(LdapSettings::builder().build()?);
//! let credential = PasswordCredential::new("alice", "corp.local", "secret").into();
//! let session = connector
//!     .connect(&Endpoint::for_domain("dc01.corp.local", "corp.local"), &credential)
//!     .await?;
//! # drop(session);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod connection;
pub mod error;
pub mod search;

pub use config::{LdapSettings, LdapSettingsBuilder, Scheme, SearchScope};
pub use connection::LdapConnector;
pub use error::{LdapError, LdapResult};
pub use search::LdapSession;
