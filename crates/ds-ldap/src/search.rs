//! Paged LDAP search.
//!
//! Pages are requested with the RFC 2696 simple paged results control.
//! The server hands back an opaque cookie with every page; an empty or
//! missing cookie marks the last page.

use std::collections::HashMap;

use async_trait::async_trait;
use ds_core::{DirectorySession, Page, QuerySpec, RawRecord, SweepResult};
use ldap3::controls::{Control, ControlType, MakeCritical, PagedResults, RawControl};
use ldap3::{Ldap, SearchEntry};

use crate::config::LdapSettings;
use crate::error::{LdapError, LdapResult};

// ============================================================================
// Entry Conversion
// ============================================================================

/// Converts a search entry into a [`RawRecord`].
///
/// Values `ldap3` could not decode as UTF-8 land in its binary map; they
/// are decoded lossily so a description with stray bytes still classifies.
#[must_use]
pub fn record_from_entry(entry: SearchEntry) -> RawRecord {
    let mut attributes: HashMap<String, Vec<String>> = entry.attrs;
    for (name, values) in entry.bin_attrs {
        attributes.entry(name).or_default().extend(
            values
                .iter()
                .map(|v| String::from_utf8_lossy(v).into_owned()),
        );
    }
    RawRecord {
        dn: entry.dn,
        attributes,
    }
}

/// Extracts the continuation cookie from response controls.
///
/// No paged results control in the response is treated as the last page.
#[must_use]
pub fn paging_cookie(ctrls: &[Control]) -> Vec<u8> {
    ctrls
        .iter()
        .find_map(|ctrl| match ctrl {
            Control(Some(ControlType::PagedResults), raw) => {
                Some(raw.parse::<PagedResults>().cookie)
            }
            _ => None,
        })
        .unwrap_or_default()
}

fn paging_control(size: u32, cookie: &[u8], critical: bool) -> LdapResult<RawControl> {
    let size = i32::try_from(size)
        .map_err(|_| LdapError::Paging(format!("page size {size} exceeds the protocol limit")))?;
    let control = PagedResults {
        size,
        cookie: cookie.to_vec(),
    };
    Ok(if critical {
        RawControl::from(control.critical())
    } else {
        RawControl::from(control)
    })
}

// ============================================================================
// Session
// ============================================================================

/// A bound `ldap3` connection searching below one base DN.
pub struct LdapSession {
    ldap: Ldap,
    base_dn: String,
    settings: LdapSettings,
}

impl std::fmt::Debug for LdapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapSession")
            .field("base_dn", &self.base_dn)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl LdapSession {
    pub(crate) fn new(ldap: Ldap, base_dn: String, settings: LdapSettings) -> Self {
        Self {
            ldap,
            base_dn,
            settings,
        }
    }

    /// Search base.
    #[must_use]
    pub fn base_dn(&self) -> &str {
        &self.base_dn
    }

    /// Runs one paged search request.
    pub async fn search_page(&mut self, spec: &QuerySpec, cookie: &[u8]) -> LdapResult<Page> {
        let control = paging_control(spec.page_size(), cookie, self.settings.paging_critical)?;
        let attrs: Vec<&str> = spec.attributes().iter().map(String::as_str).collect();

        let (entries, result) = self
            .ldap
            .with_timeout(self.settings.operation_timeout)
            .with_controls(vec![control])
            .search(
                &self.base_dn,
                self.settings.search_scope.to_ldap3(),
                spec.filter(),
                attrs,
            )
            .await
            .map_err(LdapError::Search)?
            .success()
            .map_err(LdapError::Search)?;

        let records = entries
            .into_iter()
            .filter(|re| !re.is_ref() && !re.is_intermediate())
            .map(SearchEntry::construct)
            .map(record_from_entry)
            .collect();

        Ok(Page {
            records,
            cookie: paging_cookie(&result.ctrls),
        })
    }
}

#[async_trait]
impl DirectorySession for LdapSession {
    async fn fetch_page(&mut self, spec: &QuerySpec, cookie: &[u8]) -> SweepResult<Page> {
        Ok(self.search_page(spec, cookie).await?)
    }

    async fn close(mut self) -> SweepResult<()> {
        self.ldap.unbind().await.map_err(LdapError::Unbind)?;
        Ok(())
    }
}
