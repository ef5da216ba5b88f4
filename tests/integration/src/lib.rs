//! # ds-integration-tests
//!
//! An in-memory directory used by the end-to-end scenarios.
//!
//! [`InMemoryDirectory`] is a [`DirectoryConnector`] serving a fixed list
//! of entries in pages, with knobs for the failure modes a real server
//! exhibits: rejected binds, unreachable hosts, slow connects, a page
//! that fails mid-stream.

#![forbid(unsafe_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ds_core::{
    CancellationToken, Credential, DirectoryConnector, DirectorySession,
    Endpoint, Page, QuerySpec, RawRecord, SweepError, SweepResult,
};

/// Counters shared by a directory and its sessions.
#[derive(Debug, Default)]
pub struct Counters {
    /// Successful opens.
    pub opened: AtomicUsize,
    /// Session closes.
    pub closed: AtomicUsize,
    /// Page requests served or failed.
    pub page_requests: AtomicUsize,
}

#[derive(Debug, Clone, Default)]
struct Settings {
    entries: Vec<RawRecord>,
    password: Option<String>,
    unreachable: HashSet<String>,
    open_delay: Option<Duration>,
    fail_page: Option<usize>,
    cancel_after_page: Option<(usize, CancellationToken)>,
}

/// In-memory directory server.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    settings: Arc<Settings>,
    counters: Arc<Counters>,
}

impl InMemoryDirectory {
    /// Creates a directory serving `entries` in order.
    #[must_use]
    pub fn new(entries: Vec<RawRecord>) -> Self {
        Self {
            settings: Arc::new(Settings {
                entries,
                ..Settings::default()
            }),
            counters: Arc::default(),
        }
    }

    /// Only accepts password binds with this password.
    #[must_use]
    pub fn with_password(self, password: &str) -> Self {
        self.update(|s| s.password = Some(password.to_string()))
    }

    /// Refuses connections to `host`.
    #[must_use]
    pub fn with_unreachable(self, host: &str) -> Self {
        self.update(|s| {
            s.unreachable.insert(host.to_string());
        })
    }

    /// Delays every open.
    #[must_use]
    pub fn with_open_delay(self, delay: Duration) -> Self {
        self.update(|s| s.open_delay = Some(delay))
    }

    /// Fails the page with this zero-based index.
    #[must_use]
    pub fn with_failing_page(self, index: usize) -> Self {
        self.update(|s| s.fail_page = Some(index))
    }

    /// Cancels `token` right after serving the page with this index.
    #[must_use]
    pub fn with_cancel_after_page(self, index: usize, token: CancellationToken) -> Self {
        self.update(|s| s.cancel_after_page = Some((index, token)))
    }

    /// Shared counters.
    #[must_use]
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    fn update(self, apply: impl FnOnce(&mut Settings)) -> Self {
        let mut settings = (*self.settings).clone();
        apply(&mut settings);
        Self {
            settings: Arc::new(settings),
            counters: self.counters,
        }
    }
}

#[async_trait]
impl DirectoryConnector for InMemoryDirectory {
    type Session = InMemorySession;

    async fn open(&self, endpoint: &Endpoint, credential: &Credential) -> SweepResult<InMemorySession> {
        if let Some(delay) = self.settings.open_delay {
            tokio::time::sleep(delay).await;
        }
        if self.settings.unreachable.contains(endpoint.host()) {
            return Err(SweepError::auth("connection refused"));
        }
        if let (Credential::Password(c), Some(expected)) = (credential, &self.settings.password) {
            if c.password() != expected.as_str() {
                return Err(SweepError::auth("invalid credentials"));
            }
        }

        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(InMemorySession {
            settings: Arc::clone(&self.settings),
            counters: Arc::clone(&self.counters),
        })
    }
}

/// Session over an [`InMemoryDirectory`].
///
/// Cookies are the big-endian offset of the next entry.
#[derive(Debug)]
pub struct InMemorySession {
    settings: Arc<Settings>,
    counters: Arc<Counters>,
}

#[async_trait]
impl DirectorySession for InMemorySession {
    async fn fetch_page(&mut self, spec: &QuerySpec, cookie: &[u8]) -> SweepResult<Page> {
        let page_index = self.counters.page_requests.fetch_add(1, Ordering::SeqCst);
        if self.settings.fail_page == Some(page_index) {
            return Err(SweepError::query("server went away"));
        }

        let offset = if cookie.is_empty() {
            0
        } else {
            let bytes: [u8; 8] = cookie
                .try_into()
                .map_err(|_| SweepError::query("malformed cookie"))?;
            usize::try_from(u64::from_be_bytes(bytes))
                .map_err(|_| SweepError::query("malformed cookie"))?
        };

        let entries = &self.settings.entries;
        let end = entries.len().min(offset + spec.page_size() as usize);
        let records = entries.get(offset..end).unwrap_or_default().to_vec();
        let next = if end < entries.len() {
            (end as u64).to_be_bytes().to_vec()
        } else {
            Vec::new()
        };

        if let Some((index, token)) = &self.settings.cancel_after_page {
            if *index == page_index {
                token.cancel();
            }
        }
        Ok(Page::more(records, next))
    }

    async fn close(self) -> SweepResult<()> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
