//! Lazy paged iteration over search results.

use std::collections::VecDeque;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{DirectoryFailure, SweepError, SweepResult};
use crate::model::{QuerySpec, RawRecord};
use crate::session::DirectorySession;

/// Lazy sequence of entries for one query.
///
/// Pages are requested on demand: the first call to [`next`](Self::next)
/// fetches page one, and later pages are fetched only once the buffered
/// entries are consumed. The sequence is finite and cannot be restarted;
/// once exhausted (or failed) `next` keeps returning `Ok(None)`.
pub struct PagedQuery<'a, S: DirectorySession> {
    session: &'a mut S,
    spec: &'a QuerySpec,
    buffer: VecDeque<RawRecord>,
    cookie: Vec<u8>,
    exhausted: bool,
    page_timeout: Option<Duration>,
    cancel: Option<CancellationToken>,
    pages_fetched: usize,
    records_yielded: usize,
}

impl<'a, S: DirectorySession> PagedQuery<'a, S> {
    /// Creates a query over an open session. Nothing is fetched yet.
    pub fn new(session: &'a mut S, spec: &'a QuerySpec) -> Self {
        Self {
            session,
            spec,
            buffer: VecDeque::new(),
            cookie: Vec::new(),
            exhausted: false,
            page_timeout: None,
            cancel: None,
            pages_fetched: 0,
            records_yielded: 0,
        }
    }

    /// Fails any page fetch that takes longer than `limit`.
    #[must_use]
    pub fn with_page_timeout(mut self, limit: Option<Duration>) -> Self {
        self.page_timeout = limit;
        self
    }

    /// Stops before the next page fetch once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Pulls the next entry.
    ///
    /// ## Errors
    ///
    /// - [`SweepError::Query`] when a page fetch fails or times out
    /// - [`SweepError::Cancelled`] when cancelled before a page fetch
    ///
    /// Entries yielded before an error stay yielded; the sequence ends
    /// after the error.
    pub async fn next(&mut self) -> SweepResult<Option<RawRecord>> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                self.records_yielded += 1;
                return Ok(Some(record));
            }
            if self.exhausted {
                return Ok(None);
            }

            if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                self.exhausted = true;
                return Err(SweepError::Cancelled);
            }

            let page = match self.fetch().await {
                Ok(page) => page,
                Err(e) => {
                    self.exhausted = true;
                    return Err(e);
                }
            };
            self.pages_fetched += 1;

            tracing::debug!(
                page = self.pages_fetched,
                entries = page.records.len(),
                last = page.is_last(),
                "Fetched result page"
            );

            if page.is_last() {
                self.exhausted = true;
            } else if page.records.is_empty() && page.cookie == self.cookie {
                self.exhausted = true;
                return Err(SweepError::query(
                    "server repeated the paging cookie without returning entries",
                ));
            } else {
                self.cookie = page.cookie;
            }
            self.buffer.extend(page.records);
        }
    }

    /// Pages fetched so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Entries handed to the caller so far.
    #[must_use]
    pub const fn records_yielded(&self) -> usize {
        self.records_yielded
    }

    async fn fetch(&mut self) -> SweepResult<crate::session::Page> {
        let fetch = self.session.fetch_page(self.spec, &self.cookie);
        match self.page_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .map_err(|_| SweepError::Query(DirectoryFailure::Timeout(limit)))?,
            None => fetch.await,
        }
    }
}
