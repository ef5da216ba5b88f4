//! Directory session traits.
//!
//! These traits are the seam between the enumeration engine and the
//! directory protocol implementation. The engine never touches bind
//! mechanics or paging control structures; it only asks for pages and
//! hands back the continuation cookie it was given.

use async_trait::async_trait;

use crate::credential::Credential;
use crate::error::SweepResult;
use crate::model::{Endpoint, QuerySpec, RawRecord};

// ============================================================================
// Page
// ============================================================================

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Entries on this page, in server order.
    pub records: Vec<RawRecord>,

    /// Continuation cookie. Empty when the server has no further pages.
    pub cookie: Vec<u8>,
}

impl Page {
    /// Creates the final page of a result set.
    #[must_use]
    pub fn last(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            cookie: Vec::new(),
        }
    }

    /// Creates a page followed by more pages.
    #[must_use]
    pub fn more(records: Vec<RawRecord>, cookie: Vec<u8>) -> Self {
        Self { records, cookie }
    }

    /// Whether the server signalled the end of the result set.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.cookie.is_empty()
    }
}

// ============================================================================
// Connector and Session
// ============================================================================

/// Opens authenticated sessions against a directory endpoint.
///
/// Implementations select the bind path from the [`Credential`] variant.
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// Session type produced by this connector.
    type Session: DirectorySession;

    /// Connects and binds.
    ///
    /// No query is executed here. All failures (unreachable host, invalid
    /// credentials, rejected bind) must be reported as
    /// [`SweepError::Authentication`](crate::SweepError::Authentication)
    /// with the underlying cause attached.
    async fn open(&self, endpoint: &Endpoint, credential: &Credential) -> SweepResult<Self::Session>;
}

/// An authenticated directory connection.
#[async_trait]
pub trait DirectorySession: Send {
    /// Fetches one page of entries.
    ///
    /// `cookie` is empty for the first page and otherwise the cookie
    /// returned with the previous page. Only directory entries are
    /// returned; referrals and other protocol messages are dropped.
    /// Failures are reported as [`SweepError::Query`](crate::SweepError::Query).
    async fn fetch_page(&mut self, spec: &QuerySpec, cookie: &[u8]) -> SweepResult<Page>;

    /// Releases the connection.
    async fn close(self) -> SweepResult<()>;
}
