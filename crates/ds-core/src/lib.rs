//! # ds-core
//!
//! Directory enumeration engine for descsweep.
//!
//! A job binds to a directory with a password or ticket credential, pulls
//! every user account page by page, and flags accounts whose free-text
//! description contains an interesting keyword (`PW`, `PASS`, `ADMIN` by
//! default). The directory protocol itself is supplied by an implementation
//! of [`DirectoryConnector`]; see the `ds-ldap` crate.
//!
//! ```text
//! EnumerationJob ── open ──▶ DirectoryConnector ──▶ DirectorySession
//!       │                                              │
//!       └── PagedQuery ── fetch_page(cookie) ──────────┘
//!              │
//!              ▼
//!       RecordClassifier ──▶ ResultCollector ──▶ Reporter / JobReport
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod classifier;
pub mod collector;
pub mod credential;
pub mod error;
pub mod job;
pub mod model;
pub mod paging;
pub mod report;
pub mod session;

pub use classifier::{AttributeNames, KeywordSet, RecordClassifier, DEFAULT_KEYWORDS};
pub use collector::ResultCollector;
pub use credential::{Credential, PasswordCredential, TicketCredential};
pub use error::{BoxError, DirectoryFailure, SweepError, SweepResult};
pub use job::{EnumerationJob, JobConfig, JobOutcome, JobReport, JobState};
pub use model::{AccountStatus, ClassifiedRecord, Endpoint, QuerySpec, RawRecord};
pub use paging::PagedQuery;
pub use report::{MemoryReporter, ReportEvent, Reporter, Severity, TracingReporter};
pub use session::{DirectoryConnector, DirectorySession, Page};

pub use tokio_util::sync::CancellationToken;
