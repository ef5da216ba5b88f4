//! Enumeration job orchestration.
//!
//! A job walks `Idle -> Connecting -> Querying -> Completed`. Any failure
//! moves it to `Failed`; cancellation while querying moves it to
//! `Cancelled`. Both terminal states keep whatever matches were collected
//! before the job stopped.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::classifier::{KeywordSet, RecordClassifier};
use crate::collector::ResultCollector;
use crate::credential::Credential;
use crate::error::{DirectoryFailure, SweepError, SweepResult};
use crate::model::{ClassifiedRecord, Endpoint, QuerySpec, RawRecord};
use crate::paging::PagedQuery;
use crate::report::Reporter;
use crate::session::{DirectoryConnector, DirectorySession};

/// Default deadline for connect and bind.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default deadline for one page round-trip.
pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// Job Configuration
// ============================================================================

/// Everything a job needs from its host.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Directory server and search base.
    pub endpoint: Endpoint,
    /// Bind credential.
    pub credential: Credential,
    /// Description keywords.
    pub keywords: KeywordSet,
    /// Query to run.
    pub query: QuerySpec,
    /// Deadline for connect and bind; `None` waits forever.
    pub connect_timeout: Option<Duration>,
    /// Deadline per page; `None` waits forever.
    pub page_timeout: Option<Duration>,
}

impl JobConfig {
    /// Creates a configuration with default keywords, the user/description
    /// query and default timeouts.
    #[must_use]
    pub fn new(endpoint: Endpoint, credential: Credential) -> Self {
        Self {
            endpoint,
            credential,
            keywords: KeywordSet::default(),
            query: QuerySpec::default(),
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            page_timeout: Some(DEFAULT_PAGE_TIMEOUT),
        }
    }

    /// Creates a configuration from a comma-separated keyword list.
    #[must_use]
    pub fn from_keyword_list(endpoint: Endpoint, credential: Credential, keywords: &str) -> Self {
        Self::new(endpoint, credential).with_keywords(KeywordSet::parse(keywords))
    }

    /// Sets the keyword set.
    #[must_use]
    pub fn with_keywords(mut self, keywords: KeywordSet) -> Self {
        self.keywords = keywords;
        self
    }

    /// Sets the page size of the user/description query.
    ///
    /// ## Errors
    ///
    /// Returns a configuration error if `page_size` is zero.
    pub fn with_page_size(mut self, page_size: u32) -> SweepResult<Self> {
        self.query = QuerySpec::user_descriptions(page_size)?;
        Ok(self)
    }

    /// Sets the connect deadline.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the per-page deadline.
    #[must_use]
    pub const fn with_page_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.page_timeout = timeout;
        self
    }
}

// ============================================================================
// State and Report
// ============================================================================

/// Lifecycle state of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    /// Not started.
    Idle,
    /// Opening the session.
    Connecting,
    /// Pulling pages.
    Querying,
    /// Finished cleanly.
    Completed,
    /// Stopped by cancellation.
    Cancelled,
    /// Stopped by an error.
    Failed(String),
}

impl JobState {
    /// Whether the job can no longer change state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed(_))
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Connecting => f.write_str("connecting"),
            Self::Querying => f.write_str("querying"),
            Self::Completed => f.write_str("completed"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// How a job ended.
#[derive(Debug)]
pub enum JobOutcome {
    /// The query ran to exhaustion.
    Completed,
    /// The job was cancelled; matches are partial.
    Cancelled,
    /// The job failed; matches are whatever was collected before the error.
    Failed(SweepError),
}

/// Result of one job.
#[derive(Debug)]
pub struct JobReport {
    /// Job identifier.
    pub job_id: Uuid,
    /// Target host.
    pub host: String,
    /// How the job ended.
    pub outcome: JobOutcome,
    /// Matches in discovery order.
    pub matches: Vec<ClassifiedRecord>,
    /// Entries pulled from the directory.
    pub records_seen: usize,
    /// Pages fetched.
    pub pages_fetched: usize,
    /// When the job started.
    pub started_at: DateTime<Utc>,
    /// When the job finished.
    pub finished_at: DateTime<Utc>,
}

impl JobReport {
    /// Number of matches.
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Whether the job completed without error or cancellation.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, JobOutcome::Completed)
    }

    /// The failure, if the job failed.
    #[must_use]
    pub const fn error(&self) -> Option<&SweepError> {
        match &self.outcome {
            JobOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

// ============================================================================
// Enumeration Job
// ============================================================================

/// One enumeration against one directory endpoint.
///
/// A job owns its connector, session, query and collector exclusively, so
/// independent jobs can run in parallel without coordination.
pub struct EnumerationJob<C, R> {
    id: Uuid,
    connector: C,
    config: JobConfig,
    classifier: RecordClassifier,
    reporter: R,
    cancel: CancellationToken,
    state: JobState,
}

impl<C, R> EnumerationJob<C, R>
where
    C: DirectoryConnector,
    R: Reporter,
{
    /// Creates an idle job.
    pub fn new(connector: C, config: JobConfig, reporter: R) -> Self {
        let classifier = RecordClassifier::new(config.keywords.clone());
        Self {
            id: Uuid::now_v7(),
            connector,
            config,
            classifier,
            reporter,
            cancel: CancellationToken::new(),
            state: JobState::Idle,
        }
    }

    /// Uses an externally owned cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this job.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Job identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &JobState {
        &self.state
    }

    /// Runs the job to a terminal state.
    pub async fn run(&mut self) -> JobReport {
        let started_at = Utc::now();

        if self.state != JobState::Idle {
            let err = SweepError::config("job has already run");
            return self.report(started_at, JobOutcome::Failed(err), Vec::new(), 0, 0);
        }

        self.transition(JobState::Connecting);
        self.reporter.info(&format!(
            "Connecting to directory at {} as {} ({})",
            self.config.endpoint.host(),
            self.config.credential.username(),
            self.config.credential.mechanism()
        ));

        let mut session = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                self.reporter.info("Enumeration cancelled before the session was opened");
                self.transition(JobState::Cancelled);
                return self.report(started_at, JobOutcome::Cancelled, Vec::new(), 0, 0);
            }
            opened = self.open() => match opened {
                Ok(session) => session,
                Err(e) => {
                    self.reporter.fail(&format!("Error occurred during directory connection: {e}"));
                    self.transition(JobState::Failed(e.to_string()));
                    return self.report(started_at, JobOutcome::Failed(e), Vec::new(), 0, 0);
                }
            },
        };

        self.transition(JobState::Querying);
        self.reporter
            .info(&format!("Using search filter: {}", self.config.query.filter()));
        self.reporter.info(&format!(
            "Attributes to retrieve: {:?}",
            self.config.query.attributes()
        ));
        self.reporter.debug(&format!(
            "Keywords: {:?}",
            self.classifier.keywords().keywords()
        ));

        let mut collector = ResultCollector::new();
        let (result, records_seen, pages_fetched) = {
            let mut query = PagedQuery::new(&mut session, &self.config.query)
                .with_page_timeout(self.config.page_timeout)
                .with_cancellation(self.cancel.clone());

            let result = loop {
                match query.next().await {
                    Ok(Some(raw)) => self.process(&raw, &mut collector),
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(e),
                }
            };
            (result, query.records_yielded(), query.pages_fetched())
        };

        if let Err(e) = session.close().await {
            tracing::warn!(job_id = %self.id, "Failed to close directory session: {}", e);
            self.reporter
                .debug(&format!("Session close failed (ignored): {e}"));
        }

        let matches = collector.finalize();
        let outcome = match result {
            Ok(()) => {
                for record in &matches {
                    self.reporter.highlight(record);
                }
                if matches.is_empty() {
                    self.reporter
                        .info("No users found with matching descriptions.");
                } else {
                    self.reporter.success(&format!(
                        "Found {} users with matching descriptions.",
                        matches.len()
                    ));
                }
                self.transition(JobState::Completed);
                JobOutcome::Completed
            }
            Err(SweepError::Cancelled) => {
                for record in &matches {
                    self.reporter.highlight(record);
                }
                self.reporter.info(&format!(
                    "Enumeration cancelled after {records_seen} entries; {} partial matches retained.",
                    matches.len()
                ));
                self.transition(JobState::Cancelled);
                JobOutcome::Cancelled
            }
            Err(e) => {
                self.reporter
                    .fail(&format!("Error occurred during search: {e}"));
                if !matches.is_empty() {
                    for record in &matches {
                        self.reporter.highlight(record);
                    }
                    self.reporter.info(&format!(
                        "Reporting {} matches collected before the failure.",
                        matches.len()
                    ));
                }
                self.transition(JobState::Failed(e.to_string()));
                JobOutcome::Failed(e)
            }
        };

        self.report(started_at, outcome, matches, records_seen, pages_fetched)
    }

    async fn open(&self) -> SweepResult<C::Session> {
        let open = self
            .connector
            .open(&self.config.endpoint, &self.config.credential);
        match self.config.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, open)
                .await
                .map_err(|_| SweepError::Authentication(DirectoryFailure::Timeout(limit)))?,
            None => open.await,
        }
    }

    fn process(&self, raw: &RawRecord, collector: &mut ResultCollector) {
        self.reporter.debug(&format!("Raw item: {raw:?}"));

        let Some(record) = self.classifier.classify(raw) else {
            return;
        };
        let line = format!(
            "Added user: {}, {}, {}",
            record.primary_key, record.description, record.status
        );
        if collector.add(record) {
            self.reporter.debug(&line);
        }
    }

    fn transition(&mut self, next: JobState) {
        tracing::debug!(job_id = %self.id, from = %self.state, to = %next, "Job state change");
        self.state = next;
    }

    fn report(
        &self,
        started_at: DateTime<Utc>,
        outcome: JobOutcome,
        matches: Vec<ClassifiedRecord>,
        records_seen: usize,
        pages_fetched: usize,
    ) -> JobReport {
        JobReport {
            job_id: self.id,
            host: self.config.endpoint.host().to_string(),
            outcome,
            matches,
            records_seen,
            pages_fetched,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

impl<C, R> fmt::Debug for EnumerationJob<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumerationJob")
            .field("id", &self.id)
            .field("host", &self.config.endpoint.host())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
