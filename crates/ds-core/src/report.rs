//! Reporting collaborator.
//!
//! The engine never logs user-facing output through globals. Progress,
//! raw record dumps, the success summary, failures and each match are
//! handed to an injected [`Reporter`], which decides how to render them.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::model::ClassifiedRecord;

/// Severity channel of a report message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Progress information.
    Info,
    /// Raw record dumps and other diagnostics.
    Debug,
    /// Final success summary.
    Success,
    /// Failure messages.
    Failure,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Success => "success",
            Self::Failure => "failure",
        })
    }
}

/// Receives job progress and results.
pub trait Reporter: Send + Sync {
    /// Emits a message on a severity channel.
    fn message(&self, severity: Severity, message: &str);

    /// Emits one match.
    fn highlight(&self, record: &ClassifiedRecord);

    /// Progress information.
    fn info(&self, message: &str) {
        self.message(Severity::Info, message);
    }

    /// Diagnostic output.
    fn debug(&self, message: &str) {
        self.message(Severity::Debug, message);
    }

    /// Success summary.
    fn success(&self, message: &str) {
        self.message(Severity::Success, message);
    }

    /// Failure message.
    fn fail(&self, message: &str) {
        self.message(Severity::Failure, message);
    }
}

impl<R: Reporter + ?Sized> Reporter for Arc<R> {
    fn message(&self, severity: Severity, message: &str) {
        (**self).message(severity, message);
    }

    fn highlight(&self, record: &ClassifiedRecord) {
        (**self).highlight(record);
    }
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn message(&self, severity: Severity, message: &str) {
        (**self).message(severity, message);
    }

    fn highlight(&self, record: &ClassifiedRecord) {
        (**self).highlight(record);
    }
}

// ============================================================================
// Tracing Reporter
// ============================================================================

/// Forwards reports to `tracing`, tagged with the target host.
#[derive(Debug, Clone)]
pub struct TracingReporter {
    host: String,
}

impl TracingReporter {
    /// Creates a reporter for one target host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

impl Reporter for TracingReporter {
    fn message(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => tracing::info!(host = %self.host, "{message}"),
            Severity::Debug => tracing::debug!(host = %self.host, "{message}"),
            Severity::Success => tracing::info!(host = %self.host, outcome = "success", "{message}"),
            Severity::Failure => tracing::error!(host = %self.host, "{message}"),
        }
    }

    fn highlight(&self, record: &ClassifiedRecord) {
        tracing::info!(
            host = %self.host,
            account = %record.primary_key,
            status = %record.status,
            description = %record.description,
            "Matching description"
        );
    }
}

// ============================================================================
// Memory Reporter
// ============================================================================

/// One buffered report event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    /// A message on a severity channel.
    Message(Severity, String),
    /// A match.
    Highlight(ClassifiedRecord),
}

/// Buffers report events for later inspection.
#[derive(Debug, Clone, Default)]
pub struct MemoryReporter {
    events: Arc<Mutex<Vec<ReportEvent>>>,
}

impl MemoryReporter {
    /// Creates an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events so far.
    #[must_use]
    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().clone()
    }

    /// Messages on one severity channel.
    #[must_use]
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ReportEvent::Message(s, msg) if *s == severity => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }

    /// Highlighted matches.
    #[must_use]
    pub fn highlights(&self) -> Vec<ClassifiedRecord> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ReportEvent::Highlight(record) => Some(record.clone()),
                ReportEvent::Message(..) => None,
            })
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn message(&self, severity: Severity, message: &str) {
        self.events
            .lock()
            .push(ReportEvent::Message(severity, message.to_string()));
    }

    fn highlight(&self, record: &ClassifiedRecord) {
        self.events.lock().push(ReportEvent::Highlight(record.clone()));
    }
}
