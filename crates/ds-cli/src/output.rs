//! Output formatting utilities.

use chrono::{DateTime, Utc};
use colored::Colorize;
use ds_core::{AccountStatus, ClassifiedRecord, JobOutcome, JobReport, Reporter, Severity};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use uuid::Uuid;

use crate::config::OutputFormat;

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

// ============================================================================
// Console Reporter
// ============================================================================

/// Renders one job's progress on the terminal, prefixed with its host.
///
/// Failures always go to stderr. In `json` mode nothing else is printed,
/// so stdout stays machine readable; in `quiet` mode only matches are.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    host: String,
    format: OutputFormat,
    verbose: bool,
}

impl ConsoleReporter {
    /// Creates a reporter for one host.
    #[must_use]
    pub fn new(host: impl Into<String>, format: OutputFormat, verbose: bool) -> Self {
        Self {
            host: host.into(),
            format,
            verbose,
        }
    }

    fn prefixed(&self, message: &str) -> String {
        format!("[{}] {message}", self.host)
    }
}

impl Reporter for ConsoleReporter {
    fn message(&self, severity: Severity, message: &str) {
        let line = self.prefixed(message);
        match (severity, self.format) {
            (Severity::Failure, _) => error(&line),
            (_, OutputFormat::Json | OutputFormat::Quiet) => {}
            (Severity::Info, _) => info(&line),
            (Severity::Success, _) => success(&line),
            (Severity::Debug, _) if self.verbose => println!("  {}", line.dimmed()),
            (Severity::Debug, _) => {}
        }
    }

    fn highlight(&self, record: &ClassifiedRecord) {
        match self.format {
            OutputFormat::Table => {
                let status = match record.status {
                    AccountStatus::Enabled => record.status.as_str().green(),
                    AccountStatus::Disabled => record.status.as_str().red(),
                };
                println!(
                    "  {} {}: {} : {}",
                    "➜".yellow().bold(),
                    record.primary_key.bold(),
                    record.description,
                    status
                );
            }
            OutputFormat::Quiet => println!("{}\t{record}", self.host),
            OutputFormat::Json => {}
        }
    }
}

// ============================================================================
// Final Output
// ============================================================================

/// Short label for a job outcome.
#[must_use]
pub const fn outcome_label(outcome: &JobOutcome) -> &'static str {
    match outcome {
        JobOutcome::Completed => "completed",
        JobOutcome::Cancelled => "cancelled",
        JobOutcome::Failed(_) => "failed",
    }
}

/// Summary row for one job.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct JobRow {
    /// Target host.
    #[tabled(rename = "Host")]
    pub host: String,
    /// Outcome label.
    #[tabled(rename = "Outcome")]
    pub outcome: String,
    /// Matching accounts.
    #[tabled(rename = "Matches")]
    pub matches: usize,
    /// Entries pulled.
    #[tabled(rename = "Records")]
    pub records: usize,
    /// Pages fetched.
    #[tabled(rename = "Pages")]
    pub pages: usize,
}

impl From<&JobReport> for JobRow {
    fn from(report: &JobReport) -> Self {
        Self {
            host: report.host.clone(),
            outcome: outcome_label(&report.outcome).to_string(),
            matches: report.match_count(),
            records: report.records_seen,
            pages: report.pages_fetched,
        }
    }
}

/// JSON view of a job report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    /// Job identifier.
    pub job_id: Uuid,
    /// Target host.
    pub host: &'a str,
    /// Outcome label.
    pub outcome: &'static str,
    /// Failure message, when the job failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Matches in discovery order.
    pub matches: &'a [ClassifiedRecord],
    /// Entries pulled.
    pub records_seen: usize,
    /// Pages fetched.
    pub pages_fetched: usize,
    /// Start time.
    pub started_at: DateTime<Utc>,
    /// End time.
    pub finished_at: DateTime<Utc>,
}

impl<'a> From<&'a JobReport> for JsonReport<'a> {
    fn from(report: &'a JobReport) -> Self {
        Self {
            job_id: report.job_id,
            host: &report.host,
            outcome: outcome_label(&report.outcome),
            error: report.error().map(ToString::to_string),
            matches: &report.matches,
            records_seen: report.records_seen,
            pages_fetched: report.pages_fetched,
            started_at: report.started_at,
            finished_at: report.finished_at,
        }
    }
}

/// Renders the per-job summary table.
#[must_use]
pub fn summary_table(reports: &[JobReport]) -> String {
    let rows: Vec<JobRow> = reports.iter().map(JobRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Renders all reports as pretty JSON.
pub fn reports_json(reports: &[JobReport]) -> crate::CliResult<String> {
    let views: Vec<JsonReport<'_>> = reports.iter().map(JsonReport::from).collect();
    Ok(serde_json::to_string_pretty(&views)?)
}

/// Prints the final output in the specified format.
pub fn output(reports: &[JobReport], format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table => {
            if reports.is_empty() {
                info("No jobs were run.");
            } else {
                println!("{}", summary_table(reports));
            }
        }
        OutputFormat::Json => println!("{}", reports_json(reports)?),
        OutputFormat::Quiet => {}
    }
    Ok(())
}
