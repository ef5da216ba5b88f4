//! Running one enumeration job per target host.

use ds_core::{
    CancellationToken, DirectoryConnector, EnumerationJob, JobConfig, JobOutcome, JobReport,
    Reporter,
};
use ds_ldap::LdapConnector;
use tokio::task::JoinSet;

use crate::cli::Cli;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ConsoleReporter;

/// Process exit code when every job completed.
pub const EXIT_OK: u8 = 0;

/// Process exit code when any job failed.
pub const EXIT_FAILED: u8 = 1;

/// Process exit code after Ctrl-C.
pub const EXIT_CANCELLED: u8 = 130;

/// Runs the jobs described by the command line against LDAP.
pub async fn run_sweep(
    cli: &Cli,
    config: &CliConfig,
    cancel: CancellationToken,
) -> CliResult<Vec<JobReport>> {
    let connector = LdapConnector::new(cli.ldap_settings(config)?);
    let format = cli.output_format(config);

    let jobs = cli
        .targets
        .iter()
        .map(|host| {
            let reporter = ConsoleReporter::new(host.as_str(), format, cli.verbose);
            cli.job_config(host, config).map(|job| (job, reporter))
        })
        .collect::<CliResult<Vec<_>>>()?;

    run_jobs(connector, jobs, cancel).await
}

/// Runs jobs in parallel, one task each, and returns their reports in
/// input order.
///
/// Every job gets a child of `cancel`, so cancelling it stops all jobs
/// while each keeps its partial matches.
pub async fn run_jobs<C, R>(
    connector: C,
    jobs: Vec<(JobConfig, R)>,
    cancel: CancellationToken,
) -> CliResult<Vec<JobReport>>
where
    C: DirectoryConnector + Clone + 'static,
    R: Reporter + 'static,
{
    let mut set = JoinSet::new();
    let count = jobs.len();

    for (index, (config, reporter)) in jobs.into_iter().enumerate() {
        let mut job = EnumerationJob::new(connector.clone(), config, reporter)
            .with_cancellation(cancel.child_token());
        tracing::debug!(job_id = %job.id(), index, "Spawning enumeration job");
        set.spawn(async move { (index, job.run().await) });
    }

    let mut reports: Vec<Option<JobReport>> = std::iter::repeat_with(|| None).take(count).collect();
    while let Some(joined) = set.join_next().await {
        let (index, report) = joined.map_err(|e| CliError::Task(e.to_string()))?;
        reports[index] = Some(report);
    }

    Ok(reports.into_iter().flatten().collect())
}

/// Process exit code for a set of reports.
///
/// Cancellation wins over failure, and zero matches is still success.
#[must_use]
pub fn exit_code(reports: &[JobReport]) -> u8 {
    if reports
        .iter()
        .any(|r| matches!(r.outcome, JobOutcome::Cancelled))
    {
        EXIT_CANCELLED
    } else if reports.iter().any(|r| r.error().is_some()) {
        EXIT_FAILED
    } else {
        EXIT_OK
    }
}
