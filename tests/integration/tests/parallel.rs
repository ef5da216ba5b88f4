//! Several hosts swept at once.

use std::sync::atomic::Ordering;

use ds_cli::commands::{exit_code, run_jobs, EXIT_CANCELLED, EXIT_FAILED, EXIT_OK};
use ds_core::{CancellationToken, JobOutcome, MemoryReporter};
use ds_integration_tests::InMemoryDirectory;

use crate::common::{job_config, population};

#[tokio::test]
async fn test_reports_follow_target_order() -> anyhow::Result<()> {
    let directory = InMemoryDirectory::new(population(50));
    let hosts = ["dc01.corp.local", "dc02.corp.local", "dc03.corp.local"];
    let jobs = hosts
        .iter()
        .map(|host| (job_config(host, "pw", 20), MemoryReporter::new()))
        .collect();

    let reports = run_jobs(directory.clone(), jobs, CancellationToken::new()).await?;

    let seen: Vec<&str> = reports.iter().map(|r| r.host.as_str()).collect();
    assert_eq!(seen, hosts);
    for report in &reports {
        assert!(report.is_success());
        assert_eq!(report.match_count(), 5);
        assert_eq!(report.pages_fetched, 3);
    }
    assert_eq!(directory.counters().opened.load(Ordering::SeqCst), 3);
    assert_eq!(directory.counters().closed.load(Ordering::SeqCst), 3);
    assert_eq!(exit_code(&reports), EXIT_OK);
    Ok(())
}

#[tokio::test]
async fn test_one_failing_host_does_not_stop_others() -> anyhow::Result<()> {
    let directory = InMemoryDirectory::new(population(10)).with_unreachable("dc02.corp.local");
    let jobs = ["dc01.corp.local", "dc02.corp.local"]
        .iter()
        .map(|host| (job_config(host, "", 100), MemoryReporter::new()))
        .collect();

    let reports = run_jobs(directory, jobs, CancellationToken::new()).await?;

    assert!(reports[0].is_success());
    assert_eq!(reports[0].match_count(), 1);
    assert!(reports[1].error().is_some_and(|e| e.is_authentication()));
    assert_eq!(exit_code(&reports), EXIT_FAILED);
    Ok(())
}

#[tokio::test]
async fn test_cancelled_sweep_exits_130() -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let directory = InMemoryDirectory::new(population(10));
    let jobs = ["dc01.corp.local", "dc02.corp.local"]
        .iter()
        .map(|host| (job_config(host, "", 100), MemoryReporter::new()))
        .collect();

    let reports = run_jobs(directory, jobs, cancel).await?;

    assert!(reports
        .iter()
        .all(|r| matches!(r.outcome, JobOutcome::Cancelled)));
    assert_eq!(exit_code(&reports), EXIT_CANCELLED);
    Ok(())
}
