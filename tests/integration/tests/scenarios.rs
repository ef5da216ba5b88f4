//! Single-job scenarios.

use std::sync::atomic::Ordering;
use std::time::Duration;

use ds_core::{
    AccountStatus, CancellationToken, ClassifiedRecord, DirectoryFailure, EnumerationJob,
    JobOutcome, JobState, MemoryReporter, Severity, SweepError,
};
use ds_integration_tests::InMemoryDirectory;

use crate::common::{init_tracing, job_config, population, user, PASSWORD};

fn alice(uac: &str) -> Vec<ds_core::RawRecord> {
    vec![user("alice", Some("temp PASS 123"), uac)]
}

/// One enabled user, default keywords.
#[tokio::test]
async fn test_default_keywords_flag_enabled_user() -> anyhow::Result<()> {
    init_tracing();
    let directory = InMemoryDirectory::new(alice("512")).with_password(PASSWORD);
    let reporter = MemoryReporter::new();

    let mut job = EnumerationJob::new(
        directory.clone(),
        job_config("dc01.corp.local", "", 1000),
        reporter.clone(),
    );
    let report = job.run().await;

    assert!(report.is_success());
    assert_eq!(job.state(), &JobState::Completed);
    assert_eq!(
        report.matches,
        [ClassifiedRecord {
            primary_key: "alice".to_string(),
            description: "temp PASS 123".to_string(),
            status: AccountStatus::Enabled,
        }]
    );
    assert_eq!(reporter.highlights(), report.matches);
    assert_eq!(
        reporter.messages(Severity::Success),
        ["Found 1 users with matching descriptions."]
    );
    assert!(reporter
        .messages(Severity::Info)
        .contains(&"Using search filter: (objectClass=user)".to_string()));
    assert_eq!(directory.counters().closed.load(Ordering::SeqCst), 1);
    Ok(())
}

/// Disabled account with a custom keyword.
#[tokio::test]
async fn test_custom_keyword_flags_disabled_user() -> anyhow::Result<()> {
    let directory = InMemoryDirectory::new(alice("514"));
    let mut job = EnumerationJob::new(
        directory,
        job_config("dc01.corp.local", "temp", 1000),
        MemoryReporter::new(),
    );
    let report = job.run().await;

    assert!(report.is_success());
    assert_eq!(report.match_count(), 1);
    assert_eq!(report.matches[0].status, AccountStatus::Disabled);
    Ok(())
}

/// Nothing interesting: clean completion with zero matches.
#[tokio::test]
async fn test_no_match_completes_cleanly() -> anyhow::Result<()> {
    let directory = InMemoryDirectory::new(vec![
        user("bob", Some("nothing interesting"), "512"),
        user("carol", None, "512"),
    ]);
    let reporter = MemoryReporter::new();
    let mut job = EnumerationJob::new(
        directory,
        job_config("dc01.corp.local", "", 1000),
        reporter.clone(),
    );
    let report = job.run().await;

    assert!(report.is_success());
    assert_eq!(report.match_count(), 0);
    assert_eq!(report.records_seen, 2);
    assert!(reporter.messages(Severity::Success).is_empty());
    assert!(reporter
        .messages(Severity::Info)
        .contains(&"No users found with matching descriptions.".to_string()));
    Ok(())
}

/// Unreachable host: authentication failure, nothing queried or closed.
#[tokio::test]
async fn test_unreachable_host_fails_authentication() -> anyhow::Result<()> {
    let directory = InMemoryDirectory::new(alice("512")).with_unreachable("dc09.corp.local");
    let reporter = MemoryReporter::new();
    let mut job = EnumerationJob::new(
        directory.clone(),
        job_config("dc09.corp.local", "", 1000),
        reporter.clone(),
    );
    let report = job.run().await;

    assert!(matches!(report.outcome, JobOutcome::Failed(SweepError::Authentication(_))));
    assert!(matches!(job.state(), JobState::Failed(_)));
    assert_eq!(report.match_count(), 0);
    assert_eq!(report.pages_fetched, 0);
    assert_eq!(directory.counters().page_requests.load(Ordering::SeqCst), 0);
    assert_eq!(directory.counters().closed.load(Ordering::SeqCst), 0);

    let failures = reporter.messages(Severity::Failure);
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("Error occurred during directory connection"));
    Ok(())
}

/// Wrong password is an authentication failure too.
#[tokio::test]
async fn test_rejected_bind() -> anyhow::Result<()> {
    let directory = InMemoryDirectory::new(alice("512")).with_password("something else");
    let mut job = EnumerationJob::new(
        directory,
        job_config("dc01.corp.local", "", 1000),
        MemoryReporter::new(),
    );
    let report = job.run().await;

    let err = report.error().expect("job should fail");
    assert!(err.is_authentication());
    assert!(err.to_string().contains("invalid credentials"));
    Ok(())
}

/// Many pages arrive in server order with nothing duplicated.
#[tokio::test]
async fn test_paging_preserves_order() -> anyhow::Result<()> {
    let directory = InMemoryDirectory::new(population(2500));
    let mut job = EnumerationJob::new(
        directory,
        job_config("dc01.corp.local", "pw", 1000),
        MemoryReporter::new(),
    );
    let report = job.run().await;

    assert!(report.is_success());
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.records_seen, 2500);
    assert_eq!(report.match_count(), 250);

    let keys: Vec<&str> = report.matches.iter().map(|m| m.primary_key.as_str()).collect();
    let expected: Vec<String> = (0..2500).step_by(10).map(|i| format!("user{i:04}")).collect();
    assert_eq!(keys, expected);
    Ok(())
}

/// The first entry for an account wins when the server repeats it.
#[tokio::test]
async fn test_duplicate_accounts_keep_first() -> anyhow::Result<()> {
    let directory = InMemoryDirectory::new(vec![
        user("svc_sql", Some("pw in vault"), "512"),
        user("svc_sql_old", Some("old PW"), "514"),
        user("svc_sql", Some("PW rotated"), "514"),
    ]);
    let mut job = EnumerationJob::new(
        directory,
        job_config("dc01.corp.local", "", 2),
        MemoryReporter::new(),
    );
    let report = job.run().await;

    assert_eq!(report.match_count(), 2);
    assert_eq!(report.matches[0].primary_key, "svc_sql");
    assert_eq!(report.matches[0].description, "pw in vault");
    assert_eq!(report.matches[1].primary_key, "svc_sql_old");
    Ok(())
}

/// A page failing mid-stream keeps earlier matches and closes the session.
#[tokio::test]
async fn test_mid_stream_failure_keeps_partial_matches() -> anyhow::Result<()> {
    let directory = InMemoryDirectory::new(population(30)).with_failing_page(1);
    let reporter = MemoryReporter::new();
    let mut job = EnumerationJob::new(
        directory.clone(),
        job_config("dc01.corp.local", "pw", 10),
        reporter.clone(),
    );
    let report = job.run().await;

    assert!(matches!(report.outcome, JobOutcome::Failed(SweepError::Query(_))));
    assert_eq!(report.records_seen, 10);
    assert_eq!(report.match_count(), 1);
    assert_eq!(report.matches[0].primary_key, "user0000");
    assert_eq!(directory.counters().closed.load(Ordering::SeqCst), 1);
    assert!(reporter.messages(Severity::Failure)[0].starts_with("Error occurred during search"));
    Ok(())
}

/// Cancellation between pages keeps what was already collected.
#[tokio::test]
async fn test_cancellation_between_pages() -> anyhow::Result<()> {
    let token = CancellationToken::new();
    let directory = InMemoryDirectory::new(population(30)).with_cancel_after_page(0, token.clone());
    let mut job = EnumerationJob::new(
        directory.clone(),
        job_config("dc01.corp.local", "pw", 10),
        MemoryReporter::new(),
    )
    .with_cancellation(token);
    let report = job.run().await;

    assert!(matches!(report.outcome, JobOutcome::Cancelled));
    assert_eq!(job.state(), &JobState::Cancelled);
    assert_eq!(report.records_seen, 10);
    assert_eq!(report.match_count(), 1);
    assert_eq!(directory.counters().closed.load(Ordering::SeqCst), 1);
    Ok(())
}

/// A connect that never finishes times out as an authentication failure.
#[tokio::test(start_paused = true)]
async fn test_connect_timeout() -> anyhow::Result<()> {
    let directory = InMemoryDirectory::new(alice("512")).with_open_delay(Duration::from_secs(60));
    let mut job = EnumerationJob::new(
        directory,
        job_config("dc01.corp.local", "", 1000),
        MemoryReporter::new(),
    );
    let report = job.run().await;

    match report.outcome {
        JobOutcome::Failed(SweepError::Authentication(DirectoryFailure::Timeout(limit))) => {
            assert_eq!(limit, Duration::from_secs(5));
        }
        other => panic!("expected connect timeout, got {other:?}"),
    }
    Ok(())
}
