//! Common test utilities and fixtures.

use std::time::Duration;

use ds_core::{Credential, Endpoint, JobConfig, PasswordCredential, RawRecord};

/// Password the fixture directory accepts.
pub const PASSWORD: &str = "Winter2024!";

/// Initializes tracing for tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("ds_core=debug")
        .with_test_writer()
        .try_init();
}

/// A user entry with the usual three attributes.
pub fn user(name: &str, description: Option<&str>, uac: &str) -> RawRecord {
    let record = RawRecord::new(format!("CN={name},CN=Users,DC=corp,DC=local"))
        .with_attr("sAMAccountName", name)
        .with_attr("userAccountControl", uac);
    match description {
        Some(d) => record.with_attr("description", d),
        None => record,
    }
}

/// `count` enabled users, where every tenth one has a password hint.
pub fn population(count: usize) -> Vec<RawRecord> {
    (0..count)
        .map(|i| {
            let name = format!("user{i:04}");
            if i % 10 == 0 {
                user(&name, Some(&format!("initial pw {i}")), "512")
            } else {
                user(&name, Some("Sales"), "512")
            }
        })
        .collect()
}

/// The bind credential the fixture directory accepts.
pub fn credential() -> Credential {
    PasswordCredential::new("auditor", "corp.local", PASSWORD).into()
}

/// A job against `host` with `keywords` and the given page size.
pub fn job_config(host: &str, keywords: &str, page_size: u32) -> JobConfig {
    JobConfig::from_keyword_list(Endpoint::for_domain(host, "corp.local"), credential(), keywords)
        .with_page_size(page_size)
        .expect("valid page size")
        .with_connect_timeout(Some(Duration::from_secs(5)))
}
