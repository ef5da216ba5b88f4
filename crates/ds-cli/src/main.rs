//! # descsweep
//!
//! Flags directory accounts whose description contains a keyword.

#![forbid(unsafe_code)]

use std::process::ExitCode;

use clap::Parser;
use ds_cli::{
    cli::Cli,
    commands::{exit_code, run_sweep, EXIT_FAILED},
    config::CliConfig,
    output::{self, error, warning},
};
use ds_core::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error(&format!("Failed to load configuration: {e}"));
            return ExitCode::from(EXIT_FAILED);
        }
    };

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warning("Interrupted, cancelling running jobs");
            interrupt.cancel();
        }
    });

    let reports = match run_sweep(&cli, &config, cancel).await {
        Ok(reports) => reports,
        Err(e) => {
            error(&e.to_string());
            return ExitCode::from(EXIT_FAILED);
        }
    };

    if let Err(e) = output::output(&reports, cli.output_format(&config)) {
        error(&e.to_string());
        return ExitCode::from(EXIT_FAILED);
    }

    ExitCode::from(exit_code(&reports))
}
