//! # ds-cli
//!
//! The `descsweep` command-line tool.
//!
//! This crate provides:
//! - Argument parsing with environment fallbacks for secrets
//! - A TOML configuration file under `~/.descsweep/`
//! - Console, JSON and quiet rendering of job results
//! - Parallel enumeration jobs, one per target host, cancelled by Ctrl-C

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
