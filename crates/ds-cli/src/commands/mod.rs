//! Command implementations.

pub mod sweep;

pub use sweep::{exit_code, run_jobs, run_sweep, EXIT_CANCELLED, EXIT_FAILED, EXIT_OK};
