//! End-to-End Integration Tests
//!
//! These tests drive complete enumeration jobs against the in-memory
//! directory from `ds-integration-tests`.

mod common;
mod parallel;
mod scenarios;
