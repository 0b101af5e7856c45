//! Integration test suite for Noodle
//!
//! End-to-end tests that run the `noodle` binary against scenes written to
//! temporary directories.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **graph**: `noodle graph` output formats and walk flags
//! - **check**: `noodle check` reporting and exit codes
//! - **config**: config file and environment handling

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod check;
mod config;
mod graph;
