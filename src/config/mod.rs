//! Configuration management for Noodle
//!
//! Noodle reads a single optional user configuration file holding walk
//! defaults. Command line flags always override it.
//!
//! # Precedence
//!
//! 1. Command line flags (`--textures`, `--max-depth`, `--search-path`)
//! 2. `--config <FILE>` or the `NOODLE_CONFIG` environment variable
//! 3. `~/.noodle/config.toml`
//! 4. Built-in defaults
//!
//! Search directories from `NOODLE_SEARCH_PATH` (platform path-list syntax)
//! are appended after the configured ones.
//!
//! See [`GlobalConfig`] for the file format.

mod global;

pub use global::GlobalConfig;
