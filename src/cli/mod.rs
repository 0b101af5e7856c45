//! Command-line interface for Noodle.
//!
//! Two subcommands share the same walk arguments:
//!
//! - `graph` - build the composition graph of a layer and render it as a
//!   tree, indented text, JSON or Graphviz DOT
//! - `check` - build the graph and report every offline dependency, exiting
//!   non-zero when anything is missing
//!
//! # Global Options
//!
//! - `--verbose` - debug logging on stderr
//! - `--quiet` - only errors
//! - `--config` - path to a config file instead of `~/.noodle/config.toml`
//!
//! # Example
//!
//! ```bash
//! # Tree of everything shot.usda pulls in, including textures
//! noodle graph shot.usda --textures
//!
//! # Same walk as DOT, rendered with Graphviz
//! noodle graph -i shot.usda --format dot | dot -Tsvg > shot.svg
//!
//! # CI gate: fail when a referenced file is missing
//! noodle --quiet check shot.usda --search-path /show/assets
//! ```

mod check;
pub mod common;
mod graph;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::GlobalConfig;

/// Runtime configuration derived from the global flags.
///
/// Kept separate from [`Cli`] so logging and config discovery can be driven
/// from tests without parsing arguments.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Default log filter when `RUST_LOG` is unset.
    ///
    /// `None` means errors only.
    pub log_level: Option<String>,

    /// Explicit config file path from `--config`.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the stderr `tracing` subscriber.
    ///
    /// `RUST_LOG` takes precedence over the level chosen by the flags. Calling
    /// this twice is harmless; the second subscriber is rejected.
    pub fn init_logging(&self) {
        let default_level = self.log_level.as_deref().unwrap_or("error");
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("noodle={default_level}")));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Load the global configuration this run should use.
    ///
    /// # Errors
    ///
    /// Fails when an explicit config path does not exist or any config file is invalid.
    pub fn load_global_config(&self) -> Result<GlobalConfig> {
        GlobalConfig::load_with_optional(self.config_path.clone())
    }
}

/// Noodle: map what a scene layer pulls in.
#[derive(Parser)]
#[command(
    name = "noodle",
    about = "Map the composition dependencies of scene description layers",
    version,
    long_about = "Noodle walks a root layer through its sublayers, references, payloads, \
                  value clips, variant sets and (optionally) asset attributes, and reports \
                  every file it depends on and whether that file exists."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a custom configuration file
    ///
    /// Overrides `~/.noodle/config.toml` and the `NOODLE_CONFIG` variable.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dependency graph of a layer and print it
    Graph(graph::GraphCommand),

    /// Report offline dependencies; exits with status 1 if any are found
    Check(check::CheckCommand),
}

impl Cli {
    /// Run the selected subcommand.
    ///
    /// # Errors
    ///
    /// Propagates configuration, walk and output errors; `main` turns them
    /// into user-facing messages.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(&config)
    }

    /// Map the global flags to a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Run with an explicit runtime configuration.
    ///
    /// # Errors
    ///
    /// See [`Cli::execute`].
    pub fn execute_with_config(self, config: &CliConfig) -> Result<()> {
        config.init_logging();
        let global = config.load_global_config()?;

        match self.command {
            Commands::Graph(cmd) => cmd.execute(&global),
            Commands::Check(cmd) => cmd.execute(&global, self.quiet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_levels() {
        let cli = Cli::parse_from(["noodle", "--verbose", "graph", "a.usda"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("debug"));

        let cli = Cli::parse_from(["noodle", "-q", "check", "a.usda"]);
        assert_eq!(cli.build_config().log_level, None);

        let cli = Cli::parse_from(["noodle", "graph", "a.usda", "--config", "/tmp/n.toml"]);
        let config = cli.build_config();
        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert_eq!(config.config_path, Some(PathBuf::from("/tmp/n.toml")));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = Cli::try_parse_from(["noodle", "-v", "-q", "graph", "a.usda"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let config = CliConfig {
            log_level: None,
            config_path: Some(PathBuf::from("/nonexistent/noodle/config.toml")),
        };
        let err = config.load_global_config().unwrap_err();
        assert!(err.to_string().contains("Configuration file not found"));
    }
}
