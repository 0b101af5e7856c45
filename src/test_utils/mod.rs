//! Test utilities for Noodle
//!
//! This module provides helpers shared by unit and integration tests:
//! - An in-memory composition service with layer and entity builders
//! - Fixture scenes written to disk for filesystem and CLI tests
//! - One-time logging setup
//!
//! # Example
//!
//! ```rust,no_run
//! use noodle::test_utils::{LayerBuilder, MemoryCompositionService};
//! use noodle::walker::DependencyWalker;
//!
//! let service = MemoryCompositionService::new()
//!     .with_layer(LayerBuilder::new("/a.usda").sublayer("./b.usda").build())
//!     .with_layer(LayerBuilder::new("/b.usda").build());
//!
//! let graph = DependencyWalker::new(service).build("/a.usda").unwrap();
//! assert_eq!(graph.node_count(), 2);
//! ```

pub mod builder;
pub mod fixtures;
pub mod memory;

pub use builder::{EntityBuilder, LayerBuilder};
pub use fixtures::{LayerFixture, SceneFixture};
pub use memory::MemoryCompositionService;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` if given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=noodle=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
