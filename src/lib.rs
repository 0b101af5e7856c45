//! Noodle - composition dependency graph explorer
//!
//! Noodle walks a scene description root layer and records everything it pulls
//! in: sublayers, references, payloads, value clip sequences, variant sets and,
//! optionally, asset-valued attributes such as textures. The result is a
//! [`CompositionGraph`](graph::CompositionGraph) of unique nodes and typed
//! edges, with every node marked online or offline depending on whether its
//! file exists.
//!
//! # Architecture Overview
//!
//! - A [`CompositionService`](service::CompositionService) opens layers,
//!   anchors relative asset paths and answers existence checks. The default
//!   [`FsCompositionService`](service::FsCompositionService) reads text layers
//!   from disk through the [`usda`] parser.
//! - The [`DependencyWalker`](walker::DependencyWalker) recursively walks
//!   layers through a service, collapsing clip frames into sequences and
//!   guarding against cycles.
//! - The [`cli`] renders the graph as a tree, text, JSON or Graphviz DOT and
//!   can fail a build when dependencies are missing.
//!
//! # Core Modules
//!
//! - [`graph`] - Node/edge model, clip sequence collapsing, DOT export
//! - [`walker`] - Graph construction
//! - [`service`] - Composition service trait, layer model, filesystem backend
//! - [`usda`] - Text layer grammar and reader
//! - [`config`] - Global configuration (`~/.noodle/config.toml`)
//! - [`core`] - Error types and user-facing error contexts
//! - [`utils`] - Path helpers
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use noodle::service::FsCompositionService;
//! use noodle::walker::{DependencyWalker, WalkOptions};
//!
//! # fn example() -> anyhow::Result<()> {
//! let walker = DependencyWalker::new(FsCompositionService::new())
//!     .with_options(WalkOptions::default().with_attributes(true));
//! let graph = walker.build("/show/shot/root.usda")?;
//!
//! for node in graph.offline_nodes() {
//!     println!("missing {} ({})", node.key, node.kind);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod graph;
pub mod service;
pub mod usda;
pub mod utils;
pub mod walker;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
