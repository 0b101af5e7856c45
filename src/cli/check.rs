//! Report dependencies whose files are missing.
//!
//! ```bash
//! noodle check shot.usda --textures
//! ```
//!
//! Prints a summary and one line per offline node with the layers that
//! point at it. Exits with status 1 when any node is offline, so it can gate
//! publishes in CI.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fmt::Write as _;

use super::common::WalkArgs;
use crate::config::GlobalConfig;
use crate::core::NoodleError;
use crate::graph::CompositionGraph;

/// Command to list offline dependencies.
#[derive(Args, Debug)]
pub struct CheckCommand {
    #[command(flatten)]
    walk: WalkArgs,
}

impl CheckCommand {
    /// Walk the layer and report offline nodes.
    ///
    /// With `quiet` only the error is reported.
    ///
    /// # Errors
    ///
    /// [`NoodleError::OfflineDependencies`] when anything is offline, plus
    /// the walk errors of [`WalkArgs::build_graph`].
    pub fn execute(self, config: &GlobalConfig, quiet: bool) -> Result<()> {
        let graph = self.walk.build_graph(config)?;
        let offline = graph.offline_nodes().len();

        if !quiet {
            print!("{}", report(&graph));
        }

        if offline > 0 {
            return Err(NoodleError::OfflineDependencies {
                count: offline,
            }
            .into());
        }
        Ok(())
    }
}

/// Summary line plus one entry per offline node.
fn report(graph: &CompositionGraph) -> String {
    let mut out = String::new();
    let offline = graph.offline_nodes();

    let _ = writeln!(
        out,
        "Checked {}: {} nodes, {} edges",
        graph.root(),
        graph.node_count(),
        graph.edge_count()
    );

    if offline.is_empty() {
        let _ = writeln!(out, "{} All dependencies are online", "✓".green());
        return out;
    }

    let _ = writeln!(out, "{} {} offline:", "✗".red(), offline.len());
    for node in offline {
        let _ = writeln!(out, "  {} {}", node.kind.name().bright_black(), node.key.red());
        for edge in graph.edges_to(&node.key) {
            let _ = writeln!(out, "    from {} ({})", edge.from, edge.kind);
        }
    }
    out
}
