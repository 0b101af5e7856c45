//! Build and display the composition graph of a layer.
//!
//! # Examples
//!
//! ```bash
//! noodle graph shot.usda
//! noodle graph shot.usda --textures --depth 2
//! noodle graph -i shot.usda --format json
//! noodle graph shot.usda --format dot | dot -Tpng > shot.png
//! ```
//!
//! # Output Format
//!
//! ## Tree Format (Default)
//! ```text
//! root.usda /show/shot/root.usda
//! ├── layout.usda sublayer
//! │   ├── set_geo.usda payload
//! │   └── look variant [red]
//! │       ├── red.usda red
//! │       └── blue.usda blue (offline)
//! ├── tree.usda reference
//! └── crowd.1001-1003.usd clip [3 frames]
//!     └── manifest.usda manifest
//!
//! (*) = already shown above
//! ```
//!
//! Children are listed in discovery order. Variant members are labelled with
//! the variant name rather than the arc type.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::str::FromStr;

use super::common::WalkArgs;
use crate::config::GlobalConfig;
use crate::core::NoodleError;
use crate::graph::{CompositionGraph, Edge, Node, NodeKind};

/// Output formats of `noodle graph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Box-drawing tree (default)
    Tree,
    /// Indented plain text with full keys
    Text,
    /// Serialized node map and edge list
    Json,
    /// Graphviz DOT
    Dot,
}

impl FromStr for OutputFormat {
    type Err = NoodleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tree" => Ok(Self::Tree),
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "dot" => Ok(Self::Dot),
            _ => Err(NoodleError::InvalidFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Command to print the dependency graph of a layer.
#[derive(Args, Debug)]
pub struct GraphCommand {
    #[command(flatten)]
    walk: WalkArgs,

    /// Output format (tree, text, json, dot)
    #[arg(short = 'f', long, default_value = "tree")]
    format: String,

    /// Maximum display depth for tree and text output
    ///
    /// Only limits what is printed; use `--max-depth` to limit the walk itself.
    #[arg(short = 'd', long)]
    depth: Option<usize>,

    /// Don't deduplicate repeated dependencies
    ///
    /// By default a node reached a second time is marked with (*) and its
    /// children are not repeated.
    #[arg(long)]
    no_dedupe: bool,
}

impl GraphCommand {
    /// Walk the layer and print the graph on stdout.
    ///
    /// # Errors
    ///
    /// Invalid arguments, an unresolvable root, or a JSON serialization failure.
    pub fn execute(self, config: &GlobalConfig) -> Result<()> {
        let format = self.validate_arguments()?;
        let graph = self.walk.build_graph(config)?;

        tracing::info!(
            "Built graph of {} with {} nodes and {} edges",
            graph.root(),
            graph.node_count(),
            graph.edge_count()
        );

        let renderer = GraphRenderer {
            depth: self.depth,
            dedupe: !self.no_dedupe,
        };
        print!("{}", renderer.render(&graph, format)?);
        Ok(())
    }

    fn validate_arguments(&self) -> Result<OutputFormat> {
        let format = self.format.parse::<OutputFormat>()?;

        if let Some(depth) = self.depth
            && depth == 0
        {
            return Err(anyhow::anyhow!("Depth must be at least 1"));
        }

        Ok(format)
    }
}

/// Renders a [`CompositionGraph`] to a string.
#[derive(Debug, Clone, Copy)]
pub struct GraphRenderer {
    /// Levels below the root to print (`None` for all)
    pub depth: Option<usize>,
    /// Print repeated nodes once, marking later occurrences with (*)
    pub dedupe: bool,
}

impl Default for GraphRenderer {
    fn default() -> Self {
        Self {
            depth: None,
            dedupe: true,
        }
    }
}

/// Per-render traversal state.
struct Walk<'g> {
    graph: &'g CompositionGraph,
    displayed: HashSet<&'g str>,
    ancestors: Vec<&'g str>,
    duplicates: bool,
    out: String,
}

impl GraphRenderer {
    /// Render `graph` in `format`.
    ///
    /// # Errors
    ///
    /// Only JSON output can fail.
    pub fn render(&self, graph: &CompositionGraph, format: OutputFormat) -> Result<String> {
        Ok(match format {
            OutputFormat::Tree => self.render_tree(graph),
            OutputFormat::Text => self.render_text(graph),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(graph)?;
                json.push('\n');
                json
            }
            OutputFormat::Dot => graph.to_dot(),
        })
    }

    /// Box-drawing tree with colored labels and a legend for duplicates.
    #[must_use]
    pub fn render_tree(&self, graph: &CompositionGraph) -> String {
        let mut walk = Walk::new(graph);
        let Some(root) = graph.root_node() else {
            return walk.out;
        };

        let _ = writeln!(
            walk.out,
            "{} {}{}",
            root.label().cyan().bold(),
            root.key.bright_black(),
            offline_marker(root)
        );
        walk.enter(root);

        let children: Vec<&Edge> = graph.edges_from(graph.root()).collect();
        for (i, edge) in children.iter().enumerate() {
            self.tree_node(&mut walk, edge, "", i == children.len() - 1, 1);
        }

        if self.dedupe && walk.duplicates {
            walk.out.push('\n');
            let _ = writeln!(walk.out, "{}", "(*) = already shown above".bright_black());
        }
        walk.out
    }

    fn tree_node<'g>(
        &self,
        walk: &mut Walk<'g>,
        edge: &'g Edge,
        prefix: &str,
        is_last: bool,
        level: usize,
    ) {
        if self.depth.is_some_and(|max| level > max) {
            return;
        }
        let graph = walk.graph;
        let Some(node) = graph.node(&edge.to) else {
            return;
        };

        let repeat = walk.repeat_marker(node, self.dedupe);
        let connector = if is_last { "└── " } else { "├── " };
        let label = if node.online {
            node.label().normal()
        } else {
            node.label().red()
        };
        let _ = writeln!(
            walk.out,
            "{prefix}{connector}{label} {}{}{}{}",
            dim(&edge.kind.to_string()),
            dim(&kind_detail(node)),
            offline_marker(node),
            dim(repeat)
        );

        if !repeat.is_empty() {
            return;
        }

        walk.enter(node);
        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };
        let children: Vec<&Edge> = graph.edges_from(&node.key).collect();
        for (i, child) in children.iter().enumerate() {
            self.tree_node(walk, child, &child_prefix, i == children.len() - 1, level + 1);
        }
        walk.leave();
    }

    /// Indented plain text: `<relationship> <key>` per line, two spaces per level.
    #[must_use]
    pub fn render_text(&self, graph: &CompositionGraph) -> String {
        let mut walk = Walk::new(graph);
        let Some(root) = graph.root_node() else {
            return walk.out;
        };

        let _ = writeln!(walk.out, "root {}{}", root.key, plain_offline(root));
        walk.enter(root);
        for edge in graph.edges_from(graph.root()) {
            self.text_node(&mut walk, edge, 1);
        }
        walk.out
    }

    fn text_node<'g>(&self, walk: &mut Walk<'g>, edge: &'g Edge, level: usize) {
        if self.depth.is_some_and(|max| level > max) {
            return;
        }
        let graph = walk.graph;
        let Some(node) = graph.node(&edge.to) else {
            return;
        };

        let repeat = walk.repeat_marker(node, self.dedupe);
        let _ = writeln!(
            walk.out,
            "{}{} {}{}{}",
            "  ".repeat(level),
            edge.kind,
            node.key,
            plain_offline(node),
            repeat
        );
        if !repeat.is_empty() {
            return;
        }

        walk.enter(node);
        for child in graph.edges_from(&node.key) {
            self.text_node(walk, child, level + 1);
        }
        walk.leave();
    }
}

impl<'g> Walk<'g> {
    fn new(graph: &'g CompositionGraph) -> Self {
        Self {
            graph,
            displayed: HashSet::new(),
            ancestors: Vec::new(),
            duplicates: false,
            out: String::new(),
        }
    }

    /// Marker for a node that must not be expanded again, or "" to expand it.
    ///
    /// Cycles are cut even with deduplication off.
    fn repeat_marker(&mut self, node: &Node, dedupe: bool) -> &'static str {
        if self.ancestors.iter().any(|key| *key == node.key) {
            " (cycle)"
        } else if dedupe && self.displayed.contains(node.key.as_str()) {
            self.duplicates = true;
            " (*)"
        } else {
            ""
        }
    }

    fn enter(&mut self, node: &'g Node) {
        self.displayed.insert(&node.key);
        self.ancestors.push(&node.key);
    }

    fn leave(&mut self) {
        self.ancestors.pop();
    }
}

fn kind_detail(node: &Node) -> String {
    match &node.kind {
        NodeKind::Texture {
            color_space: Some(color_space),
        } => format!(" [{color_space}]"),
        NodeKind::Variant(info) => match &info.selected {
            Some(selected) => format!(" [{selected}]"),
            None => String::new(),
        },
        NodeKind::Clip(info) => format!(" [{} frames]", info.frame_count),
        _ => String::new(),
    }
}

fn dim(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        text.bright_black().to_string()
    }
}

fn offline_marker(node: &Node) -> String {
    if node.online {
        String::new()
    } else {
        " (offline)".red().to_string()
    }
}

fn plain_offline(node: &Node) -> &'static str {
    if node.online { "" } else { " (offline)" }
}
