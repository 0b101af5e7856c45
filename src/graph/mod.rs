//! Composition graph data model.
//!
//! A [`CompositionGraph`] is what one run of the
//! [`DependencyWalker`](crate::walker::DependencyWalker) produces: a node map keyed
//! by canonical key plus an edge list of typed parent → child relationships.
//!
//! # Keys
//!
//! - File-backed nodes are keyed by their resolved, canonical path
//! - Clip sequences are keyed by a collapsed frame-range template
//!   (`render.1001-1024.usd`, see [`clip`])
//! - Variant sets are keyed by `<layer-key>:<set name>`
//!
//! # Invariants
//!
//! - Keys are unique; inserting an existing key never replaces the first node
//! - `(from, to, kind)` triples are unique
//! - Every edge endpoint is present in the node map
//!
//! The graph is build-once: the walker fills it and hands it out, after which it
//! is only read.

pub mod clip;

use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::utils::paths::file_name;

/// Authored metadata of a layer, recorded when the layer is walked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInfo {
    /// Name of the default prim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_prim: Option<String>,
    /// Documentation string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Remaining layer metadata as display strings (`upAxis`, `startTimeCode`, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// Metadata for a collapsed clip sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipInfo {
    /// Name of the clip set the sequence was declared in
    pub clip_set: String,
    /// Frame token of the first declared asset
    pub first_frame: Option<String>,
    /// Frame token of the last declared asset
    pub last_frame: Option<String>,
    /// Number of declared assets
    pub frame_count: usize,
    /// Resolved manifest layer, if one was declared
    pub manifest: Option<String>,
}

/// Metadata for a variant set node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantInfo {
    /// Variant set name
    pub variant_set: String,
    /// Every variant authored in the set
    pub variants: Vec<String>,
    /// Variant selected on the owning entity
    pub selected: Option<String>,
}

/// What a node is, carrying the data specific to that kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// The layer the walk started from
    Root {
        /// Filled once the layer has been opened
        layer: Option<LayerInfo>,
    },
    /// A layer stacked under another
    Sublayer {
        /// Filled once the layer has been opened
        layer: Option<LayerInfo>,
    },
    /// A referenced layer
    Reference {
        /// Filled once the layer has been opened
        layer: Option<LayerInfo>,
    },
    /// A payload layer
    Payload {
        /// Filled once the layer has been opened
        layer: Option<LayerInfo>,
    },
    /// A collapsed clip sequence
    Clip(ClipInfo),
    /// A variant set (one node per set, not per variant)
    Variant(VariantInfo),
    /// An image or video file referenced from an asset attribute
    Texture {
        /// Colorspace authored on the attribute
        color_space: Option<String>,
    },
    /// Any other file referenced from an asset attribute
    Asset,
    /// The manifest layer of a clip set
    Manifest,
}

impl NodeKind {
    /// Short name of the kind, as used in output
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Root { .. } => "root",
            Self::Sublayer { .. } => "sublayer",
            Self::Reference { .. } => "reference",
            Self::Payload { .. } => "payload",
            Self::Clip(_) => "clip",
            Self::Variant(_) => "variant",
            Self::Texture { .. } => "texture",
            Self::Asset => "asset",
            Self::Manifest => "manifest",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One unique entity in the composition graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique key (see module docs)
    pub key: String,
    /// Kind and kind-specific attributes
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Whether the underlying file(s) exist
    pub online: bool,
    /// Resolver output; for clips the first declared frame
    pub resolved_path: String,
}

impl Node {
    /// Create a node.
    pub fn new(
        key: impl Into<String>,
        kind: NodeKind,
        online: bool,
        resolved_path: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            kind,
            online,
            resolved_path: resolved_path.into(),
        }
    }

    /// Layer metadata, for layer nodes that have been walked.
    #[must_use]
    pub fn layer_info(&self) -> Option<&LayerInfo> {
        match &self.kind {
            NodeKind::Root { layer }
            | NodeKind::Sublayer { layer }
            | NodeKind::Reference { layer }
            | NodeKind::Payload { layer } => layer.as_ref(),
            _ => None,
        }
    }

    /// Record layer metadata. Ignored for non-layer kinds.
    pub fn set_layer_info(&mut self, info: LayerInfo) {
        match &mut self.kind {
            NodeKind::Root { layer }
            | NodeKind::Sublayer { layer }
            | NodeKind::Reference { layer }
            | NodeKind::Payload { layer } => *layer = Some(info),
            _ => {}
        }
    }

    /// Short label: the file name for file-backed nodes, the set name for variants.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.kind {
            NodeKind::Variant(info) => info.variant_set.clone(),
            _ => file_name(&self.key).to_string(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The relationship an edge records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    /// Layer → sublayer
    Sublayer,
    /// Layer → referenced layer
    Reference,
    /// Layer → payload layer
    Payload,
    /// Layer → clip sequence
    Clip,
    /// Clip sequence → manifest layer
    Manifest,
    /// Layer → variant set
    Variant,
    /// Variant set → layer referenced or payloaded inside the named variant
    VariantMember(String),
    /// Layer → texture file
    Texture,
    /// Layer → other asset file
    Asset,
}

impl EdgeKind {
    /// Category name, independent of the variant carried by `VariantMember`
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sublayer => "sublayer",
            Self::Reference => "reference",
            Self::Payload => "payload",
            Self::Clip => "clip",
            Self::Manifest => "manifest",
            Self::Variant => "variant",
            Self::VariantMember(_) => "variant-member",
            Self::Texture => "texture",
            Self::Asset => "asset",
        }
    }
}

impl fmt::Display for EdgeKind {
    /// Variant members display as the variant name, everything else as the category.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VariantMember(variant) => f.write_str(variant),
            other => f.write_str(other.name()),
        }
    }
}

/// A directed, typed relationship between two node keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Parent key
    pub from: String,
    /// Child key
    pub to: String,
    /// Relationship
    pub kind: EdgeKind,
}

/// Node map and edge list produced by one walk.
#[derive(Debug, Clone, Serialize)]
pub struct CompositionGraph {
    root: String,
    root_resolved: bool,
    nodes: BTreeMap<String, Node>,
    edges: Vec<Edge>,
    #[serde(skip)]
    edge_index: HashSet<Edge>,
}

impl CompositionGraph {
    /// Create a graph holding only `root`.
    #[must_use]
    pub fn new(root: Node) -> Self {
        let key = root.key.clone();
        let mut nodes = BTreeMap::new();
        nodes.insert(key.clone(), root);
        Self {
            root: key,
            root_resolved: false,
            nodes,
            edges: Vec::new(),
            edge_index: HashSet::new(),
        }
    }

    /// Key of the root node.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Root node.
    #[must_use]
    pub fn root_node(&self) -> Option<&Node> {
        self.nodes.get(&self.root)
    }

    /// Whether the root layer could be opened.
    ///
    /// A graph with an unresolved root is a valid result holding only the
    /// (offline) root node; callers decide whether to report it.
    #[must_use]
    pub const fn root_resolved(&self) -> bool {
        self.root_resolved
    }

    pub(crate) fn mark_root_resolved(&mut self) {
        self.root_resolved = true;
    }

    /// Insert a node unless its key is already present.
    ///
    /// Returns `true` if the node was inserted. The first node registered for
    /// a key wins.
    pub fn insert_node(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(&node.key) {
            return false;
        }
        self.nodes.insert(node.key.clone(), node);
        true
    }

    /// Add an edge unless the same `(from, to, kind)` triple exists.
    ///
    /// Returns `true` if the edge was added. Both endpoints must already be
    /// nodes of the graph; edges to unknown keys are refused.
    pub fn add_edge(&mut self, from: &str, to: &str, kind: EdgeKind) -> bool {
        if !self.nodes.contains_key(from) || !self.nodes.contains_key(to) {
            tracing::warn!("Refusing edge {from} -> {to}: endpoint not in graph");
            return false;
        }

        let edge = Edge {
            from: from.to_string(),
            to: to.to_string(),
            kind,
        };
        if self.edge_index.contains(&edge) {
            return false;
        }
        self.edge_index.insert(edge.clone());
        self.edges.push(edge);
        true
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, key: &str) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub(crate) fn node_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    /// Whether a key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Nodes in key order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// The node map.
    #[must_use]
    pub const fn node_map(&self) -> &BTreeMap<String, Node> {
        &self.nodes
    }

    /// Edges in discovery order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Outgoing edges of `key`, in discovery order.
    pub fn edges_from<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.from == key)
    }

    /// Incoming edges of `key`, in discovery order.
    pub fn edges_to<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.to == key)
    }

    /// Whether the graph holds the given triple.
    #[must_use]
    pub fn has_edge(&self, from: &str, to: &str, kind: &EdgeKind) -> bool {
        self.edge_index.contains(&Edge {
            from: from.to_string(),
            to: to.to_string(),
            kind: kind.clone(),
        })
    }

    /// Nodes whose files are missing, in key order.
    #[must_use]
    pub fn offline_nodes(&self) -> Vec<&Node> {
        self.nodes.values().filter(|n| !n.online).collect()
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph holds nothing beyond the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.nodes.len() <= 1
    }

    /// Borrowing petgraph view of the graph, for algorithms and export.
    #[must_use]
    pub fn to_digraph(&self) -> DiGraph<&Node, &EdgeKind> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(self.nodes.len());

        for (key, node) in &self.nodes {
            index.insert(key.as_str(), graph.add_node(node));
        }
        for edge in &self.edges {
            if let (Some(&a), Some(&b)) = (index.get(edge.from.as_str()), index.get(edge.to.as_str()))
            {
                graph.add_edge(a, b, &edge.kind);
            }
        }

        graph
    }

    /// Render the graph in Graphviz DOT format.
    ///
    /// Offline nodes are drawn red and dashed; variant-member edges are dotted.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let graph = self.to_digraph();
        let dot = Dot::with_attr_getters(
            &graph,
            &[],
            &|_, edge| match edge.weight() {
                EdgeKind::VariantMember(_) => "style = dotted".to_string(),
                _ => String::new(),
            },
            &|_, (_, node)| {
                let shape = match node.kind {
                    NodeKind::Variant(_) => "diamond",
                    NodeKind::Clip(_) => "folder",
                    NodeKind::Texture { .. } | NodeKind::Asset => "note",
                    _ => "box",
                };
                if node.online {
                    format!("shape = {shape}, tooltip = \"{}\"", node.key.escape_debug())
                } else {
                    format!(
                        "shape = {shape}, color = red, style = dashed, tooltip = \"{}\"",
                        node.key.escape_debug()
                    )
                }
            },
        );
        format!("{dot}")
    }
}
