//! Depth-first composition walker.
//!
//! [`DependencyWalker::build`] starts at a root layer and follows every
//! composition arc it can see, producing a [`CompositionGraph`].
//!
//! # Traversal
//!
//! For each layer, in this order:
//!
//! 1. Sublayers
//! 2. For every entity in the layer (depth first):
//!    references, payloads, clip sets, variant sets (every variant, not only
//!    the selected one), and asset attributes when enabled
//! 3. Recurse into the discovered sublayers, then references, then payloads
//!
//! Paths are always resolved against the layer that authored them. A visited
//! set keyed by canonical layer key makes cycles and diamonds terminate, and the
//! graph itself refuses duplicate keys and duplicate `(from, to, kind)` edges, so
//! building the same root twice yields the same graph.
//!
//! # Failure handling
//!
//! Nothing below the root fails the build. Missing files become offline nodes,
//! unresolvable or empty paths are skipped, and layers that cannot be opened
//! are kept as leaves.
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
//! let graph = walker.build("/show/s01/shot.usda")?;
//! for node in graph.offline_nodes() {
//!     println!("missing: {}", node.key);
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;

use tracing::{debug, info, trace, warn};

use crate::constants::TEXTURE_EXTENSIONS;
use crate::core::NoodleError;
use crate::graph::clip::collapse_sequence;
use crate::graph::{ClipInfo, CompositionGraph, EdgeKind, Node, NodeKind, VariantInfo};
use crate::service::{AttributeSpec, ClipDeclaration, CompositionService, LayerSpec, VariantSet};
use crate::utils::paths::{anchor_relative, canonical_key, extension, is_absolute_key};

/// Tunables for a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    /// Follow asset-valued attributes to texture and asset nodes
    pub walk_attributes: bool,
    /// Do not descend into layers nested deeper than this (root is level 0)
    pub max_depth: Option<usize>,
    /// Lower-case extensions, with dot, classified as textures
    pub texture_extensions: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            walk_attributes: false,
            max_depth: None,
            texture_extensions: TEXTURE_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect(),
        }
    }
}

impl WalkOptions {
    #[must_use]
    pub const fn with_attributes(mut self, walk_attributes: bool) -> Self {
        self.walk_attributes = walk_attributes;
        self
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Whether `path` has a texture extension (case-insensitive).
    #[must_use]
    pub fn is_texture(&self, path: &str) -> bool {
        extension(path).is_some_and(|ext| {
            self.texture_extensions.iter().any(|known| known.eq_ignore_ascii_case(&ext))
        })
    }
}

/// Layer targets discovered in one layer, waiting to be walked.
#[derive(Debug, Default)]
struct Pending {
    sublayers: Vec<String>,
    references: Vec<String>,
    payloads: Vec<String>,
}

impl Pending {
    fn push(list: &mut Vec<String>, key: String) {
        if !list.contains(&key) {
            list.push(key);
        }
    }

    fn len(&self) -> usize {
        self.sublayers.len() + self.references.len() + self.payloads.len()
    }

    fn into_walk_order(self) -> impl Iterator<Item = String> {
        self.sublayers.into_iter().chain(self.references).chain(self.payloads)
    }
}

/// Builds a [`CompositionGraph`] by walking layers through a [`CompositionService`].
#[derive(Debug, Clone)]
pub struct DependencyWalker<S> {
    service: S,
    options: WalkOptions,
}

impl<S: CompositionService> DependencyWalker<S> {
    /// Walker with default options.
    pub fn new(service: S) -> Self {
        Self {
            service,
            options: WalkOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    pub const fn options(&self) -> &WalkOptions {
        &self.options
    }

    pub const fn service(&self) -> &S {
        &self.service
    }

    /// Walk everything reachable from `root`.
    ///
    /// Relative roots are anchored at the current working directory. If the
    /// root layer cannot be opened, the result holds only the root node and
    /// [`CompositionGraph::root_resolved`] is false.
    ///
    /// # Errors
    ///
    /// Returns [`NoodleError::InvalidRootPath`] if `root` is empty or whitespace.
    pub fn build(&self, root: &str) -> Result<CompositionGraph, NoodleError> {
        let root = root.trim();
        if root.is_empty() {
            return Err(NoodleError::InvalidRootPath);
        }

        let key = root_key(root);
        info!("Building composition graph for {key}");

        let layer = self.service.open_layer(&key);
        let online = layer.is_some() || self.service.file_exists(&key);
        let mut graph = CompositionGraph::new(Node::new(
            &key,
            NodeKind::Root {
                layer: None,
            },
            online,
            &key,
        ));

        let Some(layer) = layer else {
            warn!("Cannot open root layer {key}");
            return Ok(graph);
        };
        graph.mark_root_resolved();

        let mut visited = HashSet::from([key.clone()]);
        self.visit(&key, &layer, 0, &mut graph, &mut visited);

        info!(
            "Composition graph for {key}: {} nodes, {} edges, {} offline",
            graph.node_count(),
            graph.edge_count(),
            graph.offline_nodes().len()
        );
        Ok(graph)
    }

    /// Open and visit the layer at `key` unless it has been visited already.
    fn walk_layer(
        &self,
        key: &str,
        level: usize,
        graph: &mut CompositionGraph,
        visited: &mut HashSet<String>,
    ) {
        if !visited.insert(key.to_string()) {
            trace!("Already walked {key}");
            return;
        }

        match self.service.open_layer(key) {
            Some(layer) => self.visit(key, &layer, level, graph, visited),
            None => debug!("Cannot open {key}, keeping it as a leaf"),
        }
    }

    fn visit(
        &self,
        key: &str,
        layer: &LayerSpec,
        level: usize,
        graph: &mut CompositionGraph,
        visited: &mut HashSet<String>,
    ) {
        debug!("Walking {key} at level {level}");
        if let Some(node) = graph.node_mut(key) {
            node.set_layer_info(layer.info.clone());
        }

        let mut pending = Pending::default();

        for path in self.service.list_sublayers(layer) {
            let kind = NodeKind::Sublayer {
                layer: None,
            };
            if let Some(target) = self.link(layer, key, &path, kind, EdgeKind::Sublayer, graph) {
                Pending::push(&mut pending.sublayers, target);
            }
        }

        for entity in self.service.list_child_entities(layer) {
            for path in self.service.list_references(entity) {
                let kind = NodeKind::Reference {
                    layer: None,
                };
                if let Some(target) = self.link(layer, key, &path, kind, EdgeKind::Reference, graph)
                {
                    Pending::push(&mut pending.references, target);
                }
            }

            for path in self.service.list_payloads(entity) {
                let kind = NodeKind::Payload {
                    layer: None,
                };
                if let Some(target) = self.link(layer, key, &path, kind, EdgeKind::Payload, graph) {
                    Pending::push(&mut pending.payloads, target);
                }
            }

            for clip in self.service.list_clip_declarations(entity) {
                self.add_clip(layer, key, clip, graph);
            }

            for set in self.service.list_variant_sets(entity) {
                self.add_variant_set(layer, key, &set, graph, &mut pending);
            }

            if self.options.walk_attributes {
                for attribute in self.service.list_asset_attributes(entity) {
                    self.add_attribute(layer, key, attribute, graph);
                }
            }
        }

        if let Some(max_depth) = self.options.max_depth
            && level >= max_depth
        {
            let skipped = pending.len();
            if skipped != 0 {
                warn!(
                    "Maximum depth {max_depth} reached at {key}; not descending into {skipped} layer(s)"
                );
            }
            return;
        }

        for target in pending.into_walk_order() {
            self.walk_layer(&target, level + 1, graph, visited);
        }
    }

    /// Resolve `path` against `layer`, add the target node if new and an edge
    /// from `from`. Returns the target key.
    fn link(
        &self,
        layer: &LayerSpec,
        from: &str,
        path: &str,
        kind: NodeKind,
        edge: EdgeKind,
        graph: &mut CompositionGraph,
    ) -> Option<String> {
        if path.trim().is_empty() {
            trace!("Skipping empty {} path in {from}", edge.name());
            return None;
        }

        let Some(target) = self.service.resolve_relative(layer, path) else {
            debug!("Cannot resolve {path} from {from}");
            return None;
        };

        if !graph.contains(&target) {
            let online = self.service.file_exists(&target);
            debug!("Found {} {target} (online: {online})", kind.name());
            graph.insert_node(Node::new(&target, kind, online, &target));
        }
        graph.add_edge(from, &target, edge);
        Some(target)
    }

    fn add_clip(
        &self,
        layer: &LayerSpec,
        from: &str,
        clip: &ClipDeclaration,
        graph: &mut CompositionGraph,
    ) {
        let paths: Vec<String> =
            clip.asset_paths.iter().filter(|p| !p.trim().is_empty()).cloned().collect();
        let Some(sequence) = collapse_sequence(&paths) else {
            trace!("Clip set '{}' in {from} declares no assets", clip.set_name);
            return;
        };

        let resolved: Vec<Option<String>> =
            paths.iter().map(|p| self.service.resolve_relative(layer, p)).collect();
        let online = resolved
            .iter()
            .all(|r| r.as_deref().is_some_and(|path| self.service.file_exists(path)));
        let resolved_path =
            resolved.into_iter().next().flatten().unwrap_or_else(|| sequence.key.clone());

        let manifest = clip
            .manifest_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .and_then(|p| self.service.resolve_relative(layer, p));

        // The same declared template authored in another directory names other files
        let key = match graph.node(&sequence.key) {
            Some(existing) if existing.resolved_path != resolved_path => {
                let anchored = anchor_relative(&layer.identifier, &sequence.key);
                debug!("Clip {} resolves elsewhere from {from}, keyed as {anchored}", sequence.key);
                anchored
            }
            _ => sequence.key.clone(),
        };

        match graph.node_mut(&key) {
            Some(existing) => existing.online &= online,
            None => {
                debug!("Found clip {key} ({} frames, online: {online})", sequence.frame_count);
                let info = ClipInfo {
                    clip_set: clip.set_name.clone(),
                    first_frame: sequence.first_frame.clone(),
                    last_frame: sequence.last_frame.clone(),
                    frame_count: sequence.frame_count,
                    manifest: manifest.clone(),
                };
                graph.insert_node(Node::new(&key, NodeKind::Clip(info), online, resolved_path));
            }
        }
        graph.add_edge(from, &key, EdgeKind::Clip);

        if let Some(manifest) = manifest {
            if !graph.contains(&manifest) {
                let online = self.service.file_exists(&manifest);
                graph.insert_node(Node::new(&manifest, NodeKind::Manifest, online, &manifest));
            }
            graph.add_edge(&key, &manifest, EdgeKind::Manifest);
        }
    }

    fn add_variant_set(
        &self,
        layer: &LayerSpec,
        from: &str,
        set: &VariantSet<'_>,
        graph: &mut CompositionGraph,
        pending: &mut Pending,
    ) {
        let set_key = format!("{from}:{}", set.name);
        if !graph.contains(&set_key) {
            debug!("Found variant set {} with {} variant(s)", set.name, set.variant_names.len());
            let info = VariantInfo {
                variant_set: set.name.clone(),
                variants: set.variant_names.clone(),
                selected: set.selected.clone(),
            };
            graph.insert_node(Node::new(&set_key, NodeKind::Variant(info), true, from));
        }
        graph.add_edge(from, &set_key, EdgeKind::Variant);

        for subtree in &set.subtrees {
            for entity in &subtree.entities {
                for path in self.service.list_references(entity) {
                    let kind = NodeKind::Reference {
                        layer: None,
                    };
                    let edge = EdgeKind::VariantMember(subtree.variant.clone());
                    if let Some(target) = self.link(layer, &set_key, &path, kind, edge, graph) {
                        Pending::push(&mut pending.references, target);
                    }
                }

                for path in self.service.list_payloads(entity) {
                    let kind = NodeKind::Payload {
                        layer: None,
                    };
                    let edge = EdgeKind::VariantMember(subtree.variant.clone());
                    if let Some(target) = self.link(layer, &set_key, &path, kind, edge, graph) {
                        Pending::push(&mut pending.payloads, target);
                    }
                }
            }
        }
    }

    fn add_attribute(
        &self,
        layer: &LayerSpec,
        from: &str,
        attribute: &AttributeSpec,
        graph: &mut CompositionGraph,
    ) {
        let Some(path) = attribute.asset_path.as_deref() else {
            return;
        };

        if self.options.is_texture(path) {
            let kind = NodeKind::Texture {
                color_space: attribute.color_space.clone(),
            };
            self.link(layer, from, path, kind, EdgeKind::Texture, graph);
        } else {
            self.link(layer, from, path, NodeKind::Asset, EdgeKind::Asset, graph);
        }
    }
}

/// Canonical key of the root argument; relative roots are anchored at the
/// working directory.
fn root_key(root: &str) -> String {
    if is_absolute_key(root) {
        return canonical_key(root);
    }

    match std::env::current_dir() {
        Ok(cwd) => canonical_key(&cwd.join(root).to_string_lossy()),
        Err(e) => {
            warn!("Cannot read working directory ({e}); using {root} as given");
            canonical_key(root)
        }
    }
}
