//! In-memory composition service
//!
//! Serves layers built in code and answers `file_exists` from a fixed set of
//! paths, so walker behavior can be tested without touching the filesystem.

use std::collections::{HashMap, HashSet};

use crate::service::{CompositionService, LayerSpec};
use crate::utils::paths::{anchor_relative, canonical_key};

/// A [`CompositionService`] over layers held in memory.
///
/// Every registered layer also counts as an existing file. Plain files (clip
/// frames, textures, binary layers) are registered with [`with_file`].
///
/// [`with_file`]: MemoryCompositionService::with_file
#[derive(Clone, Debug, Default)]
pub struct MemoryCompositionService {
    layers: HashMap<String, LayerSpec>,
    files: HashSet<String>,
}

impl MemoryCompositionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layer under the canonical form of its identifier
    pub fn with_layer(mut self, layer: LayerSpec) -> Self {
        self.add_layer(layer);
        self
    }

    pub fn add_layer(&mut self, mut layer: LayerSpec) {
        let key = canonical_key(&layer.identifier);
        layer.identifier.clone_from(&key);
        self.layers.insert(key, layer);
    }

    /// Register an existing file that is not an openable layer
    pub fn with_file(mut self, path: &str) -> Self {
        self.files.insert(canonical_key(path));
        self
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

impl CompositionService for MemoryCompositionService {
    fn open_layer(&self, identifier: &str) -> Option<LayerSpec> {
        self.layers.get(identifier).cloned()
    }

    fn resolve_relative(&self, anchor: &LayerSpec, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        Some(anchor_relative(&anchor.identifier, path))
    }

    fn file_exists(&self, path: &str) -> bool {
        self.layers.contains_key(path) || self.files.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::LayerBuilder;

    #[test]
    fn test_layers_are_files() {
        let service = MemoryCompositionService::new()
            .with_layer(LayerBuilder::new("/a/./b.usda").build())
            .with_file("/a/tex.png");

        assert_eq!(service.layer_count(), 1);
        assert!(service.file_exists("/a/b.usda"));
        assert!(service.file_exists("/a/tex.png"));
        assert!(!service.file_exists("/a/c.usda"));

        let layer = service.open_layer("/a/b.usda").unwrap();
        assert_eq!(layer.identifier, "/a/b.usda");
        assert_eq!(service.resolve_relative(&layer, "../x.usda").as_deref(), Some("/x.usda"));
        assert!(service.open_layer("/a/tex.png").is_none());
    }
}
