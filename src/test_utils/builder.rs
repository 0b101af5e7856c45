//! Fluent builders for in-memory layers
//!
//! These keep walker tests readable: a layer with a sublayer and a referencing
//! prim is a few chained calls instead of a nest of struct literals.

use crate::service::{
    AttributeSpec, ClipDeclaration, EntitySpec, LayerSpec, VariantSetSpec, VariantSpec,
};

/// Builder for a [`LayerSpec`]
#[derive(Clone, Debug)]
pub struct LayerBuilder {
    layer: LayerSpec,
}

impl LayerBuilder {
    /// Start a layer with the given identifier (its canonical key)
    pub fn new(identifier: &str) -> Self {
        Self {
            layer: LayerSpec::new(identifier),
        }
    }

    /// Add a sublayer path as authored
    pub fn sublayer(mut self, path: &str) -> Self {
        self.layer.sublayers.push(path.to_string());
        self
    }

    pub fn default_prim(mut self, name: &str) -> Self {
        self.layer.info.default_prim = Some(name.to_string());
        self
    }

    pub fn documentation(mut self, doc: &str) -> Self {
        self.layer.info.documentation = Some(doc.to_string());
        self
    }

    /// Add a root entity
    pub fn entity(mut self, entity: EntitySpec) -> Self {
        self.layer.entities.push(entity);
        self
    }

    pub fn build(self) -> LayerSpec {
        self.layer
    }
}

/// Builder for an [`EntitySpec`]
#[derive(Clone, Debug)]
pub struct EntityBuilder {
    entity: EntitySpec,
}

impl EntityBuilder {
    pub fn new(path: &str) -> Self {
        Self {
            entity: EntitySpec::new(path),
        }
    }

    /// Add a prepended reference
    pub fn reference(mut self, path: &str) -> Self {
        self.entity.references.prepended_items.push(path.to_string());
        self
    }

    /// Add a prepended payload
    pub fn payload(mut self, path: &str) -> Self {
        self.entity.payloads.prepended_items.push(path.to_string());
        self
    }

    /// Add a variant set with its variants, each given as the variant's root entity
    pub fn variant_set(
        mut self,
        name: &str,
        selected: Option<&str>,
        variants: Vec<(&str, EntitySpec)>,
    ) -> Self {
        self.entity.variant_set_names.push(name.to_string());
        if let Some(selected) = selected {
            self.entity.variant_selections.insert(name.to_string(), selected.to_string());
        }
        self.entity.variant_sets.push(VariantSetSpec {
            name: name.to_string(),
            variants: variants
                .into_iter()
                .map(|(variant, root)| VariantSpec {
                    name: variant.to_string(),
                    root,
                })
                .collect(),
        });
        self
    }

    /// Add a clip set
    pub fn clip(mut self, set_name: &str, asset_paths: &[&str], manifest: Option<&str>) -> Self {
        self.entity.clips.push(ClipDeclaration {
            set_name: set_name.to_string(),
            asset_paths: asset_paths.iter().map(|p| (*p).to_string()).collect(),
            manifest_path: manifest.map(String::from),
            prim_path: None,
        });
        self
    }

    /// Add an `asset`-typed attribute with a default value
    pub fn asset_attribute(mut self, name: &str, path: &str, color_space: Option<&str>) -> Self {
        self.entity.attributes.push(AttributeSpec {
            name: name.to_string(),
            type_name: "asset".to_string(),
            asset_path: Some(path.to_string()),
            color_space: color_space.map(String::from),
        });
        self
    }

    pub fn child(mut self, child: EntitySpec) -> Self {
        self.entity.children.push(child);
        self
    }

    pub fn build(self) -> EntitySpec {
        self.entity
    }
}
