//! Composition service abstraction.
//!
//! The walker never reads files itself. Everything it learns about a layer goes
//! through a [`CompositionService`]: opening a layer, resolving a path authored
//! in it, checking whether a file exists, and listing the composition arcs the
//! layer declares.
//!
//! Implementors supply the three primitives ([`open_layer`], [`resolve_relative`],
//! [`file_exists`]). The listing operations have default implementations over
//! the plain data types in this module ([`LayerSpec`], [`EntitySpec`], ...), so
//! any backend that can produce a [`LayerSpec`] gets them for free.
//!
//! Two implementations ship with the crate:
//!
//! - [`FsCompositionService`](filesystem::FsCompositionService) reads text layers from disk
//! - `MemoryCompositionService` in `test_utils` serves layers built in code
//!
//! [`open_layer`]: CompositionService::open_layer
//! [`resolve_relative`]: CompositionService::resolve_relative
//! [`file_exists`]: CompositionService::file_exists

pub mod filesystem;

pub use filesystem::FsCompositionService;

use std::collections::BTreeMap;

use crate::graph::LayerInfo;

/// A list-edited field (references, payloads).
///
/// Each bucket holds the items authored with the matching list-op prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOp {
    /// Items authored without a prefix
    pub explicit_items: Vec<String>,
    /// `add` items
    pub added_items: Vec<String>,
    /// `prepend` items
    pub prepended_items: Vec<String>,
    /// `append` items
    pub appended_items: Vec<String>,
    /// `delete` items
    pub deleted_items: Vec<String>,
    /// `reorder` items
    pub ordered_items: Vec<String>,
}

impl ListOp {
    /// Union of every non-delete bucket, duplicates removed, first occurrence kept.
    ///
    /// Deleted items are not subtracted: a deletion in this layer may target an
    /// opinion in a weaker layer that still contributes a dependency.
    #[must_use]
    pub fn items(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for item in self
            .explicit_items
            .iter()
            .chain(&self.prepended_items)
            .chain(&self.added_items)
            .chain(&self.appended_items)
            .chain(&self.ordered_items)
        {
            if !out.contains(item) {
                out.push(item.clone());
            }
        }
        out
    }

    /// True when no bucket holds anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.explicit_items.is_empty()
            && self.added_items.is_empty()
            && self.prepended_items.is_empty()
            && self.appended_items.is_empty()
            && self.deleted_items.is_empty()
            && self.ordered_items.is_empty()
    }
}

/// One clip set declared on an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipDeclaration {
    /// Clip set name (`default` for the legacy single-set metadata)
    pub set_name: String,
    /// Per-frame asset paths, in declared order
    pub asset_paths: Vec<String>,
    /// Optional manifest layer
    pub manifest_path: Option<String>,
    /// Prim path inside the clip layers
    pub prim_path: Option<String>,
}

/// A property with a value, as far as dependency discovery cares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSpec {
    /// Property name, e.g. `inputs:file`
    pub name: String,
    /// Value type name, e.g. `asset` or `float3[]`
    pub type_name: String,
    /// Default value when it is an asset path
    pub asset_path: Option<String>,
    /// Authored `colorSpace` metadata
    pub color_space: Option<String>,
}

impl AttributeSpec {
    /// Whether the attribute holds a single asset path.
    #[must_use]
    pub fn is_asset(&self) -> bool {
        self.type_name == "asset"
    }
}

/// One variant of a variant set.
///
/// `root` holds the opinions the variant adds to the owning entity: its own
/// metadata (references, payloads, ...) and the child entities it defines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSpec {
    pub name: String,
    pub root: EntitySpec,
}

/// A variant set authored on an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSetSpec {
    pub name: String,
    pub variants: Vec<VariantSpec>,
}

/// Entity (prim) opinions in a layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySpec {
    /// Absolute entity path, e.g. `/World/Tree`
    pub path: String,
    /// Schema type name, if authored
    pub type_name: Option<String>,
    pub references: ListOp,
    pub payloads: ListOp,
    /// `variants` metadata: set name → selected variant
    pub variant_selections: BTreeMap<String, String>,
    /// Names listed in `variantSets` metadata
    pub variant_set_names: Vec<String>,
    /// Variant set bodies
    pub variant_sets: Vec<VariantSetSpec>,
    pub clips: Vec<ClipDeclaration>,
    pub attributes: Vec<AttributeSpec>,
    pub children: Vec<EntitySpec>,
}

impl EntitySpec {
    /// Create an empty entity at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// This entity followed by all descendants, depth first.
    #[must_use]
    pub fn flatten(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(entity) = stack.pop() {
            out.push(entity);
            stack.extend(entity.children.iter().rev());
        }
        out
    }

    /// Look up a variant set body by name.
    #[must_use]
    pub fn variant_set(&self, name: &str) -> Option<&VariantSetSpec> {
        self.variant_sets.iter().find(|set| set.name == name)
    }
}

/// A parsed layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSpec {
    /// Canonical identifier the layer was opened with
    pub identifier: String,
    /// Layer-level metadata
    pub info: LayerInfo,
    /// Sublayer paths as authored
    pub sublayers: Vec<String>,
    /// Root entities
    pub entities: Vec<EntitySpec>,
}

impl LayerSpec {
    /// Create an empty layer.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    /// Every entity in the layer, depth first.
    #[must_use]
    pub fn all_entities(&self) -> Vec<&EntitySpec> {
        self.entities.iter().flat_map(EntitySpec::flatten).collect()
    }
}

/// The entities one variant contributes.
#[derive(Debug, Clone)]
pub struct VariantSubtree<'a> {
    /// Variant name
    pub variant: String,
    /// The variant's opinions on the owning entity and its descendants
    pub entities: Vec<&'a EntitySpec>,
}

/// A variant set as seen from its owning entity.
#[derive(Debug, Clone)]
pub struct VariantSet<'a> {
    pub name: String,
    /// Variant names in authored order
    pub variant_names: Vec<String>,
    /// Selection authored on the owning entity
    pub selected: Option<String>,
    pub subtrees: Vec<VariantSubtree<'a>>,
}

/// Access to layers and the composition arcs they author.
///
/// # Examples
///
/// ```rust,no_run
/// use noodle::service::{CompositionService, FsCompositionService};
///
/// let service = FsCompositionService::new();
/// if let Some(layer) = service.open_layer("/show/shot.usda") {
///     for sublayer in service.list_sublayers(&layer) {
///         let resolved = service.resolve_relative(&layer, &sublayer);
///         println!("{sublayer} -> {resolved:?}");
///     }
/// }
/// ```
pub trait CompositionService {
    /// Open a layer by canonical identifier. `None` when it cannot be opened.
    fn open_layer(&self, identifier: &str) -> Option<LayerSpec>;

    /// Resolve a path authored in `anchor` to an absolute canonical key.
    ///
    /// `None` when the path cannot be resolved at all; a resolvable path to a
    /// missing file still yields `Some`.
    fn resolve_relative(&self, anchor: &LayerSpec, path: &str) -> Option<String>;

    /// Whether a file exists at the given resolved path.
    fn file_exists(&self, path: &str) -> bool;

    /// Sublayer paths as authored.
    fn list_sublayers(&self, layer: &LayerSpec) -> Vec<String> {
        layer.sublayers.clone()
    }

    /// Every entity in the layer, depth first.
    fn list_child_entities<'a>(&self, layer: &'a LayerSpec) -> Vec<&'a EntitySpec> {
        layer.all_entities()
    }

    /// Reference asset paths authored on the entity.
    fn list_references(&self, entity: &EntitySpec) -> Vec<String> {
        entity.references.items()
    }

    /// Payload asset paths authored on the entity.
    fn list_payloads(&self, entity: &EntitySpec) -> Vec<String> {
        entity.payloads.items()
    }

    /// Variant sets named in metadata or authored as bodies, in that order.
    fn list_variant_sets<'a>(&self, entity: &'a EntitySpec) -> Vec<VariantSet<'a>> {
        let mut names: Vec<&str> = entity.variant_set_names.iter().map(String::as_str).collect();
        for set in &entity.variant_sets {
            if !names.contains(&set.name.as_str()) {
                names.push(&set.name);
            }
        }

        names
            .into_iter()
            .map(|name| {
                let body = entity.variant_set(name);
                let variants = body.map(|set| set.variants.as_slice()).unwrap_or_default();
                VariantSet {
                    name: name.to_string(),
                    variant_names: variants.iter().map(|v| v.name.clone()).collect(),
                    selected: entity.variant_selections.get(name).cloned(),
                    subtrees: variants
                        .iter()
                        .map(|v| VariantSubtree {
                            variant: v.name.clone(),
                            entities: v.root.flatten(),
                        })
                        .collect(),
                }
            })
            .collect()
    }

    /// Clip sets declared on the entity.
    fn list_clip_declarations<'a>(&self, entity: &'a EntitySpec) -> Vec<&'a ClipDeclaration> {
        entity.clips.iter().collect()
    }

    /// Attributes whose default value is a single asset path.
    fn list_asset_attributes<'a>(&self, entity: &'a EntitySpec) -> Vec<&'a AttributeSpec> {
        entity
            .attributes
            .iter()
            .filter(|attr| attr.is_asset() && attr.asset_path.is_some())
            .collect()
    }
}
