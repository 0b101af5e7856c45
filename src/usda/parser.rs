//! Pair walker over the `usda.pest` grammar.
//!
//! Only the parts of a layer that carry composition arcs are interpreted.
//! Metadata and attribute values are read into a generic [`Value`] first, so
//! unfamiliar schemas and metadata keys never fail a parse.

use std::collections::BTreeMap;
use std::fmt;

use pest::Parser;
use pest::error::{InputLocation, LineColLocation};
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::constants::LEGACY_CLIP_SET;
use crate::service::{
    AttributeSpec, ClipDeclaration, EntitySpec, LayerSpec, ListOp, VariantSetSpec, VariantSpec,
};

#[derive(Parser)]
#[grammar = "usda/usda.pest"]
struct UsdaParser;

/// Syntax error with the one-based line it was detected on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub reason: String,
}

/// Generic metadata or attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Str(String),
    Asset(String),
    Path(String),
    Number(String),
    Ident(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Dict(Vec<(String, Value)>),
}

impl Value {
    fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::Ident(s) => Some(s),
            _ => None,
        }
    }

    fn as_asset(&self) -> Option<&str> {
        match self {
            Self::Asset(s) => Some(s),
            _ => None,
        }
    }

    /// Asset paths in a single value or a list. `None` and internal paths yield nothing.
    fn assets(&self) -> Vec<String> {
        match self {
            Self::Asset(s) => vec![s.clone()],
            Self::List(items) => items.iter().flat_map(Self::assets).collect(),
            _ => Vec::new(),
        }
    }

    fn strings(&self) -> Vec<String> {
        match self {
            Self::Str(s) => vec![s.clone()],
            Self::List(items) => items.iter().filter_map(|v| v.as_str().map(String::from)).collect(),
            _ => Vec::new(),
        }
    }

    fn entries(&self) -> &[(String, Self)] {
        match self {
            Self::Dict(entries) => entries,
            _ => &[],
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            Self::Str(s) | Self::Number(s) | Self::Ident(s) => f.write_str(s),
            Self::Asset(s) => write!(f, "@{s}@"),
            Self::Path(s) => write!(f, "<{s}>"),
            Self::List(items) => {
                f.write_str("[")?;
                join(f, items)?;
                f.write_str("]")
            }
            Self::Tuple(items) => {
                f.write_str("(")?;
                join(f, items)?;
                f.write_str(")")
            }
            Self::Dict(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListOpKind {
    Explicit,
    Add,
    Prepend,
    Append,
    Delete,
    Reorder,
}

impl ListOpKind {
    fn from_keyword(word: &str) -> Self {
        match word {
            "add" => Self::Add,
            "prepend" => Self::Prepend,
            "append" => Self::Append,
            "delete" => Self::Delete,
            "reorder" => Self::Reorder,
            _ => Self::Explicit,
        }
    }

    fn bucket(self, op: &mut ListOp) -> &mut Vec<String> {
        match self {
            Self::Explicit => &mut op.explicit_items,
            Self::Add => &mut op.added_items,
            Self::Prepend => &mut op.prepended_items,
            Self::Append => &mut op.appended_items,
            Self::Delete => &mut op.deleted_items,
            Self::Reorder => &mut op.ordered_items,
        }
    }
}

#[derive(Debug)]
struct MetadataEntry {
    op: ListOpKind,
    key: String,
    value: Value,
}

/// Parse layer text into a [`LayerSpec`] named `identifier`.
pub fn parse(identifier: &str, text: &str) -> Result<LayerSpec, SyntaxError> {
    let pairs = UsdaParser::parse(Rule::layer, text).map_err(|e| syntax_error(text, e))?;
    let mut layer = LayerSpec::new(identifier);

    for pair in pairs.flat_map(Pair::into_inner) {
        match pair.as_rule() {
            Rule::metadata => {
                for entry in metadata_entries(pair) {
                    apply_layer_metadata(&mut layer, entry);
                }
            }
            Rule::prim => layer.entities.push(prim(pair, "")),
            // reorder statements and EOI
            _ => {}
        }
    }

    Ok(layer)
}

fn syntax_error(text: &str, error: pest::error::Error<Rule>) -> SyntaxError {
    let line = match error.line_col {
        LineColLocation::Pos((line, _)) | LineColLocation::Span((line, _), _) => line,
    };
    let offset = match error.location {
        InputLocation::Pos(pos) | InputLocation::Span((pos, _)) => pos,
    };

    let reason = if offset >= text.trim_end().len() {
        "unexpected end of file (unclosed block)".to_string()
    } else {
        error.renamed_rules(rule_name).variant.message().into_owned()
    };

    SyntaxError {
        line,
        reason,
    }
}

fn rule_name(rule: &Rule) -> String {
    let name = match rule {
        Rule::prim => "prim",
        Rule::property => "property",
        Rule::variant_set => "variant set",
        Rule::variant => "variant",
        Rule::reorder_stmt => "reorder statement",
        Rule::metadata => "metadata block",
        Rule::metadata_entry => "metadata entry",
        Rule::doc_string | Rule::string => "string",
        Rule::value => "value",
        Rule::identifier | Rule::type_name | Rule::prim_type => "identifier",
        Rule::asset | Rule::asset_ref => "asset path",
        Rule::path_ref => "prim path",
        Rule::dict_entry | Rule::dict_key => "dictionary entry",
        Rule::EOI => "end of file",
        other => return format!("{other:?}"),
    };
    name.to_string()
}

fn metadata_entries(pair: Pair<'_, Rule>) -> Vec<MetadataEntry> {
    pair.into_inner()
        .filter_map(|item| match item.as_rule() {
            Rule::doc_string => Some(MetadataEntry {
                op: ListOpKind::Explicit,
                key: "doc".to_string(),
                value: Value::Str(item.into_inner().next().map(string_value).unwrap_or_default()),
            }),
            Rule::metadata_entry => Some(metadata_entry(item)),
            _ => None,
        })
        .collect()
}

fn metadata_entry(pair: Pair<'_, Rule>) -> MetadataEntry {
    let mut op = ListOpKind::Explicit;
    let mut key = String::new();
    let mut value = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::list_op => op = ListOpKind::from_keyword(inner.as_str()),
            Rule::identifier => key = inner.as_str().to_string(),
            Rule::value => value = Some(value_of(inner)),
            // layer offsets
            _ => {}
        }
    }

    MetadataEntry {
        op,
        key,
        value: value.unwrap_or(Value::List(Vec::new())),
    }
}

fn value_of(pair: Pair<'_, Rule>) -> Value {
    let Some(inner) = pair.into_inner().next() else {
        return Value::List(Vec::new());
    };

    match inner.as_rule() {
        Rule::asset_ref => Value::Asset(
            inner
                .into_inner()
                .find(|p| p.as_rule() == Rule::asset)
                .map(body_text)
                .unwrap_or_default(),
        ),
        Rule::string => Value::Str(string_value(inner)),
        Rule::path_ref => Value::Path(body_text(inner)),
        Rule::number => Value::Number(inner.as_str().to_string()),
        Rule::list => Value::List(values(inner)),
        Rule::tuple => Value::Tuple(values(inner)),
        Rule::dictionary => Value::Dict(
            inner
                .into_inner()
                .filter(|p| p.as_rule() == Rule::dict_entry)
                .map(dict_entry)
                .collect(),
        ),
        _ => Value::Ident(inner.as_str().to_string()),
    }
}

/// Values of a list or tuple; layer offsets are dropped.
fn values(pair: Pair<'_, Rule>) -> Vec<Value> {
    pair.into_inner().filter(|p| p.as_rule() == Rule::value).map(value_of).collect()
}

fn dict_entry(pair: Pair<'_, Rule>) -> (String, Value) {
    let mut key = String::new();
    let mut value = Value::List(Vec::new());

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::dict_key => {
                key = match inner.into_inner().next() {
                    Some(k) if k.as_rule() == Rule::string => string_value(k),
                    Some(k) => k.as_str().to_string(),
                    None => String::new(),
                };
            }
            Rule::value => value = value_of(inner),
            _ => {}
        }
    }

    (key, value)
}

/// Text between the delimiters of an asset path or prim path.
fn body_text(pair: Pair<'_, Rule>) -> String {
    pair.into_inner().next().map(|body| body.as_str().to_string()).unwrap_or_default()
}

/// Decoded contents of a quoted string.
fn string_value(pair: Pair<'_, Rule>) -> String {
    let Some(body) = pair.into_inner().next() else {
        return String::new();
    };

    let mut out = String::with_capacity(body.as_str().len());
    let mut chars = body.as_str().chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn prim(pair: Pair<'_, Rule>, parent: &str) -> EntitySpec {
    let mut entity = EntitySpec::default();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::prim_type => entity.type_name = Some(inner.as_str().to_string()),
            Rule::string => entity.path = format!("{parent}/{}", string_value(inner)),
            Rule::metadata => apply_entity_metadata(&mut entity, metadata_entries(inner)),
            _ => body_item(&mut entity, inner),
        }
    }

    entity
}

/// One item of a prim or variant body.
fn body_item(entity: &mut EntitySpec, pair: Pair<'_, Rule>) {
    match pair.as_rule() {
        Rule::prim => {
            let child = prim(pair, &entity.path);
            entity.children.push(child);
        }
        Rule::variant_set => variant_set(entity, pair),
        Rule::property => property(entity, pair),
        _ => {}
    }
}

fn variant_set(entity: &mut EntitySpec, pair: Pair<'_, Rule>) {
    let mut set_name = String::new();
    let mut variants = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::string => set_name = string_value(inner),
            Rule::variant => variants.push(variant(&entity.path, &set_name, inner)),
            _ => {}
        }
    }

    match entity.variant_sets.iter_mut().find(|s| s.name == set_name) {
        Some(existing) => existing.variants.extend(variants),
        None => entity.variant_sets.push(VariantSetSpec {
            name: set_name,
            variants,
        }),
    }
}

fn variant(owner: &str, set_name: &str, pair: Pair<'_, Rule>) -> VariantSpec {
    let mut name = String::new();
    let mut root = EntitySpec::default();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::string => {
                name = string_value(inner);
                root.path = format!("{owner}{{{set_name}={name}}}");
            }
            Rule::metadata => apply_entity_metadata(&mut root, metadata_entries(inner)),
            _ => body_item(&mut root, inner),
        }
    }

    VariantSpec {
        name,
        root,
    }
}

fn property(entity: &mut EntitySpec, pair: Pair<'_, Rule>) {
    let mut type_name = String::new();
    let mut name = String::new();
    let mut value = None;
    let mut metadata = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::type_name => type_name = inner.as_str().split_whitespace().collect(),
            Rule::identifier => name = inner.as_str().to_string(),
            Rule::value => value = Some(value_of(inner)),
            Rule::metadata => metadata = metadata_entries(inner),
            _ => {}
        }
    }

    // Only default values matter; `.connect` and `.timeSamples` are skipped
    if type_name == "rel" || name.contains('.') {
        return;
    }

    let color_space = metadata
        .iter()
        .find(|entry| entry.key == "colorSpace")
        .and_then(|entry| entry.value.as_str())
        .map(String::from);

    entity.attributes.push(AttributeSpec {
        name,
        type_name,
        asset_path: value.as_ref().and_then(Value::as_asset).map(String::from),
        color_space,
    });
}

fn apply_layer_metadata(layer: &mut LayerSpec, entry: MetadataEntry) {
    match entry.key.as_str() {
        "subLayers" => layer.sublayers.extend(entry.value.assets()),
        "subLayerOffsets" => {}
        "defaultPrim" => layer.info.default_prim = entry.value.as_str().map(String::from),
        "doc" | "documentation" => layer.info.documentation = entry.value.as_str().map(String::from),
        _ => {
            layer.info.metadata.insert(entry.key, entry.value.to_string());
        }
    }
}

fn apply_entity_metadata(entity: &mut EntitySpec, entries: Vec<MetadataEntry>) {
    let mut legacy = ClipDeclaration {
        set_name: LEGACY_CLIP_SET.to_string(),
        ..ClipDeclaration::default()
    };

    for entry in entries {
        match entry.key.as_str() {
            "references" => entry.op.bucket(&mut entity.references).extend(entry.value.assets()),
            "payload" | "payloads" => {
                entry.op.bucket(&mut entity.payloads).extend(entry.value.assets());
            }
            "variants" => {
                for (set, selection) in entry.value.entries() {
                    if let Some(selection) = selection.as_str() {
                        entity.variant_selections.insert(set.clone(), selection.to_string());
                    }
                }
            }
            "variantSets" if entry.op != ListOpKind::Delete => {
                for name in entry.value.strings() {
                    if !entity.variant_set_names.contains(&name) {
                        entity.variant_set_names.push(name);
                    }
                }
            }
            "clips" => {
                for (set_name, fields) in entry.value.entries() {
                    entity.clips.push(clip_declaration(set_name, fields.entries()));
                }
            }
            "clipAssetPaths" => legacy.asset_paths = entry.value.assets(),
            "clipManifestAssetPath" => {
                legacy.manifest_path = entry.value.as_asset().map(String::from);
            }
            "clipPrimPath" => legacy.prim_path = entry.value.as_str().map(String::from),
            _ => {}
        }
    }

    if !legacy.asset_paths.is_empty() {
        entity.clips.push(legacy);
    }
}

fn clip_declaration(set_name: &str, fields: &[(String, Value)]) -> ClipDeclaration {
    let fields: BTreeMap<&str, &Value> = fields.iter().map(|(k, v)| (k.as_str(), v)).collect();
    ClipDeclaration {
        set_name: set_name.to_string(),
        asset_paths: fields.get("assetPaths").map(|v| v.assets()).unwrap_or_default(),
        manifest_path: fields
            .get("manifestAssetPath")
            .and_then(|v| v.as_asset())
            .map(String::from),
        prim_path: fields.get("primPath").and_then(|v| v.as_str()).map(String::from),
    }
}
