//! Reader for text (`.usda`) layers.
//!
//! This is a dependency-oriented reader, not a full scene parser. The grammar in
//! `usda.pest` structures prims, properties, metadata and variant sets; the
//! walker keeps layer metadata, sublayers, and per-prim references, payloads,
//! variant sets, value clips and asset-valued attributes. Other values are
//! parsed generically and discarded.
//!
//! # Example
//!
//! ```rust
//! use noodle::usda::parse_layer;
//!
//! let text = r#"#usda 1.0
//! (
//!     defaultPrim = "World"
//!     subLayers = [@./anim.usda@, @./layout.usda@]
//! )
//!
//! def Xform "World" (
//!     prepend references = @./props/tree.usda@</Tree>
//! )
//! {
//! }
//! "#;
//!
//! let layer = parse_layer("/shots/s01.usda", text).unwrap();
//! assert_eq!(layer.sublayers, vec!["./anim.usda", "./layout.usda"]);
//! assert_eq!(layer.info.default_prim.as_deref(), Some("World"));
//! assert_eq!(layer.entities[0].references.items(), vec!["./props/tree.usda"]);
//! ```

mod parser;

use crate::core::NoodleError;
use crate::service::LayerSpec;

/// Parse layer text. `identifier` is recorded on the result and used in errors.
///
/// # Errors
///
/// Returns [`NoodleError::LayerParseError`] with the offending line when the
/// text is not a well-formed layer.
pub fn parse_layer(identifier: &str, text: &str) -> Result<LayerSpec, NoodleError> {
    parser::parse(identifier, text).map_err(|e| NoodleError::LayerParseError {
        file: identifier.to_string(),
        line: e.line,
        reason: e.reason,
    })
}
