//! Composition service backed by text layers on disk.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{CompositionService, LayerSpec};
use crate::config::GlobalConfig;
use crate::constants::{BINARY_LAYER_MAGIC, TEXT_LAYER_HEADER};
use crate::core::NoodleError;
use crate::usda::parse_layer;
use crate::utils::paths::{anchor_relative, canonical_key, is_absolute_key, is_anchored_relative};

/// Reads `.usda` text layers (and text-encoded `.usd` files) from the filesystem.
///
/// Path resolution:
///
/// - Absolute paths are canonicalized as-is
/// - `./x` and `../x` are anchored at the directory of the authoring layer
/// - Bare relative paths (`props/tree.usda`) are anchored first; if nothing
///   exists there, each search directory is tried in order. When no candidate
///   exists the anchored path is returned so the node shows up offline.
///
/// # Examples
///
/// ```rust,no_run
/// use noodle::service::FsCompositionService;
/// use std::path::PathBuf;
///
/// let service = FsCompositionService::new()
///     .with_search_paths(vec![PathBuf::from("/show/assets")]);
/// assert_eq!(service.search_paths().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FsCompositionService {
    search_paths: Vec<PathBuf>,
}

impl FsCompositionService {
    /// Service without search directories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Service using the search directories from `config` and the environment.
    #[must_use]
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self::new().with_search_paths(config.search_dirs())
    }

    /// Append search directories, keeping the existing ones first.
    #[must_use]
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths.extend(paths);
        self
    }

    /// Configured search directories.
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Read and parse a layer.
    ///
    /// # Errors
    ///
    /// - [`NoodleError::IoError`] if the file cannot be read
    /// - [`NoodleError::UnsupportedLayerFormat`] for binary crate files and non-UTF-8 text
    /// - [`NoodleError::LayerParseError`] for malformed text
    pub fn read_layer(&self, identifier: &str) -> Result<LayerSpec, NoodleError> {
        let bytes = std::fs::read(identifier)?;

        if bytes.starts_with(BINARY_LAYER_MAGIC) {
            return Err(NoodleError::UnsupportedLayerFormat {
                path: identifier.to_string(),
                reason: "binary crate layers cannot be read; convert with usdcat".to_string(),
            });
        }

        let text = String::from_utf8(bytes).map_err(|_| NoodleError::UnsupportedLayerFormat {
            path: identifier.to_string(),
            reason: "file is not UTF-8 text".to_string(),
        })?;

        if !text.trim_start().starts_with(TEXT_LAYER_HEADER) {
            debug!("{identifier} has no {TEXT_LAYER_HEADER} header, parsing anyway");
        }

        parse_layer(identifier, &text)
    }

    fn search(&self, path: &str) -> Option<String> {
        self.search_paths.iter().find_map(|dir| {
            let candidate = canonical_key(&dir.join(path).to_string_lossy());
            Path::new(&candidate).is_file().then(|| {
                debug!("Found {path} in search path {}", dir.display());
                candidate
            })
        })
    }
}

impl CompositionService for FsCompositionService {
    fn open_layer(&self, identifier: &str) -> Option<LayerSpec> {
        match self.read_layer(identifier) {
            Ok(mut layer) => {
                layer.identifier = canonical_key(identifier);
                Some(layer)
            }
            Err(NoodleError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Layer not found: {identifier}");
                None
            }
            Err(e) => {
                warn!("Cannot open layer {identifier}: {e}");
                None
            }
        }
    }

    fn resolve_relative(&self, anchor: &LayerSpec, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        if is_absolute_key(path) {
            return Some(canonical_key(path));
        }

        let anchored = anchor_relative(&anchor.identifier, path);
        if is_anchored_relative(path) || Path::new(&anchored).exists() {
            return Some(anchored);
        }

        self.search(path).or(Some(anchored))
    }

    fn file_exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }
}
