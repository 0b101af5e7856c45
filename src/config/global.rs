//! Global configuration for Noodle.
//!
//! The user configuration file (`~/.noodle/config.toml`) holds walk defaults
//! that would otherwise have to be repeated on every invocation: where to look
//! for bare asset paths, whether to follow asset attributes, and how deep to
//! descend.
//!
//! # Configuration File Location
//!
//! - **Unix/macOS**: `~/.noodle/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\noodle\config.toml`
//!
//! The location can be overridden with the `NOODLE_CONFIG` environment
//! variable or the `--config` command line flag.
//!
//! # File Format
//!
//! ```toml
//! # Directories searched for bare relative asset paths, in order
//! search_paths = ["~/show/assets", "$SHOW_ROOT/lib"]
//!
//! # Follow asset-valued attributes (textures, volumes, ...)
//! walk_attributes = true
//!
//! # Stop descending past this nesting level
//! max_depth = 12
//!
//! # Replace the built-in texture extension list
//! texture_extensions = [".png", ".exr", ".tx"]
//! ```
//!
//! Every key is optional; a missing file is the same as an empty one.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_ENV_VAR, SEARCH_PATH_ENV_VAR, TEXTURE_EXTENSIONS};
use crate::core::NoodleError;
use crate::walker::WalkOptions;

/// Global configuration loaded from `~/.noodle/config.toml`.
///
/// # Examples
///
/// ```rust
/// use noodle::config::GlobalConfig;
///
/// let config: GlobalConfig = toml::from_str(r#"
///     walk_attributes = true
///     max_depth = 4
/// "#).unwrap();
///
/// let options = config.walk_options();
/// assert!(options.walk_attributes);
/// assert_eq!(options.max_depth, Some(4));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Directories searched for bare relative asset paths.
    ///
    /// `~` and environment variables are expanded when the paths are used.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_paths: Vec<String>,

    /// Follow asset-valued attributes by default.
    #[serde(default)]
    pub walk_attributes: bool,

    /// Maximum nesting level to descend into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,

    /// Texture extensions, replacing the built-in list when non-empty.
    ///
    /// Entries are matched case-insensitively; the leading dot is optional.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub texture_extensions: Vec<String>,
}

impl GlobalConfig {
    /// Load from the default location, or defaults if no file exists there.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from an explicit path if given, else from the default location.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    ///
    /// # Errors
    ///
    /// Returns [`NoodleError::ConfigNotFound`] for a missing explicit path and
    /// a parse error for invalid TOML.
    pub fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) if !path.exists() => Err(NoodleError::ConfigNotFound {
                path: path.display().to_string(),
            }
            .into()),
            Some(path) => Self::load_from(&path),
            None => Self::load(),
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid config TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .map_err(NoodleError::from)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Path of the configuration file.
    ///
    /// `NOODLE_CONFIG` wins when set and non-empty; otherwise
    /// `~/.noodle/config.toml` (`%LOCALAPPDATA%\noodle\config.toml` on Windows).
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
            && !path.trim().is_empty()
        {
            return Ok(PathBuf::from(path));
        }

        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("noodle")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".noodle")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Search directories: configured ones first, then `NOODLE_SEARCH_PATH`.
    ///
    /// Entries that fail to expand are used as written.
    #[must_use]
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .search_paths
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| match shellexpand::full(p) {
                Ok(expanded) => PathBuf::from(expanded.as_ref()),
                Err(e) => {
                    tracing::warn!("Cannot expand search path '{p}': {e}");
                    PathBuf::from(p)
                }
            })
            .collect();

        if let Some(value) = std::env::var_os(SEARCH_PATH_ENV_VAR) {
            dirs.extend(std::env::split_paths(&value).filter(|p| !p.as_os_str().is_empty()));
        }

        dirs
    }

    /// Texture extensions, lower-cased with a leading dot.
    #[must_use]
    pub fn texture_extensions(&self) -> Vec<String> {
        if self.texture_extensions.is_empty() {
            return TEXTURE_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect();
        }

        self.texture_extensions
            .iter()
            .map(|ext| ext.trim().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .map(|ext| if ext.starts_with('.') { ext } else { format!(".{ext}") })
            .collect()
    }

    /// Walk options derived from this configuration.
    #[must_use]
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            walk_attributes: self.walk_attributes,
            max_depth: self.max_depth,
            texture_extensions: self.texture_extensions(),
        }
    }
}
