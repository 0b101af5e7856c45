//! Global constants used throughout the Noodle codebase.
//!
//! File-format markers, extension tables and environment variable names that
//! more than one module depends on live here so the values stay in sync.

/// Extensions classified as textures (images and video) by the attribute walk.
///
/// Matching is case-insensitive and includes the leading dot.
pub const TEXTURE_EXTENSIONS: &[&str] = &[
    ".jpg", ".tex", ".tx", ".png", ".exr", ".hdr", ".tga", ".tif", ".tiff", ".pic", ".gif", ".psd",
    ".ptex", ".cin", ".dpx", ".bmp", ".iff", ".mov", ".m4v", ".mp4", ".webp",
];

/// Magic bytes at the start of a binary crate layer.
pub const BINARY_LAYER_MAGIC: &[u8] = b"PXR-USDC";

/// Header that every text layer starts with.
pub const TEXT_LAYER_HEADER: &str = "#usda";

/// Environment variable overriding the global config file location.
pub const CONFIG_ENV_VAR: &str = "NOODLE_CONFIG";

/// Environment variable with extra search paths, separated like `PATH`.
pub const SEARCH_PATH_ENV_VAR: &str = "NOODLE_SEARCH_PATH";

/// Name of the clip set synthesized from legacy (pre clip-set) metadata.
pub const LEGACY_CLIP_SET: &str = "default";
