//! Cross-platform utilities
//!
//! - [`paths`] - Canonical keys and anchoring for asset paths

pub mod paths;
