//! Core types for Noodle
//!
//! This module holds the error system shared by every other module:
//!
//! - [`NoodleError`] - Enumerated error types
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to the user-friendly format
//!
//! # Example
//!
//! ```rust
//! use noodle::core::{NoodleError, user_friendly_error};
//!
//! fn open_root(path: &str) -> anyhow::Result<()> {
//!     if path.trim().is_empty() {
//!         return Err(NoodleError::InvalidRootPath.into());
//!     }
//!     Ok(())
//! }
//!
//! if let Err(e) = open_root("") {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.suggestion.is_some());
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, NoodleError, user_friendly_error};
