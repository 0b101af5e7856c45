//! Error handling for Noodle
//!
//! This module provides the error types and user-facing error reporting for Noodle.
//! The error system follows two principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`NoodleError`] - Enumerated error types for the failure cases Noodle reports
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//!
//! Note that the graph walk itself almost never fails: unreadable sublayers,
//! missing references and malformed asset paths are absorbed into the graph as
//! offline nodes or skipped targets. The errors below surface at the edges of the
//! system: an invalid root argument, an unopenable root layer, a broken config
//! file, or a parse failure reported by the filesystem composition service.
//!
//! # Examples
//!
//! ```rust,no_run
//! use noodle::core::{NoodleError, ErrorContext, user_friendly_error};
//!
//! let error = NoodleError::RootUnresolved {
//!     path: "/shots/s01/shot.usda".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for Noodle operations
///
/// # Error Categories
///
/// ## Graph building
/// - [`InvalidRootPath`] - The root argument is empty
/// - [`RootUnresolved`] - The root layer could not be opened
///
/// ## Layer reading
/// - [`LayerParseError`] - A text layer has invalid syntax
/// - [`UnsupportedLayerFormat`] - The layer is in a format the reader cannot parse
///
/// ## Configuration
/// - [`ConfigError`] - Configuration content is invalid
/// - [`ConfigNotFound`] - An explicitly requested config file is missing
/// - [`TomlError`] - TOML parsing errors from [`toml::de::Error`]
///
/// ## Output
/// - [`InvalidFormat`] - Unknown output format requested
/// - [`JsonError`] - JSON serialization errors from [`serde_json::Error`]
/// - [`IoError`] - Standard I/O errors from [`std::io::Error`]
///
/// [`InvalidRootPath`]: NoodleError::InvalidRootPath
/// [`RootUnresolved`]: NoodleError::RootUnresolved
/// [`LayerParseError`]: NoodleError::LayerParseError
/// [`UnsupportedLayerFormat`]: NoodleError::UnsupportedLayerFormat
/// [`ConfigError`]: NoodleError::ConfigError
/// [`ConfigNotFound`]: NoodleError::ConfigNotFound
/// [`TomlError`]: NoodleError::TomlError
/// [`InvalidFormat`]: NoodleError::InvalidFormat
/// [`JsonError`]: NoodleError::JsonError
/// [`IoError`]: NoodleError::IoError
#[derive(Error, Debug)]
pub enum NoodleError {
    /// The root path passed to the builder is empty or whitespace
    #[error("Root layer path must not be empty")]
    InvalidRootPath,

    /// The root layer could not be opened by the composition service
    #[error("Cannot open root layer: {path}")]
    RootUnresolved {
        /// Canonical key of the root layer
        path: String,
    },

    /// A text layer could not be parsed
    #[error("Invalid layer syntax in {file} at line {line}: {reason}")]
    LayerParseError {
        /// Layer file being parsed
        file: String,
        /// One-based line where parsing failed
        line: usize,
        /// What the parser expected or found
        reason: String,
    },

    /// The layer exists but is not in a readable format
    #[error("Unsupported layer format for {path}: {reason}")]
    UnsupportedLayerFormat {
        /// Layer file path
        path: String,
        /// Why the format was rejected
        reason: String,
    },

    /// Configuration content is invalid
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// Config file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to the configuration file that was not found
        path: String,
    },

    /// The walk found dependencies whose files do not exist
    #[error("{count} offline dependencies found")]
    OfflineDependencies {
        /// Number of offline nodes
        count: usize,
    },

    /// Unknown output format
    #[error("Invalid output format '{format}'")]
    InvalidFormat {
        /// Format string supplied by the user
        format: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for NoodleError {
    fn clone(&self) -> Self {
        match self {
            Self::InvalidRootPath => Self::InvalidRootPath,
            Self::RootUnresolved {
                path,
            } => Self::RootUnresolved {
                path: path.clone(),
            },
            Self::LayerParseError {
                file,
                line,
                reason,
            } => Self::LayerParseError {
                file: file.clone(),
                line: *line,
                reason: reason.clone(),
            },
            Self::UnsupportedLayerFormat {
                path,
                reason,
            } => Self::UnsupportedLayerFormat {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::ConfigNotFound {
                path,
            } => Self::ConfigNotFound {
                path: path.clone(),
            },
            Self::OfflineDependencies {
                count,
            } => Self::OfflineDependencies {
                count: *count,
            },
            Self::InvalidFormat {
                format,
            } => Self::InvalidFormat {
                format: format.clone(),
            },
            // The wrapped library errors are not Clone; keep their message
            Self::IoError(e) => Self::IoError(std::io::Error::new(e.kind(), e.to_string())),
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Combines a [`NoodleError`] with optional details and a suggestion so the CLI
/// can explain what went wrong and how to fix it.
///
/// # Examples
///
/// ```rust,no_run
/// use noodle::core::{NoodleError, ErrorContext};
///
/// let context = ErrorContext::new(NoodleError::InvalidRootPath)
///     .with_suggestion("Pass the layer to inspect, e.g. 'noodle graph shot.usda'")
///     .with_details("The graph is built starting from a single root layer");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying Noodle error
    pub error: NoodleError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details
    #[must_use]
    pub const fn new(error: NoodleError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    ///
    /// Suggestions are actionable steps and are displayed in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    ///
    /// Details are displayed in yellow, below the error line.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`NoodleError`] variants, common [`std::io::Error`] kinds and TOML
/// errors; anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(noodle_error) = error.downcast_ref::<NoodleError>() {
        return create_error_context(noodle_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(NoodleError::IoError(std::io::Error::new(
                    io_error.kind(),
                    io_error.to_string(),
                )))
                .with_suggestion("Check the file permissions of the layer and its directory")
                .with_details("Noodle only reads layers, but it needs read access to every file it inspects");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(NoodleError::IoError(std::io::Error::new(
                    io_error.kind(),
                    io_error.to_string(),
                )))
                .with_suggestion("Check that the file exists and the path is spelled correctly");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(NoodleError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in your Noodle config file");
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(NoodleError::Other {
        message,
    })
}

/// Map each [`NoodleError`] variant to a context with tailored suggestions
fn create_error_context(error: NoodleError) -> ErrorContext {
    match &error {
        NoodleError::InvalidRootPath => ErrorContext::new(error)
            .with_suggestion("Pass the layer to inspect, e.g. 'noodle graph shot.usda'"),

        NoodleError::RootUnresolved { path } => {
            let details = format!(
                "The composition service could not open '{path}'. Sublayers and references are only discovered once the root layer opens"
            );
            ErrorContext::new(error)
                .with_suggestion(
                    "Check that the file exists and is a text layer (.usda, or .usd saved as ascii)",
                )
                .with_details(details)
        }

        NoodleError::LayerParseError { file, .. } => {
            let suggestion = format!(
                "Open {file} in a text editor and check the reported line for unbalanced brackets or quotes"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        NoodleError::UnsupportedLayerFormat { .. } => ErrorContext::new(error)
            .with_suggestion("Convert binary layers to text first, e.g. 'usdcat layer.usdc -o layer.usda'")
            .with_details("Only text layers can be read without the scene-description runtime"),

        NoodleError::ConfigNotFound { path } => {
            let suggestion = format!(
                "Create {path} or unset the NOODLE_CONFIG environment variable to use the default location"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        NoodleError::InvalidFormat { .. } => ErrorContext::new(error)
            .with_suggestion("Valid formats are: tree, text, json, dot"),

        NoodleError::OfflineDependencies { .. } => ErrorContext::new(error).with_suggestion(
            "Add the directories holding shared assets with --search-path, or fix the paths in the referencing layers",
        ),

        _ => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(NoodleError::InvalidRootPath.to_string(), "Root layer path must not be empty");

        let error = NoodleError::RootUnresolved {
            path: "/a/b.usda".to_string(),
        };
        assert_eq!(error.to_string(), "Cannot open root layer: /a/b.usda");

        let error = NoodleError::LayerParseError {
            file: "shot.usda".to_string(),
            line: 12,
            reason: "expected '='".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid layer syntax in shot.usda at line 12: expected '='");
    }

    #[test]
    fn test_clone_keeps_every_variant_message() {
        let errors = vec![
            NoodleError::InvalidRootPath,
            NoodleError::RootUnresolved {
                path: "/a.usda".to_string(),
            },
            NoodleError::LayerParseError {
                file: "a.usda".to_string(),
                line: 3,
                reason: "unclosed prim body".to_string(),
            },
            NoodleError::UnsupportedLayerFormat {
                path: "a.usdc".to_string(),
                reason: "binary".to_string(),
            },
            NoodleError::ConfigError {
                message: "bad".to_string(),
            },
            NoodleError::ConfigNotFound {
                path: "/c.toml".to_string(),
            },
            NoodleError::OfflineDependencies {
                count: 2,
            },
            NoodleError::InvalidFormat {
                format: "yaml".to_string(),
            },
            NoodleError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
            NoodleError::TomlError(toml::from_str::<toml::Value>("= 1").unwrap_err()),
            NoodleError::JsonError(serde_json::from_str::<serde_json::Value>("{").unwrap_err()),
            NoodleError::Other {
                message: "other".to_string(),
            },
        ];

        for error in &errors {
            assert_eq!(error.clone().to_string(), error.to_string());
        }
    }

    #[test]
    fn test_user_friendly_error_offline_dependencies() {
        let ctx = user_friendly_error(anyhow::Error::from(NoodleError::OfflineDependencies {
            count: 1,
        }));
        assert!(matches!(ctx.error, NoodleError::OfflineDependencies { count: 1 }));
        assert!(ctx.suggestion.unwrap().contains("--search-path"));
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext::new(NoodleError::InvalidRootPath)
            .with_suggestion("Pass a layer")
            .with_details("Nothing to walk");

        let display = format!("{ctx}");
        assert!(display.contains("Root layer path must not be empty"));
        assert!(display.contains("Details: Nothing to walk"));
        assert!(display.contains("Suggestion: Pass a layer"));
    }

    #[test]
    fn test_user_friendly_error_root_unresolved() {
        let error = anyhow::Error::from(NoodleError::RootUnresolved {
            path: "/missing.usda".to_string(),
        });

        let ctx = user_friendly_error(error);
        assert!(matches!(ctx.error, NoodleError::RootUnresolved { .. }));
        assert!(ctx.suggestion.is_some());
        assert!(ctx.details.unwrap().contains("/missing.usda"));
    }

    #[test]
    fn test_user_friendly_error_io_not_found() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let ctx = user_friendly_error(anyhow::Error::from(io_error));

        assert!(matches!(ctx.error, NoodleError::IoError(_)));
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn test_user_friendly_error_generic_chain() {
        let error = anyhow::anyhow!("root cause").context("while rendering");
        let ctx = user_friendly_error(error);

        match ctx.error {
            NoodleError::Other {
                message,
            } => {
                assert!(message.contains("while rendering"));
                assert!(message.contains("Caused by:"));
                assert!(message.contains("root cause"));
            }
            _ => panic!("Expected Other error"),
        }
    }

    #[test]
    fn test_clone_preserves_io_kind() {
        let error = NoodleError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        match error.clone() {
            NoodleError::IoError(e) => assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied),
            _ => panic!("Expected IoError"),
        }
    }
}
