//! Error types for schema document operations.
//!
//! Provides a unified error type covering I/O, serialization, document
//! structure, and `parameterize` preconditions hit while loading.

use keyschema_core::ConfigurationError;
use thiserror::Error;

/// Errors that can occur while loading or saving a key schema document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A value that must be a mapping is not one.
    #[error("expected a mapping at `{0}`")]
    NotAMapping(String),

    /// A `$parameterize` entry holds something that is not a placeholder.
    #[error("invalid placeholder at `{path}`: {found}")]
    InvalidPlaceholder {
        /// Dotted path of the parameterized entry.
        path: String,
        /// The offending value, rendered as JSON.
        found: String,
    },

    /// A parameterized entry violates a `parameterize` precondition.
    #[error("`{path}`: {source}")]
    Configuration {
        /// Dotted path of the parameterized entry.
        path: String,
        /// The violated precondition.
        #[source]
        source: ConfigurationError,
    },
}

/// Convenience alias for results with [`DocumentError`].
pub type Result<T> = std::result::Result<T, DocumentError>;
