//! Error types for schema construction and key building.
//!
//! Both errors are raised synchronously by the call that detects them and are
//! never wrapped: each names exactly one offending element.

use thiserror::Error;

/// Structural problems detected by [`parameterize`](crate::parameterize).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No placeholder was supplied.
    #[error("parameterize: at least one placeholder required")]
    MissingPlaceholders,
    /// The attached schema is not a nested schema mapping.
    #[error("parameterize: valid nested schema object required")]
    InvalidNestedSchema,
}

/// A required placeholder had no value (or a null value) in the arguments.
///
/// `path` is a human-readable rendering of where the failure happened: for a
/// key builder, the whole path template with placeholders shown by name; for
/// a parameterizing function, the static path reached so far.
///
/// # Examples
///
/// ```
/// use keyschema_core::MissingArgumentError;
///
/// let err = MissingArgumentError::new("id", "user:id");
/// assert_eq!(err.to_string(), "missing argument `id` for key path `user:id`");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing argument `{placeholder}` for key path `{path}`")]
pub struct MissingArgumentError {
    /// Name of the unresolved placeholder.
    pub placeholder: String,
    /// Rendered path hint.
    pub path: String,
}

impl MissingArgumentError {
    /// Creates an error for `placeholder` at `path`.
    pub fn new(placeholder: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            path: path.into(),
        }
    }
}

/// Failures of [`CompiledTree::resolve_key`](crate::CompiledTree::resolve_key).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The path had no segments.
    #[error("key path cannot be empty")]
    EmptyPath,
    /// No entry with this name exists at the given path.
    #[error("no schema entry at `{0}`")]
    UnknownEntry(String),
    /// The path ends on a sub-tree or parameterizing function.
    #[error("`{0}` is not a key definition")]
    NotAKey(String),
    /// The path walks through a key definition.
    #[error("`{0}` is a key definition and has no children")]
    NotATree(String),
    /// A placeholder along the path had no value.
    #[error(transparent)]
    Missing(#[from] MissingArgumentError),
}
