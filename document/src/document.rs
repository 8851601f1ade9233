//! Key schema documents.
//!
//! A document pairs the builder configuration with a schema, written in YAML
//! or JSON.
//!
//! # Example YAML
//!
//! ```yaml
//! separator: ":"
//! keys:
//!   user: ["user", { string: id }]
//!   posts:
//!     $parameterize: [{ string: postId }]
//!     $schema:
//!       detail: ["detail"]
//!       comments: ["comments", { number: page }]
//!   config:
//!     app: ["config"]
//!   retired: ~
//! ```

use std::path::Path;

use keyschema_core::{BuilderConfig, CompiledTree, KeyBuilder, NestedSchema};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::Result;
use crate::layout::KeyLayout;
use crate::loader::{schema_from_value, schema_to_value};

/// Serialization format of a document file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Strict JSON, written pretty-printed.
    Json,
    /// YAML, the default for any extension other than `.json`.
    Yaml,
}

impl DocumentFormat {
    /// Picks a format from the file extension.
    ///
    /// `.json` is JSON; everything else is read as YAML, which also accepts
    /// JSON input.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyschema_document::DocumentFormat;
    ///
    /// assert_eq!(DocumentFormat::from_path("keys.json"), DocumentFormat::Json);
    /// assert_eq!(DocumentFormat::from_path("KEYS.JSON"), DocumentFormat::Json);
    /// assert_eq!(DocumentFormat::from_path("keys.yml"), DocumentFormat::Yaml);
    /// assert_eq!(DocumentFormat::from_path("keys"), DocumentFormat::Yaml);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    separator: Option<String>,
    keys: serde_json::Value,
}

/// A loaded key schema document.
///
/// # Examples
///
/// ```
/// use keyschema_core::args;
/// use keyschema_document::KeySchemaDocument;
///
/// let doc = KeySchemaDocument::from_yaml_str(r#"
/// separator: "/"
/// keys:
///   user: ["user", { string: id }]
/// "#).unwrap();
///
/// let keys = doc.compile();
/// assert_eq!(keys.key("user").unwrap().build(&args! { "id" => "42" }).unwrap(), "user/42");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KeySchemaDocument {
    /// Builder options (the separator).
    pub config: BuilderConfig,
    /// The key schema.
    pub schema: NestedSchema,
}

impl KeySchemaDocument {
    /// Wraps an existing schema.
    pub fn new(config: BuilderConfig, schema: NestedSchema) -> Self {
        Self { config, schema }
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError`](crate::DocumentError::JsonError) for malformed
    /// JSON or a missing `keys` field, or any error of
    /// [`schema_from_value`].
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let raw: RawDocument = serde_json::from_str(raw)?;
        Self::from_raw(raw)
    }

    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`YamlError`](crate::DocumentError::YamlError) for malformed
    /// YAML or a missing `keys` field, or any error of
    /// [`schema_from_value`].
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let raw: RawDocument = serde_yaml::from_str(raw)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawDocument) -> Result<Self> {
        let config = match raw.separator {
            Some(separator) => BuilderConfig::with_separator(separator),
            None => BuilderConfig::default(),
        };
        let schema = schema_from_value(&raw.keys)?;
        Ok(Self { config, schema })
    }

    /// Loads a document, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DocumentError::IoError) if the file cannot
    /// be read, or any parse error of the chosen format.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let format = DocumentFormat::from_path(path);
        debug!(path = %path.display(), format = ?format, "Loading key schema document");
        match format {
            DocumentFormat::Json => Self::from_json_str(&raw),
            DocumentFormat::Yaml => Self::from_yaml_str(&raw),
        }
    }

    /// Saves the document, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DocumentError::IoError) if the file cannot
    /// be written, or a serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let value = self.to_value();
        let raw = match DocumentFormat::from_path(path) {
            DocumentFormat::Json => serde_json::to_string_pretty(&value)?,
            DocumentFormat::Yaml => serde_yaml::to_string(&value)?,
        };
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Document form as an untyped value.
    pub fn to_value(&self) -> serde_json::Value {
        json!({
            "separator": self.config.separator,
            "keys": schema_to_value(&self.schema),
        })
    }

    /// Replaces the configured separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.config.separator = separator.into();
        self
    }

    /// Separator keys are joined with.
    pub fn separator(&self) -> &str {
        &self.config.separator
    }

    /// Builder bound to this document's configuration.
    pub fn builder(&self) -> KeyBuilder {
        KeyBuilder::new(self.config.clone())
    }

    /// Compiles the schema.
    pub fn compile(&self) -> CompiledTree {
        self.builder().compile(&self.schema)
    }

    /// Lists every key with its template and arguments.
    pub fn layout(&self) -> KeyLayout {
        KeyLayout::new(&self.schema, &self.config.separator)
    }
}
