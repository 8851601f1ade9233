//! Schema compilation into key builders.
//!
//! [`KeyBuilder::compile`] walks a [`NestedSchema`] once, top-down, carrying
//! the resolved path prefix, and produces a [`CompiledTree`] of the same
//! shape:
//!
//! - a [`KeyDefinition`](crate::KeyDefinition) becomes a [`KeyFn`] holding
//!   its full path template;
//! - a [`ParameterizedNode`](crate::ParameterizedNode) becomes a
//!   [`ParameterizeFn`] that resolves its placeholders and compiles the gated
//!   schema on every call;
//! - a nested schema becomes a nested [`CompiledTree`].
//!
//! Compiled values are immutable and `Send + Sync`; a tree can be shared
//! across threads and called concurrently without coordination.
//!
//! # Examples
//!
//! ```
//! use keyschema_core::*;
//!
//! let schema = NestedSchema::new()
//!     .key("user", key!["user", Placeholder::string("id")])
//!     .parameterized(
//!         "a",
//!         parameterize(Placeholder::string("t"), NestedSchema::new().key("b", key!["b"])).unwrap(),
//!     );
//!
//! let keys = KeyBuilder::default().compile(&schema);
//! assert_eq!(keys.key("user").unwrap().build(&args! { "id" => "42" }).unwrap(), "user:42");
//!
//! let arrow = KeyBuilder::new(BuilderConfig::with_separator("->")).compile(&schema);
//! let sub = arrow.parameterized("a").unwrap().apply(&args! { "t" => "9" }).unwrap();
//! assert_eq!(sub.key("b").unwrap().build_static().unwrap(), "a->9->b");
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MissingArgumentError, ResolveError};
use crate::types::{KeyDefinition, KeyPart, NestedSchema, Placeholder, SchemaNode};
use crate::value::Args;

/// Separator used when none is configured.
pub const DEFAULT_SEPARATOR: &str = ":";

/// Options for [`KeyBuilder`].
///
/// # Examples
///
/// ```
/// use keyschema_core::BuilderConfig;
///
/// assert_eq!(BuilderConfig::default().separator, ":");
///
/// let config: BuilderConfig = serde_json::from_str("{}").unwrap();
/// assert_eq!(config.separator, ":");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Text placed between path segments.
    pub separator: String,
}

impl BuilderConfig {
    /// Config with a custom separator.
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

/// Compiles schemas with a fixed separator.
///
/// Holds no state beyond the separator; each [`compile`](Self::compile) call
/// produces an independent tree.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    separator: Arc<str>,
}

impl KeyBuilder {
    /// Creates a builder bound to `config.separator`.
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            separator: Arc::from(config.separator),
        }
    }

    /// The bound separator.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Compiles `schema` into a tree of key builders.
    ///
    /// Never fails: absent entries are skipped (with a diagnostic in debug
    /// builds) and every other entry kind has a compiled counterpart.
    pub fn compile(&self, schema: &NestedSchema) -> CompiledTree {
        compile_level(schema, &[], &self.separator)
    }
}

impl Default for KeyBuilder {
    fn default() -> Self {
        Self::new(BuilderConfig::default())
    }
}

/// Builder factory entry point; same as [`KeyBuilder::new`].
pub fn create_key_builder(config: BuilderConfig) -> KeyBuilder {
    KeyBuilder::new(config)
}

/// Process-wide development-mode indicator.
///
/// Skip diagnostics (absent or unrecognized schema entries) are only emitted
/// when this is `true`, which is the case in debug builds.
pub fn development_mode() -> bool {
    cfg!(debug_assertions)
}

fn compile_level(schema: &NestedSchema, prefix: &[String], separator: &Arc<str>) -> CompiledTree {
    let mut entries = BTreeMap::new();

    for (key, node) in schema.iter() {
        let Some(node) = node else {
            if development_mode() {
                warn!(
                    key = key,
                    prefix = %prefix.join(&**separator),
                    "Skipping absent schema entry"
                );
            }
            continue;
        };

        let entry = match node {
            SchemaNode::Parameterized(param) => CompiledEntry::Parameterized(ParameterizeFn {
                key: key.to_string(),
                prefix: prefix.to_vec(),
                placeholders: param.placeholders().to_vec(),
                schema: param.shared_schema(),
                separator: Arc::clone(separator),
            }),
            SchemaNode::Key(def) => CompiledEntry::Key(KeyFn::new(prefix, def, separator)),
            SchemaNode::Nested(nested) => {
                let mut child_prefix = prefix.to_vec();
                child_prefix.push(key.to_string());
                CompiledEntry::Nested(compile_level(nested, &child_prefix, separator))
            }
        };
        entries.insert(key.to_string(), entry);
    }

    CompiledTree { entries }
}

/// A compiled schema level.
#[derive(Debug, Clone, Default)]
pub struct CompiledTree {
    entries: BTreeMap<String, CompiledEntry>,
}

/// One compiled entry.
#[derive(Debug, Clone)]
pub enum CompiledEntry {
    /// Builds a key string.
    Key(KeyFn),
    /// Returns a freshly compiled sub-tree once its placeholders are supplied.
    Parameterized(ParameterizeFn),
    /// Static sub-tree.
    Nested(CompiledTree),
}

impl CompiledTree {
    /// Looks up an entry.
    pub fn get(&self, name: &str) -> Option<&CompiledEntry> {
        self.entries.get(name)
    }

    /// Looks up a key builder.
    pub fn key(&self, name: &str) -> Option<&KeyFn> {
        match self.entries.get(name)? {
            CompiledEntry::Key(f) => Some(f),
            _ => None,
        }
    }

    /// Looks up a parameterizing function.
    pub fn parameterized(&self, name: &str) -> Option<&ParameterizeFn> {
        match self.entries.get(name)? {
            CompiledEntry::Parameterized(f) => Some(f),
            _ => None,
        }
    }

    /// Looks up a static sub-tree.
    pub fn nested(&self, name: &str) -> Option<&CompiledTree> {
        match self.entries.get(name)? {
            CompiledEntry::Nested(tree) => Some(tree),
            _ => None,
        }
    }

    /// Returns `true` if an entry exists under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entry names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CompiledEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Walks `path` and builds the key at its end.
    ///
    /// Parameterizing functions on the way are applied with the same `args`,
    /// so one mapping supplies every placeholder along the path.
    ///
    /// # Errors
    ///
    /// See [`ResolveError`].
    ///
    /// # Examples
    ///
    /// ```
    /// use keyschema_core::*;
    ///
    /// let schema = NestedSchema::new().parameterized(
    ///     "posts",
    ///     parameterize(
    ///         Placeholder::string("post"),
    ///         NestedSchema::new().key("likes", key!["likes"]),
    ///     )
    ///     .unwrap(),
    /// );
    /// let keys = KeyBuilder::default().compile(&schema);
    /// let key = keys.resolve_key(&["posts", "likes"], &args! { "post" => "p1" }).unwrap();
    /// assert_eq!(key, "posts:p1:likes");
    /// ```
    pub fn resolve_key(&self, path: &[&str], args: &Args) -> Result<String, ResolveError> {
        if path.is_empty() {
            return Err(ResolveError::EmptyPath);
        }
        let mut walked = Vec::with_capacity(path.len());
        resolve_from(self, path, &mut walked, args)
    }
}

fn resolve_from(
    tree: &CompiledTree,
    path: &[&str],
    walked: &mut Vec<String>,
    args: &Args,
) -> Result<String, ResolveError> {
    let Some((head, rest)) = path.split_first() else {
        return Err(ResolveError::EmptyPath);
    };
    walked.push((*head).to_string());

    let entry = tree
        .get(head)
        .ok_or_else(|| ResolveError::UnknownEntry(walked.join(".")))?;

    match entry {
        CompiledEntry::Key(f) if rest.is_empty() => Ok(f.build(args)?),
        CompiledEntry::Key(_) => Err(ResolveError::NotATree(walked.join("."))),
        _ if rest.is_empty() => Err(ResolveError::NotAKey(walked.join("."))),
        CompiledEntry::Nested(child) => resolve_from(child, rest, walked, args),
        CompiledEntry::Parameterized(f) => {
            let child = f.apply(args)?;
            resolve_from(&child, rest, walked, args)
        }
    }
}

/// A compiled key builder.
///
/// Holds the full path template: the literal prefix resolved at compile time
/// followed by the definition's own parts. Only the definition's placeholders
/// are arguments; placeholders of enclosing parameterizations are already
/// literal text in the prefix.
#[derive(Debug, Clone)]
pub struct KeyFn {
    template: Vec<KeyPart>,
    local: Vec<Placeholder>,
    separator: Arc<str>,
}

impl KeyFn {
    fn new(prefix: &[String], def: &KeyDefinition, separator: &Arc<str>) -> Self {
        let template = prefix
            .iter()
            .cloned()
            .map(KeyPart::Literal)
            .chain(def.parts().iter().cloned())
            .collect();

        Self {
            template,
            local: def.placeholders().cloned().collect(),
            separator: Arc::clone(separator),
        }
    }

    /// Builds the key from `args`.
    ///
    /// Parts are emitted left to right. Empty literals are kept, so they
    /// produce adjacent separators.
    ///
    /// # Errors
    ///
    /// Returns [`MissingArgumentError`] for the first placeholder, in path
    /// order, that has no value or a null value.
    pub fn build(&self, args: &Args) -> Result<String, MissingArgumentError> {
        let mut tokens = Vec::with_capacity(self.template.len());
        for part in &self.template {
            match part {
                KeyPart::Literal(text) => tokens.push(text.clone()),
                KeyPart::Placeholder(p) => match args.get(p.name()) {
                    Some(value) => tokens.push(value.to_segment()),
                    None => return Err(MissingArgumentError::new(p.name(), self.template())),
                },
            }
        }
        Ok(tokens.join(&*self.separator))
    }

    /// Builds a key that takes no arguments.
    ///
    /// # Errors
    ///
    /// Returns [`MissingArgumentError`] if the key does have placeholders.
    pub fn build_static(&self) -> Result<String, MissingArgumentError> {
        self.build(&Args::new())
    }

    /// Returns `true` if the key needs arguments.
    pub fn takes_args(&self) -> bool {
        !self.local.is_empty()
    }

    /// Placeholders this key needs, in path order.
    pub fn required_args(&self) -> &[Placeholder] {
        &self.local
    }

    /// Path template with placeholders shown by name.
    pub fn template(&self) -> String {
        self.template
            .iter()
            .map(KeyPart::hint)
            .collect::<Vec<_>>()
            .join(&*self.separator)
    }

    /// Bound separator.
    pub fn separator(&self) -> &str {
        &self.separator
    }
}

/// A compiled parameterizing function.
///
/// Each [`apply`](Self::apply) call compiles the gated schema again; nothing
/// is cached between calls.
#[derive(Debug, Clone)]
pub struct ParameterizeFn {
    key: String,
    prefix: Vec<String>,
    placeholders: Vec<Placeholder>,
    schema: Arc<NestedSchema>,
    separator: Arc<str>,
}

impl ParameterizeFn {
    /// Resolves the placeholders and compiles the gated schema.
    ///
    /// The new prefix is the current prefix, this entry's key, then each
    /// resolved value in declared placeholder order.
    ///
    /// # Errors
    ///
    /// Returns [`MissingArgumentError`] for the first placeholder, in
    /// declared order, without a value; later placeholders are not looked
    /// at.
    pub fn apply(&self, args: &Args) -> Result<CompiledTree, MissingArgumentError> {
        let mut prefix = self.prefix.clone();
        prefix.push(self.key.clone());

        let mut values = Vec::with_capacity(self.placeholders.len());
        for p in &self.placeholders {
            match args.get(p.name()) {
                Some(value) => values.push(value.to_segment()),
                None => {
                    return Err(MissingArgumentError::new(
                        p.name(),
                        prefix.join(&*self.separator),
                    ));
                }
            }
        }
        prefix.extend(values);

        debug!(key = %self.key, prefix = %prefix.join(&*self.separator), "Compiling parameterized schema");
        Ok(compile_level(&self.schema, &prefix, &self.separator))
    }

    /// Entry name this function was compiled under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Placeholders in declared order.
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }
}
