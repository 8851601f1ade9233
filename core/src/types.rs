//! Schema type definitions for key layout modeling.
//!
//! This module defines the vocabulary a key schema is written in:
//!
//! - [`Placeholder`]: a named, typed slot filled in when a key is built.
//! - [`KeyDefinition`]: an ordered list of literal segments and placeholders;
//!   a leaf that yields one key builder.
//! - [`ParameterizedNode`]: placeholders that must be supplied before the
//!   attached [`NestedSchema`] becomes reachable.
//! - [`NestedSchema`]: a mapping from segment names to further nodes.
//!
//! Node kinds form the closed set [`SchemaNode`], so the compiler matches them
//! exhaustively instead of sniffing shapes at runtime.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Primitive value kinds a placeholder may carry.
///
/// # Examples
///
/// ```
/// use keyschema_core::Primitive;
///
/// assert_eq!(Primitive::Number.as_str(), "number");
/// assert_eq!(Primitive::default(), Primitive::String);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    /// Text value (the default kind).
    #[default]
    String,
    /// Numeric value.
    Number,
    /// `true` / `false`.
    Boolean,
}

impl Primitive {
    /// Returns the lowercase tag used in documents and listings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Parses a lowercase tag back into a kind.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named slot in a key path.
///
/// The value type is only a declaration: at build time every value is
/// coerced to text regardless of its kind. Names are not validated; keeping
/// them unique among the placeholders that apply to one key is up to the
/// schema author (see [`validate_schema`](crate::validate_schema)).
///
/// # Examples
///
/// ```
/// use keyschema_core::{Placeholder, Primitive};
///
/// let id = Placeholder::string("id");
/// assert_eq!(id.name(), "id");
/// assert_eq!(id.value_type(), Primitive::String);
///
/// let page = Placeholder::number("page");
/// assert_eq!(page.value_type(), Primitive::Number);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placeholder {
    name: String,
    value_type: Primitive,
}

impl Placeholder {
    /// Creates a placeholder of the given kind.
    pub fn new(name: impl Into<String>, value_type: Primitive) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }

    /// Creates a string placeholder.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, Primitive::String)
    }

    /// Creates a number placeholder.
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, Primitive::Number)
    }

    /// Creates a boolean placeholder.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, Primitive::Boolean)
    }

    /// Name used to look the value up in an argument mapping.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared primitive kind.
    pub fn value_type(&self) -> Primitive {
        self.value_type
    }
}

/// Shorthand for [`Placeholder::string`].
pub fn placeholder(name: impl Into<String>) -> Placeholder {
    Placeholder::string(name)
}

/// One segment of a key definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPart {
    /// Emitted verbatim.
    Literal(String),
    /// Resolved from the call's arguments.
    Placeholder(Placeholder),
}

impl KeyPart {
    /// Returns the placeholder if this part is one.
    pub fn as_placeholder(&self) -> Option<&Placeholder> {
        match self {
            Self::Placeholder(p) => Some(p),
            Self::Literal(_) => None,
        }
    }

    /// Human-readable form: literals verbatim, placeholders by name.
    pub fn hint(&self) -> &str {
        match self {
            Self::Literal(text) => text,
            Self::Placeholder(p) => p.name(),
        }
    }
}

impl From<&str> for KeyPart {
    fn from(text: &str) -> Self {
        Self::Literal(text.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

impl From<Placeholder> for KeyPart {
    fn from(p: Placeholder) -> Self {
        Self::Placeholder(p)
    }
}

impl From<&Placeholder> for KeyPart {
    fn from(p: &Placeholder) -> Self {
        Self::Placeholder(p.clone())
    }
}

/// Ordered path segments for a single key builder.
///
/// The parts are joined in order; the mapping key the definition is stored
/// under is **not** part of the path. A definition may contain no
/// placeholders at all, in which case its builder takes no arguments.
///
/// Usually written with the [`key!`](crate::key) macro.
///
/// # Examples
///
/// ```
/// use keyschema_core::{key, Placeholder};
///
/// let def = key!["user", Placeholder::string("id"), "profile"];
/// assert_eq!(def.parts().len(), 3);
/// assert_eq!(def.placeholders().count(), 1);
/// assert!(!def.is_static());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyDefinition {
    parts: Vec<KeyPart>,
}

impl KeyDefinition {
    /// Creates a definition from its parts.
    pub fn new(parts: Vec<KeyPart>) -> Self {
        Self { parts }
    }

    /// Appends a part.
    pub fn with_part(mut self, part: impl Into<KeyPart>) -> Self {
        self.parts.push(part.into());
        self
    }

    /// All parts in path order.
    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }

    /// Placeholders local to this definition, in path order.
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.parts.iter().filter_map(KeyPart::as_placeholder)
    }

    /// Returns `true` when the definition has no placeholders.
    pub fn is_static(&self) -> bool {
        self.placeholders().next().is_none()
    }
}

impl<P: Into<KeyPart>> FromIterator<P> for KeyDefinition {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Builds a [`KeyDefinition`] from a mixed list of literals and placeholders.
///
/// ```
/// use keyschema_core::{key, Placeholder};
///
/// let def = key!["session", Placeholder::number("n")];
/// assert_eq!(def.parts()[0].hint(), "session");
/// ```
#[macro_export]
macro_rules! key {
    ($($part:expr),* $(,)?) => {
        $crate::KeyDefinition::new(vec![$($crate::KeyPart::from($part)),*])
    };
}

/// A schema entry.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Leaf producing one key builder.
    Key(KeyDefinition),
    /// Sub-schema reachable after supplying placeholders.
    Parameterized(ParameterizedNode),
    /// Static sub-schema under its mapping key.
    Nested(NestedSchema),
}

impl SchemaNode {
    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Key(_) => "key definition",
            Self::Parameterized(_) => "parameterized node",
            Self::Nested(_) => "nested schema",
        }
    }
}

impl From<KeyDefinition> for SchemaNode {
    fn from(def: KeyDefinition) -> Self {
        Self::Key(def)
    }
}

impl From<ParameterizedNode> for SchemaNode {
    fn from(node: ParameterizedNode) -> Self {
        Self::Parameterized(node)
    }
}

impl From<NestedSchema> for SchemaNode {
    fn from(schema: NestedSchema) -> Self {
        Self::Nested(schema)
    }
}

/// Mapping from segment names to schema entries.
///
/// An entry may be absent (`None`); the compiler skips such entries without
/// failing. Entries are enumerated in key order, which only affects the
/// order of diagnostics.
///
/// # Examples
///
/// ```
/// use keyschema_core::{key, NestedSchema, Placeholder};
///
/// let schema = NestedSchema::new()
///     .key("user", key!["user", Placeholder::string("id")])
///     .nested("config", NestedSchema::new().key("app", key!["config"]))
///     .absent("retired");
///
/// assert_eq!(schema.len(), 3);
/// assert!(schema.get("retired").is_none());
/// assert!(schema.get("user").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NestedSchema {
    entries: BTreeMap<String, Option<SchemaNode>>,
}

impl NestedSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing any entry with the same name.
    pub fn insert(&mut self, name: impl Into<String>, node: Option<SchemaNode>) {
        self.entries.insert(name.into(), node);
    }

    /// Adds an entry of any kind (or an absent one).
    pub fn entry(mut self, name: impl Into<String>, node: Option<SchemaNode>) -> Self {
        self.insert(name, node);
        self
    }

    /// Adds a key definition.
    pub fn key(self, name: impl Into<String>, def: KeyDefinition) -> Self {
        self.entry(name, Some(SchemaNode::Key(def)))
    }

    /// Adds a static sub-schema.
    pub fn nested(self, name: impl Into<String>, schema: NestedSchema) -> Self {
        self.entry(name, Some(SchemaNode::Nested(schema)))
    }

    /// Adds a parameterized sub-schema.
    pub fn parameterized(self, name: impl Into<String>, node: ParameterizedNode) -> Self {
        self.entry(name, Some(SchemaNode::Parameterized(node)))
    }

    /// Adds an absent entry.
    pub fn absent(self, name: impl Into<String>) -> Self {
        self.entry(name, None)
    }

    /// Looks up a present entry.
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.entries.get(name).and_then(Option::as_ref)
    }

    /// Returns `true` if an entry (present or absent) exists under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates all entries, absent ones included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&SchemaNode>)> {
        self.entries
            .iter()
            .map(|(name, node)| (name.as_str(), node.as_ref()))
    }

    /// Number of entries, absent ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Placeholders that gate a nested schema.
///
/// Created with [`parameterize`], which enforces a non-empty placeholder list
/// and a mapping-shaped schema. The nested schema is shared behind an
/// [`Arc`] so compiled trees can recompile it on every call cheaply.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterizedNode {
    placeholders: Vec<Placeholder>,
    schema: Arc<NestedSchema>,
}

impl ParameterizedNode {
    /// Placeholders in declared order.
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// The gated schema.
    pub fn schema(&self) -> &NestedSchema {
        &self.schema
    }

    pub(crate) fn shared_schema(&self) -> Arc<NestedSchema> {
        Arc::clone(&self.schema)
    }
}

/// Conversion into the placeholder list of a [`ParameterizedNode`].
pub trait IntoPlaceholders {
    /// Returns the placeholders in declared order.
    fn into_placeholders(self) -> Vec<Placeholder>;
}

impl IntoPlaceholders for Placeholder {
    fn into_placeholders(self) -> Vec<Placeholder> {
        vec![self]
    }
}

impl IntoPlaceholders for Option<Placeholder> {
    fn into_placeholders(self) -> Vec<Placeholder> {
        self.into_iter().collect()
    }
}

impl IntoPlaceholders for Vec<Placeholder> {
    fn into_placeholders(self) -> Vec<Placeholder> {
        self
    }
}

impl IntoPlaceholders for &[Placeholder] {
    fn into_placeholders(self) -> Vec<Placeholder> {
        self.to_vec()
    }
}

impl<const N: usize> IntoPlaceholders for [Placeholder; N] {
    fn into_placeholders(self) -> Vec<Placeholder> {
        self.into()
    }
}

/// Couples placeholders with the schema they unlock.
///
/// # Errors
///
/// - [`ConfigurationError::MissingPlaceholders`] if no placeholder is given.
/// - [`ConfigurationError::InvalidNestedSchema`] if `schema` is not a
///   [`SchemaNode::Nested`] mapping.
///
/// The placeholder check runs first. Placeholder names and the schema's own
/// leaves are not inspected here.
///
/// # Examples
///
/// ```
/// use keyschema_core::*;
///
/// let node = parameterize(
///     Placeholder::string("id"),
///     NestedSchema::new().key("leaf", key!["x"]),
/// )
/// .unwrap();
/// assert_eq!(node.placeholders().len(), 1);
///
/// let err = parameterize(Vec::<Placeholder>::new(), NestedSchema::new()).unwrap_err();
/// assert_eq!(err, ConfigurationError::MissingPlaceholders);
///
/// let err = parameterize(Placeholder::string("x"), key!["not-a-mapping"]).unwrap_err();
/// assert_eq!(err, ConfigurationError::InvalidNestedSchema);
/// ```
pub fn parameterize(
    placeholders: impl IntoPlaceholders,
    schema: impl Into<SchemaNode>,
) -> Result<ParameterizedNode, ConfigurationError> {
    let placeholders = placeholders.into_placeholders();
    if placeholders.is_empty() {
        return Err(ConfigurationError::MissingPlaceholders);
    }

    match schema.into() {
        SchemaNode::Nested(schema) => Ok(ParameterizedNode {
            placeholders,
            schema: Arc::new(schema),
        }),
        _ => Err(ConfigurationError::InvalidNestedSchema),
    }
}
