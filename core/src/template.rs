//! Static listing of every key a schema can produce.
//!
//! Unlike [`KeyBuilder::compile`](crate::KeyBuilder::compile), this walk
//! needs no arguments: placeholders of enclosing parameterizations stay
//! symbolic, so each leaf is described by a template such as
//! `posts:{postId}:comments:{page}`.

use crate::types::{KeyPart, NestedSchema, Placeholder, SchemaNode};

/// One leaf of a schema, described without arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTemplate {
    /// Mapping keys from the root down to the key definition.
    pub path: Vec<String>,
    /// Placeholders of enclosing parameterizations, outermost first.
    pub inherited: Vec<Placeholder>,
    /// Placeholders of the key definition itself, in path order.
    pub local: Vec<Placeholder>,
    /// Full path template (prefix, then the definition's parts).
    pub parts: Vec<KeyPart>,
}

impl KeyTemplate {
    /// Mapping keys joined with `.`.
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }

    /// Every placeholder needed to reach and build this key.
    pub fn arguments(&self) -> impl Iterator<Item = &Placeholder> {
        self.inherited.iter().chain(self.local.iter())
    }

    /// Renders the template, showing placeholders as `{name}`.
    ///
    /// Braces inside literal segments are doubled, so a literal `{id}`
    /// renders as `{{id}}` and never reads as a placeholder.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyschema_core::*;
    ///
    /// let schema = NestedSchema::new().parameterized(
    ///     "posts",
    ///     parameterize(
    ///         Placeholder::string("postId"),
    ///         NestedSchema::new().key("comments", key!["comments", Placeholder::number("page")]),
    ///     )
    ///     .unwrap(),
    /// );
    /// let templates = key_templates(&schema);
    /// assert_eq!(templates[0].render(":"), "posts:{postId}:comments:{page}");
    /// assert_eq!(templates[0].dotted_path(), "posts.comments");
    /// ```
    pub fn render(&self, separator: &str) -> String {
        render_parts(&self.parts, separator)
    }
}

/// Renders key parts the way [`KeyTemplate::render`] does.
pub fn render_parts<'a>(parts: impl IntoIterator<Item = &'a KeyPart>, separator: &str) -> String {
    parts
        .into_iter()
        .map(|part| match part {
            KeyPart::Literal(text) => text.replace('{', "{{").replace('}', "}}"),
            KeyPart::Placeholder(p) => format!("{{{}}}", p.name()),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// Lists every key definition reachable in `schema`, in traversal order.
///
/// Absent entries are left out, matching what the compiler produces.
pub fn key_templates(schema: &NestedSchema) -> Vec<KeyTemplate> {
    let mut out = Vec::new();
    collect(
        schema,
        &mut Vec::new(),
        &mut Vec::new(),
        &mut Vec::new(),
        &mut out,
    );
    out
}

fn collect(
    schema: &NestedSchema,
    path: &mut Vec<String>,
    prefix: &mut Vec<KeyPart>,
    inherited: &mut Vec<Placeholder>,
    out: &mut Vec<KeyTemplate>,
) {
    for (key, node) in schema.iter() {
        let Some(node) = node else {
            continue;
        };
        path.push(key.to_string());

        match node {
            SchemaNode::Key(def) => out.push(KeyTemplate {
                path: path.clone(),
                inherited: inherited.clone(),
                local: def.placeholders().cloned().collect(),
                parts: prefix.iter().chain(def.parts()).cloned().collect(),
            }),
            SchemaNode::Nested(nested) => {
                prefix.push(KeyPart::Literal(key.to_string()));
                collect(nested, path, prefix, inherited, out);
                prefix.pop();
            }
            SchemaNode::Parameterized(param) => {
                let prefix_len = prefix.len();
                let inherited_len = inherited.len();
                prefix.push(KeyPart::Literal(key.to_string()));
                prefix.extend(param.placeholders().iter().map(KeyPart::from));
                inherited.extend(param.placeholders().iter().cloned());
                collect(param.schema(), path, prefix, inherited, out);
                prefix.truncate(prefix_len);
                inherited.truncate(inherited_len);
            }
        }

        path.pop();
    }
}
