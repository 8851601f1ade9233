//! Key layout listing and fingerprinting.
//!
//! A [`KeyLayout`] describes every key a document can produce, without
//! arguments. Its fingerprint changes exactly when a rendered template
//! changes, so a deployment can tell that previously written keys are no
//! longer addressable.

use keyschema_core::{NestedSchema, Primitive, key_templates};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One argument a key needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutArgument {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: Primitive,
    /// Supplied to an enclosing parameterization rather than the key itself.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inherited: bool,
}

/// One key of a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    /// Dotted mapping keys, e.g. `posts.comments`.
    pub path: String,
    /// Rendered template, e.g. `posts:{postId}:comments:{page}`.
    pub template: String,
    #[serde(default)]
    pub arguments: Vec<LayoutArgument>,
}

/// Every key of a schema with its template and arguments.
///
/// # Examples
///
/// ```
/// use keyschema_core::*;
/// use keyschema_document::KeyLayout;
///
/// let schema = NestedSchema::new().key("user", key!["user", Placeholder::string("id")]);
/// let layout = KeyLayout::new(&schema, ":");
///
/// assert_eq!(layout.get("user").unwrap().template, "user:{id}");
/// assert_eq!(layout.fingerprint.len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyLayout {
    pub separator: String,
    pub entries: Vec<LayoutEntry>,
    /// SHA-256 over the separator and the sorted `path\ttemplate` lines.
    pub fingerprint: String,
}

impl KeyLayout {
    /// Lists `schema` as rendered with `separator`.
    pub fn new(schema: &NestedSchema, separator: &str) -> Self {
        let entries: Vec<LayoutEntry> = key_templates(schema)
            .iter()
            .map(|template| {
                let inherited = template.inherited.iter().map(|p| (p, true));
                let local = template.local.iter().map(|p| (p, false));
                LayoutEntry {
                    path: template.dotted_path(),
                    template: template.render(separator),
                    arguments: inherited
                        .chain(local)
                        .map(|(p, inherited)| LayoutArgument {
                            name: p.name().to_string(),
                            value_type: p.value_type(),
                            inherited,
                        })
                        .collect(),
                }
            })
            .collect();
        let fingerprint = fingerprint(separator, &entries);

        Self {
            separator: separator.to_string(),
            entries,
            fingerprint,
        }
    }

    /// Finds an entry by dotted path.
    ///
    /// Mapping keys are joined with `.` unescaped, so a key that itself
    /// contains `.` shares its dotted path with a nested key of the same
    /// spelling. The first match in traversal order wins.
    pub fn get(&self, path: &str) -> Option<&LayoutEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plain-text table: one line per key, then the fingerprint.
    pub fn to_table(&self) -> String {
        let width = self
            .entries
            .iter()
            .map(|e| e.path.len())
            .max()
            .unwrap_or(0)
            .max("PATH".len());

        let mut out = String::new();
        out.push_str(&format!("{:<width$}  TEMPLATE  ARGUMENTS\n", "PATH"));
        for entry in &self.entries {
            let arguments = entry
                .arguments
                .iter()
                .map(|a| format!("{}: {}", a.name, a.value_type))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!(
                "{:<width$}  {}  {}\n",
                entry.path,
                entry.template,
                if arguments.is_empty() { "-" } else { &arguments }
            ));
        }
        out.push_str(&format!(
            "\n{} keys  separator {:?}  fingerprint {}\n",
            self.entries.len(),
            self.separator,
            self.fingerprint
        ));
        out
    }
}

fn fingerprint(separator: &str, entries: &[LayoutEntry]) -> String {
    let mut lines: Vec<String> = entries
        .iter()
        .map(|e| format!("{}\t{}", e.path, e.template))
        .collect();
    lines.sort();

    let mut hasher = Sha256::new();
    hasher.update(separator.as_bytes());
    hasher.update(b"\n");
    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use keyschema_core::{Placeholder, key, parameterize};

    use super::*;

    fn schema() -> NestedSchema {
        NestedSchema::new()
            .key("user", key!["user", Placeholder::string("id")])
            .parameterized(
                "posts",
                parameterize(
                    Placeholder::string("postId"),
                    NestedSchema::new().key("comments", key!["comments", Placeholder::number("page")]),
                )
                .unwrap(),
            )
    }

    #[test]
    fn test_layout_lists_arguments_outermost_first() {
        let layout = KeyLayout::new(&schema(), ":");
        let comments = layout.get("posts.comments").unwrap();
        assert_eq!(comments.template, "posts:{postId}:comments:{page}");
        assert_eq!(
            comments.arguments,
            vec![
                LayoutArgument {
                    name: "postId".into(),
                    value_type: Primitive::String,
                    inherited: true,
                },
                LayoutArgument {
                    name: "page".into(),
                    value_type: Primitive::Number,
                    inherited: false,
                },
            ]
        );
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = KeyLayout::new(&schema(), ":");
        let b = KeyLayout::new(&schema(), ":");
        assert_eq!(a.fingerprint, b.fingerprint);
        assert!(a.fingerprint.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fingerprint_tracks_separator_and_templates() {
        let base = KeyLayout::new(&schema(), ":");
        assert_ne!(base.fingerprint, KeyLayout::new(&schema(), "/").fingerprint);

        let changed = schema().key("user", key!["member", Placeholder::string("id")]);
        assert_ne!(base.fingerprint, KeyLayout::new(&changed, ":").fingerprint);
    }

    #[test]
    fn test_fingerprint_ignores_placeholder_types() {
        let typed = NestedSchema::new().key("k", key!["k", Placeholder::number("n")]);
        let other = NestedSchema::new().key("k", key!["k", Placeholder::string("n")]);
        assert_eq!(
            KeyLayout::new(&typed, ":").fingerprint,
            KeyLayout::new(&other, ":").fingerprint
        );
    }

    #[test]
    fn test_literal_braces_do_not_collide_with_placeholders() {
        let literal = NestedSchema::new().key("user", key!["user", "{id}"]);
        let slot = NestedSchema::new().key("user", key!["user", Placeholder::string("id")]);
        let a = KeyLayout::new(&literal, ":");
        let b = KeyLayout::new(&slot, ":");
        assert_eq!(a.get("user").unwrap().template, "user:{{id}}");
        assert_ne!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn test_table_mentions_every_key() {
        let table = KeyLayout::new(&schema(), ":").to_table();
        assert!(table.contains("user:{id}"));
        assert!(table.contains("posts.comments"));
        assert!(table.contains("postId: string, page: number"));
        assert!(table.contains("2 keys"));
    }

    #[test]
    fn test_layout_serializes_type_field() {
        let layout = KeyLayout::new(&schema(), ":");
        let value = serde_json::to_value(&layout).unwrap();
        assert_eq!(value["entries"][1]["arguments"][0]["type"], "string");
        assert_eq!(value["entries"][1]["arguments"][0]["name"], "id");
    }
}
