//! Conversion between untyped document values and [`NestedSchema`].
//!
//! Shapes are recognized per entry:
//!
//! | Value | Entry |
//! |-------|-------|
//! | `null` | absent (kept, compiled to nothing) |
//! | array of literals / placeholder objects | key definition |
//! | object with `$parameterize` | parameterized node |
//! | any other object | nested schema |
//! | anything else | unrecognized, skipped |
//!
//! A placeholder object has exactly one field, its kind, holding its name:
//! `{ "number": "page" }`.

use keyschema_core::{
    KeyDefinition, KeyPart, NestedSchema, ParameterizedNode, Placeholder, Primitive, SchemaNode,
    development_mode, parameterize,
};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{DocumentError, Result};

/// Field naming the placeholders of a parameterized entry.
pub const PARAMETERIZE_FIELD: &str = "$parameterize";
/// Field holding the schema of a parameterized entry.
pub const SCHEMA_FIELD: &str = "$schema";

enum Parsed {
    Node(SchemaNode),
    Absent,
    Unrecognized(&'static str),
}

/// Builds a schema from a document's `keys` value.
///
/// # Errors
///
/// - [`DocumentError::NotAMapping`] if `value` is not an object.
/// - [`DocumentError::Configuration`] if a parameterized entry has no
///   placeholders or a `$schema` that is not a mapping.
/// - [`DocumentError::InvalidPlaceholder`] for a malformed `$parameterize`
///   element.
///
/// Unrecognized entries are skipped, never fatal.
///
/// # Examples
///
/// ```
/// use keyschema_document::schema_from_value;
///
/// let value = serde_json::json!({
///     "user": ["user", { "string": "id" }],
///     "retired": null,
///     "bogus": 42
/// });
/// let schema = schema_from_value(&value).unwrap();
/// assert!(schema.get("user").is_some());
/// assert!(schema.contains("retired"));
/// assert!(!schema.contains("bogus"));
/// ```
pub fn schema_from_value(value: &Value) -> Result<NestedSchema> {
    let Value::Object(map) = value else {
        return Err(DocumentError::NotAMapping("keys".to_string()));
    };
    parse_mapping(map, &mut Vec::new())
}

fn parse_mapping(map: &Map<String, Value>, path: &mut Vec<String>) -> Result<NestedSchema> {
    let mut schema = NestedSchema::new();

    for (key, value) in map {
        path.push(key.clone());
        match parse_entry(value, path)? {
            Parsed::Node(node) => schema.insert(key.clone(), Some(node)),
            Parsed::Absent => schema.insert(key.clone(), None),
            Parsed::Unrecognized(found) => {
                if development_mode() {
                    warn!(path = %path.join("."), found = found, "Skipping unrecognized schema entry");
                }
            }
        }
        path.pop();
    }

    Ok(schema)
}

fn parse_entry(value: &Value, path: &mut Vec<String>) -> Result<Parsed> {
    let parsed = match value {
        Value::Null => Parsed::Absent,
        Value::Array(items) => match parse_key_definition(items) {
            Some(def) => Parsed::Node(SchemaNode::Key(def)),
            None => Parsed::Unrecognized("array with a non-segment element"),
        },
        Value::Object(map) if map.contains_key(PARAMETERIZE_FIELD) => {
            Parsed::Node(SchemaNode::Parameterized(parse_parameterized(map, path)?))
        }
        Value::Object(map) => Parsed::Node(SchemaNode::Nested(parse_mapping(map, path)?)),
        Value::Bool(_) => Parsed::Unrecognized("boolean"),
        Value::Number(_) => Parsed::Unrecognized("number"),
        Value::String(_) => Parsed::Unrecognized("string"),
    };
    Ok(parsed)
}

fn parse_key_definition(items: &[Value]) -> Option<KeyDefinition> {
    items
        .iter()
        .map(|item| match item {
            Value::String(text) => Some(KeyPart::Literal(text.clone())),
            Value::Object(map) => parse_placeholder(map).map(KeyPart::Placeholder),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(KeyDefinition::new)
}

fn parse_placeholder(map: &Map<String, Value>) -> Option<Placeholder> {
    if map.len() != 1 {
        return None;
    }
    let (tag, name) = map.iter().next()?;
    let kind = Primitive::from_tag(tag)?;
    Some(Placeholder::new(name.as_str()?, kind))
}

fn parse_parameterized(
    map: &Map<String, Value>,
    path: &mut Vec<String>,
) -> Result<ParameterizedNode> {
    for field in map.keys() {
        if field != PARAMETERIZE_FIELD && field != SCHEMA_FIELD {
            warn!(path = %path.join("."), field = %field, "Ignoring unknown field on parameterized entry");
        }
    }

    let placeholders = match map.get(PARAMETERIZE_FIELD) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| placeholder_at(item, path))
            .collect::<Result<Vec<_>>>()?,
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![placeholder_at(single, path)?],
    };

    let entry_path = path.join(".");
    let configuration_error = |source| DocumentError::Configuration {
        path: entry_path,
        source,
    };

    match map.get(SCHEMA_FIELD) {
        Some(Value::Object(inner)) => {
            let schema = parse_mapping(inner, path)?;
            parameterize(placeholders, schema).map_err(configuration_error)
        }
        // Not a mapping: let `parameterize` pick the error so the
        // placeholder check keeps precedence.
        _ => parameterize(placeholders, KeyDefinition::default()).map_err(configuration_error),
    }
}

fn placeholder_at(value: &Value, path: &[String]) -> Result<Placeholder> {
    match value {
        Value::Object(map) => parse_placeholder(map),
        _ => None,
    }
    .ok_or_else(|| DocumentError::InvalidPlaceholder {
        path: path.join("."),
        found: value.to_string(),
    })
}

/// Renders a schema back into document form.
///
/// Absent entries become `null`, so [`schema_from_value`] restores the same
/// schema.
pub fn schema_to_value(schema: &NestedSchema) -> Value {
    let mut map = Map::new();
    for (key, node) in schema.iter() {
        let value = match node {
            None => Value::Null,
            Some(node) => node_to_value(node),
        };
        map.insert(key.to_string(), value);
    }
    Value::Object(map)
}

fn node_to_value(node: &SchemaNode) -> Value {
    match node {
        SchemaNode::Key(def) => Value::Array(def.parts().iter().map(part_to_value).collect()),
        SchemaNode::Nested(nested) => schema_to_value(nested),
        SchemaNode::Parameterized(param) => {
            let mut map = Map::new();
            map.insert(
                PARAMETERIZE_FIELD.to_string(),
                Value::Array(param.placeholders().iter().map(placeholder_to_value).collect()),
            );
            map.insert(SCHEMA_FIELD.to_string(), schema_to_value(param.schema()));
            Value::Object(map)
        }
    }
}

fn part_to_value(part: &KeyPart) -> Value {
    match part {
        KeyPart::Literal(text) => Value::String(text.clone()),
        KeyPart::Placeholder(p) => placeholder_to_value(p),
    }
}

fn placeholder_to_value(p: &Placeholder) -> Value {
    let mut map = Map::new();
    map.insert(
        p.value_type().as_str().to_string(),
        Value::String(p.name().to_string()),
    );
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use keyschema_core::{ConfigurationError, key};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parses_every_entry_kind() {
        let value = json!({
            "user": ["user", { "string": "id" }],
            "config": { "app": ["config"] },
            "posts": {
                "$parameterize": { "string": "postId" },
                "$schema": { "comments": ["comments", { "number": "page" }] }
            },
            "retired": null
        });
        let schema = schema_from_value(&value).unwrap();

        assert_eq!(
            schema.get("user"),
            Some(&SchemaNode::Key(key!["user", Placeholder::string("id")]))
        );
        assert!(matches!(schema.get("config"), Some(SchemaNode::Nested(_))));
        let Some(SchemaNode::Parameterized(posts)) = schema.get("posts") else {
            panic!("posts should be parameterized");
        };
        assert_eq!(posts.placeholders(), &[Placeholder::string("postId")]);
        assert!(schema.contains("retired"));
        assert!(schema.get("retired").is_none());
    }

    #[test]
    fn test_skips_unrecognized_shapes() {
        let value = json!({
            "flag": true,
            "count": 3,
            "bare": "text",
            "mixed": ["a", 1],
            "badPlaceholder": ["a", { "date": "d" }],
            "ok": ["ok"]
        });
        let schema = schema_from_value(&value).unwrap();
        assert_eq!(schema.len(), 1);
        assert!(schema.get("ok").is_some());
    }

    #[test]
    fn test_rejects_non_mapping_root() {
        let err = schema_from_value(&json!(["a"])).unwrap_err();
        assert!(matches!(err, DocumentError::NotAMapping(_)));
    }

    #[test]
    fn test_empty_parameterize_is_configuration_error() {
        let value = json!({
            "outer": { "p": { "$parameterize": [], "$schema": { "a": ["a"] } } }
        });
        let err = schema_from_value(&value).unwrap_err();
        match err {
            DocumentError::Configuration { path, source } => {
                assert_eq!(path, "outer.p");
                assert_eq!(source, ConfigurationError::MissingPlaceholders);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_mapping_schema_is_configuration_error() {
        for schema in [json!("not-an-object"), json!(["a"]), json!(null)] {
            let value = json!({ "p": { "$parameterize": { "string": "x" }, "$schema": schema } });
            let err = schema_from_value(&value).unwrap_err();
            assert!(matches!(
                err,
                DocumentError::Configuration {
                    source: ConfigurationError::InvalidNestedSchema,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_placeholder_check_runs_before_schema_check() {
        let value = json!({ "p": { "$parameterize": [], "$schema": 5 } });
        let err = schema_from_value(&value).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Configuration {
                source: ConfigurationError::MissingPlaceholders,
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_parameterize_element_is_fatal() {
        let value = json!({ "p": { "$parameterize": ["id"], "$schema": {} } });
        let err = schema_from_value(&value).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidPlaceholder { .. }));
    }

    #[test]
    fn test_value_round_trip_keeps_absent_entries() {
        let value = json!({
            "a": ["a", { "boolean": "on" }],
            "gone": null,
            "p": {
                "$parameterize": [{ "string": "x" }, { "number": "y" }],
                "$schema": { "leaf": ["leaf"] }
            }
        });
        let schema = schema_from_value(&value).unwrap();
        assert_eq!(schema_to_value(&schema), value);
    }
}
