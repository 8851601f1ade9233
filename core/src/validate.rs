//! Opt-in schema lint.
//!
//! The compiler trusts the schema author: placeholder names are never checked
//! during construction or compilation. [`validate_schema`] reports the
//! contract violations that would otherwise surface as confusing keys, such
//! as two placeholders sharing a name within one key's argument mapping.
//!
//! # Examples
//!
//! ```
//! use keyschema_core::*;
//!
//! let schema = NestedSchema::new().key("user", key!["user", Placeholder::string("id")]);
//! assert!(validate_schema(&schema).is_empty());
//!
//! // Both placeholders would read the same `id` argument.
//! let bad = NestedSchema::new().key(
//!     "pair",
//!     key![Placeholder::string("id"), Placeholder::number("id")],
//! );
//! assert!(!validate_schema(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::types::{NestedSchema, Placeholder, SchemaNode};

/// Schema lint findings.
///
/// Paths are the dotted mapping keys leading to the offending entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A placeholder has an empty name.
    #[error("empty placeholder name at `{0}`")]
    EmptyPlaceholderName(String),
    /// Two placeholders that apply to the same key share a name.
    #[error("duplicate placeholder `{name}` at `{path}`")]
    DuplicatePlaceholder {
        /// The shared name.
        name: String,
        /// Where the second occurrence was found.
        path: String,
    },
    /// A key definition has no parts.
    #[error("key definition at `{0}` has no parts")]
    EmptyKeyDefinition(String),
}

/// Lints a schema, returning every finding in traversal order.
pub fn validate_schema(schema: &NestedSchema) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut path = Vec::new();
    validate_level(schema, &mut path, &[], &mut errors);
    errors
}

fn validate_level(
    schema: &NestedSchema,
    path: &mut Vec<String>,
    inherited: &[&Placeholder],
    errors: &mut Vec<ValidationError>,
) {
    for (key, node) in schema.iter() {
        let Some(node) = node else {
            continue;
        };
        path.push(key.to_string());

        match node {
            SchemaNode::Key(def) => {
                if def.parts().is_empty() {
                    errors.push(ValidationError::EmptyKeyDefinition(path.join(".")));
                }
                check_placeholders(inherited, def.placeholders(), path, errors);
            }
            SchemaNode::Nested(nested) => validate_level(nested, path, inherited, errors),
            SchemaNode::Parameterized(param) => {
                check_placeholders(inherited, param.placeholders().iter(), path, errors);
                let scope: Vec<&Placeholder> = inherited
                    .iter()
                    .copied()
                    .chain(param.placeholders().iter())
                    .collect();
                validate_level(param.schema(), path, &scope, errors);
            }
        }

        path.pop();
    }
}

fn check_placeholders<'a>(
    inherited: &[&Placeholder],
    own: impl Iterator<Item = &'a Placeholder>,
    path: &[String],
    errors: &mut Vec<ValidationError>,
) {
    let mut seen: HashSet<&str> = inherited.iter().map(|p| p.name()).collect();

    for p in own {
        if p.name().is_empty() {
            errors.push(ValidationError::EmptyPlaceholderName(path.join(".")));
            continue;
        }
        if !seen.insert(p.name()) {
            errors.push(ValidationError::DuplicatePlaceholder {
                name: p.name().to_string(),
                path: path.join("."),
            });
        }
    }
}
