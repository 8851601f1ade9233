use std::collections::HashSet;

use keyschema_core::{
    DEFAULT_SEPARATOR, KeyPart, NestedSchema, Placeholder, Primitive, SchemaNode, render_parts,
};
use tracing::debug;

use crate::error::CodegenError;
use crate::ident::{pascal_case, snake_case};

/// Name of the generated root struct unless configured otherwise.
pub const DEFAULT_ROOT_NAME: &str = "Keys";

/// Generation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Root struct name; converted to `PascalCase`.
    pub root_name: String,
    /// Separator baked into the generated `SEPARATOR` constant.
    pub separator: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_NAME.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl CodegenOptions {
    pub fn with_root_name(mut self, root_name: impl Into<String>) -> Self {
        self.root_name = root_name.into();
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

const HELPERS: &str = r#"
/// Numbers accepted by generated key methods.
pub trait NumberArg {
    fn segment(self) -> String;
}

macro_rules! impl_integer_arg {
    ($($ty:ty),*) => {
        $(
            impl NumberArg for $ty {
                fn segment(self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_integer_arg!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl NumberArg for f64 {
    fn segment(self) -> String {
        self::number_segment(self)
    }
}

impl NumberArg for f32 {
    fn segment(self) -> String {
        self::number_segment(self.to_string().parse().unwrap_or(f64::from(self)))
    }
}

#[allow(dead_code)]
fn number_segment(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

#[allow(dead_code)]
fn join_key(prefix: &[String], parts: &[String]) -> String {
    let mut segments: Vec<&str> = prefix.iter().map(String::as_str).collect();
    segments.extend(parts.iter().map(String::as_str));
    segments.join(SEPARATOR)
}

#[allow(dead_code)]
fn extend_prefix(prefix: &[String], parts: &[String]) -> Vec<String> {
    prefix.iter().chain(parts).cloned().collect()
}
"#;

/// Generates a self-contained Rust module with one typed method per key.
///
/// Every generated method takes exactly the arguments its key needs, so a
/// missing argument is a compile error in the calling crate instead of a
/// [`MissingArgumentError`](keyschema_core::MissingArgumentError) at run
/// time. The produced keys are identical to those of the runtime compiler
/// with the same separator.
///
/// # Errors
///
/// Returns [`CodegenError`] when a schema name cannot become an identifier
/// or two names collide after case conversion.
///
/// # Examples
///
/// ```
/// use keyschema_codegen::{CodegenOptions, generate_rust};
/// use keyschema_core::*;
///
/// let schema = NestedSchema::new().key("user", key!["user", Placeholder::string("id")]);
/// let code = generate_rust(&schema, &CodegenOptions::default()).unwrap();
///
/// assert!(code.contains("pub struct Keys {"));
/// assert!(code.contains("pub fn user(&self, id: &str) -> String {"));
/// ```
pub fn generate_rust(
    schema: &NestedSchema,
    options: &CodegenOptions,
) -> Result<String, CodegenError> {
    let root = pascal_case(&options.root_name)
        .ok_or_else(|| CodegenError::InvalidIdentifier(options.root_name.clone()))?;

    let mut emitter = Emitter {
        separator: &options.separator,
        structs: Vec::new(),
        struct_names: HashSet::new(),
    };
    emitter.level(schema, &root, true, &mut Vec::new(), &mut Vec::new())?;
    debug!(root = %root, structs = emitter.structs.len(), "Generated key builders");

    let mut out = String::new();
    out.push_str("// Generated by keyschema-codegen. Do not edit.\n\n");
    out.push_str("/// Separator joining key segments.\n");
    out.push_str(&format!(
        "pub const SEPARATOR: &str = {:?};\n",
        options.separator
    ));
    out.push_str(HELPERS);
    for block in &emitter.structs {
        out.push('\n');
        out.push_str(block);
    }
    Ok(out)
}

struct Emitter<'a> {
    separator: &'a str,
    structs: Vec<String>,
    struct_names: HashSet<String>,
}

impl Emitter<'_> {
    fn level(
        &mut self,
        schema: &NestedSchema,
        name: &str,
        is_root: bool,
        path: &mut Vec<String>,
        template: &mut Vec<KeyPart>,
    ) -> Result<(), CodegenError> {
        if !self.struct_names.insert(name.to_string()) {
            return Err(CodegenError::DuplicateStruct(name.to_string()));
        }
        // Parent first in the output, so reserve the slot before recursing.
        let slot = self.structs.len();
        self.structs.push(String::new());

        let mut members = HashSet::new();
        if is_root {
            members.insert("new".to_string());
        }
        let mut methods = String::new();

        for (key, node) in schema.iter() {
            let Some(node) = node else {
                continue;
            };
            path.push(key.to_string());

            let method = snake_case(key).ok_or_else(|| CodegenError::InvalidIdentifier(key.to_string()))?;
            if !members.insert(method.clone()) {
                return Err(CodegenError::DuplicateMember {
                    structure: name.to_string(),
                    name: method,
                });
            }

            match node {
                SchemaNode::Key(def) => {
                    let params = parameters(def.placeholders(), path)?;
                    let doc = render(template.iter().chain(def.parts()), self.separator);
                    methods.push_str(&format!(
                        "\n    /// `{doc}`\n    pub fn {method}(&self{params}) -> String {{\n        self::join_key(&self.prefix, &[{parts}])\n    }}\n",
                        parts = segments(def.parts())?,
                    ));
                }
                SchemaNode::Nested(nested) => {
                    let child = child_name(name, key)?;
                    let parts = segments(&[KeyPart::Literal(key.to_string())])?;
                    methods.push_str(&format!(
                        "\n    pub fn {method}(&self) -> {child} {{\n        {child} {{\n            prefix: self::extend_prefix(&self.prefix, &[{parts}]),\n        }}\n    }}\n",
                    ));

                    template.push(KeyPart::Literal(key.to_string()));
                    self.level(nested, &child, false, path, template)?;
                    template.pop();
                }
                SchemaNode::Parameterized(param) => {
                    let child = child_name(name, key)?;
                    let params = parameters(param.placeholders().iter(), path)?;
                    let gate: Vec<KeyPart> = std::iter::once(KeyPart::Literal(key.to_string()))
                        .chain(param.placeholders().iter().map(KeyPart::from))
                        .collect();
                    methods.push_str(&format!(
                        "\n    pub fn {method}(&self{params}) -> {child} {{\n        {child} {{\n            prefix: self::extend_prefix(&self.prefix, &[{parts}]),\n        }}\n    }}\n",
                        parts = segments(&gate)?,
                    ));

                    let len = template.len();
                    template.extend(gate);
                    self.level(param.schema(), &child, false, path, template)?;
                    template.truncate(len);
                }
            }

            path.pop();
        }

        let doc = if path.is_empty() {
            "Root of the key tree.".to_string()
        } else {
            format!("Keys under `{}`.", path.join(".").escape_debug())
        };
        let mut block = format!(
            "/// {doc}\n#[derive(Debug, Clone, PartialEq, Eq)]\npub struct {name} {{\n    prefix: Vec<String>,\n}}\n\nimpl {name} {{\n"
        );
        if is_root {
            block.push_str("    pub const fn new() -> Self {\n        Self { prefix: Vec::new() }\n    }\n");
        }
        block.push_str(&methods);
        block.push_str("}\n");
        self.structs[slot] = block;
        Ok(())
    }
}

fn child_name(parent: &str, key: &str) -> Result<String, CodegenError> {
    let suffix = pascal_case(key).ok_or_else(|| CodegenError::InvalidIdentifier(key.to_string()))?;
    Ok(format!("{parent}{}", suffix.trim_end_matches('_')))
}

fn argument_name(p: &Placeholder) -> Result<String, CodegenError> {
    snake_case(p.name()).ok_or_else(|| CodegenError::InvalidIdentifier(p.name().to_string()))
}

fn parameters<'a>(
    placeholders: impl Iterator<Item = &'a Placeholder>,
    path: &[String],
) -> Result<String, CodegenError> {
    let mut seen = HashSet::new();
    let mut out = String::new();
    for p in placeholders {
        let ident = argument_name(p)?;
        if !seen.insert(ident.clone()) {
            return Err(CodegenError::DuplicateArgument {
                method: path.join("."),
                name: ident,
            });
        }
        let ty = match p.value_type() {
            Primitive::String => "&str",
            Primitive::Number => "impl self::NumberArg",
            Primitive::Boolean => "bool",
        };
        out.push_str(&format!(", {ident}: {ty}"));
    }
    Ok(out)
}

fn segments(parts: &[KeyPart]) -> Result<String, CodegenError> {
    let exprs = parts
        .iter()
        .map(|part| match part {
            KeyPart::Literal(text) => Ok(format!("{text:?}.to_string()")),
            KeyPart::Placeholder(p) => {
                let ident = argument_name(p)?;
                Ok(match p.value_type() {
                    Primitive::Number => format!("self::NumberArg::segment({ident})"),
                    Primitive::String | Primitive::Boolean => format!("{ident}.to_string()"),
                })
            }
        })
        .collect::<Result<Vec<_>, CodegenError>>()?;
    Ok(exprs.join(", "))
}

fn render<'a>(parts: impl Iterator<Item = &'a KeyPart>, separator: &str) -> String {
    render_parts(parts, separator).escape_debug().to_string()
}
