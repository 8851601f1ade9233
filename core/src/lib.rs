//! Key schema model and compiler.
//!
//! A key schema describes a tree of delimited string identifiers (cache or
//! storage keys) and compiles into a mirrored tree of key builders:
//!
//! - [`Placeholder`]: a named, typed slot (`string`, `number`, `boolean`).
//! - [`KeyDefinition`]: ordered literals and placeholders; one key builder.
//! - [`ParameterizedNode`]: placeholders gating a sub-schema, built with
//!   [`parameterize`].
//! - [`NestedSchema`]: a mapping whose keys become path segments.
//!
//! [`KeyBuilder`] binds a separator and compiles a schema into a
//! [`CompiledTree`] of [`KeyFn`] leaves and [`ParameterizeFn`] gates. Missing
//! arguments are reported with [`MissingArgumentError`]; malformed
//! parameterizations with [`ConfigurationError`].
//!
//! [`key_templates`] lists every reachable key without arguments and
//! [`validate_schema`] lints placeholder-name contracts the compiler does not
//! enforce.
//!
//! # Example
//!
//! ```
//! use keyschema_core::*;
//!
//! let schema = NestedSchema::new()
//!     .key("user", key!["user", Placeholder::string("id")])
//!     .key("appConfig", key!["config"])
//!     .parameterized(
//!         "posts",
//!         parameterize(
//!             Placeholder::string("postId"),
//!             NestedSchema::new().key("comments", key!["comments", Placeholder::number("page")]),
//!         )
//!         .unwrap(),
//!     );
//!
//! let keys = create_key_builder(BuilderConfig::default()).compile(&schema);
//!
//! assert_eq!(keys.key("user").unwrap().build(&args! { "id" => "42" }).unwrap(), "user:42");
//! assert_eq!(keys.key("appConfig").unwrap().build_static().unwrap(), "config");
//!
//! let post = keys.parameterized("posts").unwrap().apply(&args! { "postId" => "p9" }).unwrap();
//! let comments = post.key("comments").unwrap().build(&args! { "page" => 2 }).unwrap();
//! assert_eq!(comments, "posts:p9:comments:2");
//! ```

mod compile;
mod error;
mod template;
mod types;
mod validate;
mod value;

pub use compile::{
    BuilderConfig, CompiledEntry, CompiledTree, DEFAULT_SEPARATOR, KeyBuilder, KeyFn,
    ParameterizeFn, create_key_builder, development_mode,
};
pub use error::{ConfigurationError, MissingArgumentError, ResolveError};
pub use template::{KeyTemplate, key_templates, render_parts};
pub use types::*;
pub use validate::{ValidationError, validate_schema};
pub use value::{Args, Value, number_segment};
