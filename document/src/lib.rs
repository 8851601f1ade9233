//! YAML/JSON key schema documents.
//!
//! This crate loads a key schema and its builder options from a document
//! file, writes documents back out, and describes the resulting key layout
//! together with a fingerprint that changes whenever a rendered key template
//! changes.
//!
//! # Quick start
//!
//! ```no_run
//! use keyschema_core::args;
//! use keyschema_document::KeySchemaDocument;
//!
//! let doc = KeySchemaDocument::load("keys.yaml").unwrap();
//! let keys = doc.compile();
//! let key = keys.resolve_key(&["posts", "comments"], &args! { "postId" => "p1", "page" => 2 });
//!
//! // Detect layout changes between deployments.
//! println!("{}", doc.layout().fingerprint);
//! ```

mod document;
mod error;
mod layout;
mod loader;

pub use document::{DocumentFormat, KeySchemaDocument};
pub use error::{DocumentError, Result};
pub use layout::{KeyLayout, LayoutArgument, LayoutEntry};
pub use loader::{PARAMETERIZE_FIELD, SCHEMA_FIELD, schema_from_value, schema_to_value};
