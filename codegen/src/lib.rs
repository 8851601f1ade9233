//! Typed Rust key builders generated from key schemas.
//!
//! The runtime compiler in `keyschema-core` checks arguments when a key is
//! built. This crate turns the same schema into Rust source where every key
//! is a method whose parameters are exactly its placeholders, so argument
//! shape is checked by the compiler of the consuming crate:
//!
//! ```text
//! let keys = Keys::new();
//! keys.posts("p9").comments(2.0);   // "posts:p9:comments:2"
//! ```

mod error;
mod generate;
mod ident;

pub use error::CodegenError;
pub use generate::{CodegenOptions, DEFAULT_ROOT_NAME, generate_rust};
