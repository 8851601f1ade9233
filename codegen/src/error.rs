use thiserror::Error;

/// Schemas that cannot be expressed as generated Rust.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// A name has no characters usable in an identifier.
    #[error("`{0}` does not produce a Rust identifier")]
    InvalidIdentifier(String),

    /// Two parameters of one generated method map to the same identifier.
    #[error("arguments of `{method}` collide on `{name}`")]
    DuplicateArgument {
        /// Dotted schema path of the method.
        method: String,
        name: String,
    },

    /// Two members of one generated struct map to the same identifier.
    #[error("members of `{structure}` collide on `{name}`")]
    DuplicateMember { structure: String, name: String },

    /// Two schema levels map to the same struct name.
    #[error("struct `{0}` would be generated twice")]
    DuplicateStruct(String),
}
