//! Argument values and their text coercion.
//!
//! Key builders take an [`Args`] mapping from placeholder name to [`Value`].
//! A name mapped to `None` is present-but-null and counts as missing.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Primitive;

/// A primitive argument value.
///
/// # Examples
///
/// ```
/// use keyschema_core::Value;
///
/// assert_eq!(Value::from("abc").to_segment(), "abc");
/// assert_eq!(Value::from(42).to_segment(), "42");
/// assert_eq!(Value::from(u64::MAX).to_segment(), "18446744073709551615");
/// assert_eq!(Value::from(1.5).to_segment(), "1.5");
/// assert_eq!(Value::from(true).to_segment(), "true");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// Signed integer, kept exact.
    Int(i64),
    /// Unsigned integer above `i64::MAX`, kept exact.
    UInt(u64),
    /// Floating-point number.
    Number(f64),
    /// Text value.
    String(String),
}

impl Value {
    /// The primitive kind of this value.
    pub fn primitive(&self) -> Primitive {
        match self {
            Self::Bool(_) => Primitive::Boolean,
            Self::Int(_) | Self::UInt(_) | Self::Number(_) => Primitive::Number,
            Self::String(_) => Primitive::String,
        }
    }

    /// Text form used as a key segment.
    pub fn to_segment(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::UInt(n) => n.to_string(),
            Self::Number(n) => number_segment(*n),
            Self::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_segment())
    }
}

/// Decimal text for a number.
///
/// Integral values print without a fraction, negative zero prints as `0`,
/// and non-finite values print as `NaN`, `Infinity` or `-Infinity`.
pub fn number_segment(n: f64) -> String {
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

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::String(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

macro_rules! impl_from_int {
    ($variant:ident: $wide:ty => $($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Self::$variant(<$wide>::from(n))
                }
            }
        )*
    };
}

impl_from_int!(Int: i64 => i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => Self::Int(n),
            Err(_) => Self::UInt(n),
        }
    }
}

impl From<isize> for Value {
    fn from(n: isize) -> Self {
        Self::Int(n as i64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::from(n as u64)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        // Widening would print `0.1f32` as `0.10000000149011612`.
        Self::Number(n.to_string().parse().unwrap_or(f64::from(n)))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Argument mapping for key builders and parameterizing functions.
///
/// Extra names are ignored at runtime; the generated-code layer
/// (`keyschema-codegen`) is where extraneous arguments become compile errors.
///
/// # Examples
///
/// ```
/// use keyschema_core::{args, Args, Value};
///
/// let a = args! { "id" => "42", "page" => 3 };
/// assert_eq!(a.get("page"), Some(&Value::Int(3)));
///
/// let b = Args::new().with("id", "42").with_null("page");
/// assert!(b.get("page").is_none());
/// assert!(b.contains("page"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Args {
    values: BTreeMap<String, Option<Value>>,
}

impl Args {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds a present-but-null entry.
    pub fn with_null(mut self, name: impl Into<String>) -> Self {
        self.values.insert(name.into(), None);
        self
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), Some(value.into()));
    }

    /// Looks up a non-null value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).and_then(Option::as_ref)
    }

    /// Returns `true` if `name` is present, even with a null value.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Names present in the mapping.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of entries, null ones included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Self::new();
        for (name, value) in iter {
            args.insert(name, value);
        }
        args
    }
}

/// Builds an [`Args`] mapping from `name => value` pairs.
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        $crate::Args::new()$(.with($name, $value))+
    };
}
