//! Typed, borrow-only access to one value of a document tree.
//!
//! A [`Node`] never fails to exist: lookups that miss produce a node wrapping
//! [`Value::Null`]. Scalar accessors coerce (strings parse into numbers and
//! booleans, numbers stringify) and fail with
//! [`CupError::TypeCoercion`]; structural accessors require the matching
//! kind and fail with [`CupError::TypeMismatch`].

use num_bigint::BigInt;
use serde::Deserialize;

use crate::convert::{self, ConversionOptions};
use crate::error::{ConversionError, CupError, Result};
use crate::types::{Mapping, Number, Value};

static NULL: Value = Value::Null;

/// An immutable view of one value.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    value: &'a Value,
}

impl<'a> Node<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// A node wrapping `Null`.
    pub fn null() -> Node<'static> {
        Node { value: &NULL }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// The wrapped value, unchanged.
    pub fn raw(&self) -> &'a Value {
        self.value
    }

    /// Resolve a dot-notation path relative to this node.
    ///
    /// Missing segments, and segments applied to anything that is not a
    /// mapping, yield a null node. Keys that themselves contain dots are
    /// matched whole, but only where the segment walk finds nothing.
    pub fn get(&self, path: &str) -> Node<'a> {
        match lookup(self.value, path) {
            Some(value) => Node::new(value),
            None => Node::null(),
        }
    }

    /// Canonical string form, `None` for null.
    pub fn as_string(&self) -> Option<String> {
        match self.value {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Borrow a string leaf without stringifying other kinds.
    pub fn as_str(&self) -> Option<&'a str> {
        match self.value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Result<i32> {
        match self.value {
            Value::Number(n) => Ok(n.to_i32_lossy()),
            Value::String(s) => s.parse().map_err(|_| self.coercion("int")),
            _ => Err(self.coercion("int")),
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self.value {
            Value::Number(n) => Ok(n.to_i64_lossy()),
            Value::String(s) => s.parse().map_err(|_| self.coercion("long")),
            _ => Err(self.coercion("long")),
        }
    }

    pub fn as_f64(&self) -> Result<f64> {
        match self.value {
            Value::Number(n) => Ok(n.to_f64_lossy()),
            Value::String(s) => s.trim().parse().map_err(|_| self.coercion("double")),
            _ => Err(self.coercion("double")),
        }
    }

    pub fn as_f32(&self) -> Result<f32> {
        match self.value {
            Value::Number(n) => Ok(n.to_f32_lossy()),
            Value::String(s) => s.trim().parse().map_err(|_| self.coercion("float")),
            _ => Err(self.coercion("float")),
        }
    }

    /// Exact integer coercion. Floats truncate toward zero; NaN and
    /// infinities are rejected.
    pub fn as_big_int(&self) -> Result<BigInt> {
        match self.value {
            Value::Number(n) => n.to_big_int().ok_or_else(|| self.coercion("big integer")),
            Value::String(s) => s.parse().map_err(|_| self.coercion("big integer")),
            _ => Err(self.coercion("big integer")),
        }
    }

    /// Booleans pass through; strings must be `true` or `false` in any
    /// ASCII case. Nothing else is truthy.
    pub fn as_bool(&self) -> Result<bool> {
        match self.value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(self.coercion("boolean")),
        }
    }

    /// Wrap every element of a sequence.
    pub fn as_list(&self) -> Result<Vec<Node<'a>>> {
        match self.value {
            Value::Sequence(items) => Ok(items.iter().map(Node::new).collect()),
            other => Err(CupError::TypeMismatch {
                expected: "sequence",
                found: other.kind(),
            }),
        }
    }

    /// Wrap every entry of a mapping, keeping insertion order.
    pub fn as_mapping(&self) -> Result<Vec<(&'a str, Node<'a>)>> {
        let mapping: &'a Mapping = match self.value {
            Value::Mapping(m) => m,
            other => {
                return Err(CupError::TypeMismatch {
                    expected: "mapping",
                    found: other.kind(),
                })
            }
        };
        mapping
            .iter()
            .map(|(k, v)| match k {
                Value::String(key) => Ok((key.as_str(), Node::new(v))),
                other => Err(CupError::KeyType {
                    key: other.to_string(),
                }),
            })
            .collect()
    }

    /// Materialize this subtree as `T` with default conversion options.
    ///
    /// A node does not know which tree it came from, so options set on a
    /// [`DocumentTree`](crate::DocumentTree) do not apply here. Use
    /// [`DocumentTree::convert_at`](crate::DocumentTree::convert_at) or
    /// [`convert_with`](Self::convert_with) to honour them.
    pub fn convert_to<T: Deserialize<'a>>(&self) -> std::result::Result<T, ConversionError> {
        self.convert_with(&ConversionOptions::default())
    }

    pub fn convert_with<T: Deserialize<'a>>(
        &self,
        options: &ConversionOptions,
    ) -> std::result::Result<T, ConversionError> {
        convert::from_value(self.value, options)
    }

    /// [`convert_to`](Self::convert_to) with failures reported as `None`.
    /// Always uses default options.
    pub fn try_convert_to<T: Deserialize<'a>>(&self) -> Option<T> {
        self.convert_to().ok()
    }

    fn coercion(&self, target: &'static str) -> CupError {
        CupError::TypeCoercion {
            target,
            value: describe(self.value),
        }
    }
}

impl<'a> From<&'a Value> for Node<'a> {
    fn from(value: &'a Value) -> Self {
        Node::new(value)
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mapping = value.as_mapping()?;
    let walked = match path.split_once('.') {
        Some((segment, rest)) => mapping.get(segment).and_then(|next| lookup(next, rest)),
        None => mapping.get(path),
    };
    walked.or_else(|| {
        if path.contains('.') {
            mapping.get(path)
        } else {
            None
        }
    })
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        Value::Number(Number::Float(f)) => format!("{} (float)", f),
        other => other.to_string(),
    }
}
