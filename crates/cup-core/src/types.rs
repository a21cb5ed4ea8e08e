//! The untyped value model every source parser produces.
//!
//! Parsed documents are held as a [`Value`] tree. Numbers keep the kind the
//! parser saw (`i64`, big integer, or `f64`) so that integer, floating-point
//! and big-integer coercions stay lossless where the input allows it.
//! Mappings keep insertion order and allow non-string keys, which YAML
//! permits; a plain `Vec` of pairs is enough for configuration-sized data.

use std::fmt;

use num_bigint::{BigInt, Sign};
use num_traits::{FromPrimitive, ToPrimitive};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A parsed number.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(i64),
    /// Integers that do not fit in `i64`.
    BigInt(BigInt),
    Float(f64),
}

impl Number {
    pub fn is_integer(&self) -> bool {
        !matches!(self, Number::Float(_))
    }

    /// Narrow to `i64`, truncating big integers to their low 64 bits and
    /// floats toward zero (saturating, NaN becomes 0).
    pub fn to_i64_lossy(&self) -> i64 {
        match self {
            Number::Int(n) => *n,
            Number::BigInt(big) => low_u64(big) as i64,
            Number::Float(f) => *f as i64,
        }
    }

    /// Narrow to `i32` with two's complement truncation of integers.
    pub fn to_i32_lossy(&self) -> i32 {
        match self {
            Number::Float(f) => *f as i32,
            other => other.to_i64_lossy() as i32,
        }
    }

    pub fn to_f64_lossy(&self) -> f64 {
        match self {
            Number::Int(n) => *n as f64,
            Number::BigInt(big) => big.to_f64().unwrap_or(f64::NAN),
            Number::Float(f) => *f,
        }
    }

    pub fn to_f32_lossy(&self) -> f32 {
        self.to_f64_lossy() as f32
    }

    /// Exact integer value; floats are truncated toward zero. `None` for
    /// NaN and infinities.
    pub fn to_big_int(&self) -> Option<BigInt> {
        match self {
            Number::Int(n) => Some(BigInt::from(*n)),
            Number::BigInt(big) => Some(big.clone()),
            Number::Float(f) => BigInt::from_f64(f.trunc()),
        }
    }

    /// Integral value if the number is an integer, or a float without a
    /// fractional part that fits in `i128`.
    pub(crate) fn to_i128_exact(&self) -> Option<i128> {
        match self {
            Number::Int(n) => Some(i128::from(*n)),
            Number::BigInt(big) => big.to_i128(),
            Number::Float(f) if f.is_finite() && f.fract() == 0.0 => f.to_i128(),
            Number::Float(_) => None,
        }
    }
}

/// Low 64 bits of the two's complement representation.
fn low_u64(big: &BigInt) -> u64 {
    let (sign, digits) = big.to_u64_digits();
    let low = digits.first().copied().unwrap_or(0);
    match sign {
        Sign::Minus => low.wrapping_neg(),
        _ => low,
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Int(n)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        i64::try_from(n)
            .map(Number::Int)
            .unwrap_or_else(|_| Number::BigInt(BigInt::from(n)))
    }
}

impl From<BigInt> for Number {
    fn from(big: BigInt) -> Self {
        big.to_i64().map(Number::Int).unwrap_or(Number::BigInt(big))
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Number::Float(f)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::BigInt(big) => write!(f, "{}", big),
            // Integral floats keep a fractional digit or an exponent so they
            // still read as floats.
            Number::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{:.1}", x)
            }
            Number::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:e}", x),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

/// An insertion-ordered mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(Value, Value)>,
}

impl Mapping {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the entry whose key is the string `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| matches!(k, Value::String(s) if s == key))
            .map(|(_, v)| v)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| matches!(k, Value::String(s) if s == key))
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert an entry. An existing equal key keeps its position and gets
    /// the new value, which is returned as the previous one.
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub(crate) fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

impl IntoIterator for Mapping {
    type Item = (Value, Value);
    type IntoIter = std::vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// One parsed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::Int(i64::from(n)))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::Int(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Number(Number::Float(f))
    }
}

impl From<BigInt> for Value {
    fn from(big: BigInt) -> Self {
        Value::Number(Number::from(big))
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Mapping(m)
    }
}

/// Canonical string form: scalars print bare, structures in flow style
/// (`[a, 1]`, `{k: v}`).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Mapping(m) => {
                f.write_str("{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Int(n)) => serializer.serialize_i64(*n),
            Value::Number(Number::BigInt(big)) => match big.to_i128() {
                Some(n) => serializer.serialize_i128(n),
                None => serializer.serialize_str(&big.to_string()),
            },
            Value::Number(Number::Float(x)) => serializer.serialize_f64(*x),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Mapping(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m.iter() {
                    match k {
                        Value::String(_) | Value::Number(Number::Int(_)) => {
                            map.serialize_entry(k, v)?
                        }
                        // Formats like JSON only take string keys.
                        other => map.serialize_entry(&other.to_string(), v)?,
                    }
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_int_truncates_to_low_bits() {
        let big = BigInt::from(u64::MAX) + BigInt::from(2);
        assert_eq!(Number::BigInt(big).to_i64_lossy(), 1);

        let negative = -(BigInt::from(u64::MAX) + BigInt::from(2));
        assert_eq!(Number::BigInt(negative).to_i64_lossy(), -1);
    }

    #[test]
    fn integer_narrowing_wraps() {
        assert_eq!(Number::Int(i64::from(i32::MAX) + 1).to_i32_lossy(), i32::MIN);
        assert_eq!(Number::Float(3.9).to_i32_lossy(), 3);
        assert_eq!(Number::Float(f64::NAN).to_i32_lossy(), 0);
    }

    #[test]
    fn u64_beyond_i64_becomes_big_int() {
        assert!(matches!(Number::from(u64::MAX), Number::BigInt(_)));
        assert_eq!(Number::from(7u64), Number::Int(7));
    }

    #[test]
    fn display_keeps_float_marker() {
        assert_eq!(Value::from(8080.0).to_string(), "8080.0");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(8080).to_string(), "8080");
        assert_eq!(Value::from(1e20).to_string(), "1e20");
        assert_eq!(Value::from(-2.5e17).to_string(), "-2.5e17");
    }

    #[test]
    fn json_dump_stringifies_non_string_keys() {
        let mut m = Mapping::new();
        m.insert(Value::Null, "a");
        m.insert(7, "seven");
        m.insert(Value::Sequence(vec![Value::from(1), Value::from(2)]), "pair");
        m.insert("b", 1);
        let json = serde_json::to_string(&Value::Mapping(m)).unwrap();
        assert_eq!(json, r#"{"null":"a","7":"seven","[1, 2]":"pair","b":1}"#);
    }

    #[test]
    fn display_renders_structures_in_flow_style() {
        let mut m = Mapping::new();
        m.insert("a", Value::Sequence(vec![Value::from(1), Value::from("x")]));
        m.insert("b", Value::Null);
        assert_eq!(Value::Mapping(m).to_string(), "{a: [1, x], b: null}");
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut m = Mapping::new();
        m.insert("a", 1);
        m.insert("b", 2);
        assert_eq!(m.insert("a", 3), Some(Value::from(1)));
        let keys: Vec<String> = m.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(m.get("a"), Some(&Value::from(3)));
    }
}
