//! Structural conversion: deserialize a borrowed [`Value`] tree into any
//! `serde::Deserialize` shape.
//!
//! The deserializer is deliberately lenient by default:
//!
//! - keys the target does not declare are skipped;
//! - declared struct fields absent from the tree, and explicit nulls, turn
//!   into the zero value of the field type (`0`, `false`, `""`, `'\0'`,
//!   empty collections, tuples of zero values, `None`, nested structs of
//!   zero values);
//! - scalars are coerced across kinds where the text allows it (`"8080"`
//!   into an integer field, `"TRUE"` into a bool, `42` into a `String`).
//!
//! Both leniencies can be switched off through [`ConversionOptions`].

use serde::de::value::BorrowedStrDeserializer;
use serde::de::{
    self, DeserializeSeed, Deserializer, EnumAccess, MapAccess, SeqAccess, Unexpected,
    VariantAccess, Visitor,
};
use serde::Deserialize;

use crate::error::ConversionError;
use crate::types::{Mapping, Number, Value};

static NULL: Value = Value::Null;
static EMPTY: Mapping = Mapping::new();

/// Feature flags for structural conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Reject keys the target struct does not declare.
    pub fail_on_unknown_keys: bool,
    /// Reject nulls and missing fields for non-`Option` targets instead of
    /// substituting zero values.
    pub fail_on_null_for_primitives: bool,
}

impl ConversionOptions {
    /// Both checks enabled.
    pub fn strict() -> Self {
        Self {
            fail_on_unknown_keys: true,
            fail_on_null_for_primitives: true,
        }
    }

    pub fn fail_on_unknown_keys(mut self, state: bool) -> Self {
        self.fail_on_unknown_keys = state;
        self
    }

    pub fn fail_on_null_for_primitives(mut self, state: bool) -> Self {
        self.fail_on_null_for_primitives = state;
        self
    }
}

pub(crate) fn from_value<'de, T: Deserialize<'de>>(
    value: &'de Value,
    options: &ConversionOptions,
) -> Result<T, ConversionError> {
    T::deserialize(ValueDeserializer::new(value, options))
}

struct ValueDeserializer<'de, 'o> {
    value: &'de Value,
    options: &'o ConversionOptions,
}

impl<'de, 'o> ValueDeserializer<'de, 'o> {
    fn new(value: &'de Value, options: &'o ConversionOptions) -> Self {
        Self { value, options }
    }

    fn lenient_null(&self) -> bool {
        self.value.is_null() && !self.options.fail_on_null_for_primitives
    }

    fn unexpected(&self) -> Unexpected<'de> {
        match self.value {
            Value::Null => Unexpected::Unit,
            Value::Bool(b) => Unexpected::Bool(*b),
            Value::Number(Number::Int(n)) => Unexpected::Signed(*n),
            Value::Number(Number::BigInt(_)) => Unexpected::Other("big integer"),
            Value::Number(Number::Float(f)) => Unexpected::Float(*f),
            Value::String(s) => Unexpected::Str(s),
            Value::Sequence(_) => Unexpected::Seq,
            Value::Mapping(_) => Unexpected::Map,
        }
    }

    fn invalid_type<V: Visitor<'de>>(&self, visitor: &V) -> ConversionError {
        de::Error::invalid_type(self.unexpected(), visitor)
    }

    fn deserialize_integer<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConversionError> {
        match self.value {
            Value::Number(n) => match n.to_i128_exact() {
                Some(i) => visit_integer(i, visitor),
                None => Err(self.invalid_type(&visitor)),
            },
            Value::String(s) => match s.parse::<i128>() {
                Ok(i) => visit_integer(i, visitor),
                Err(_) => Err(self.invalid_type(&visitor)),
            },
            _ if self.lenient_null() => visitor.visit_i64(0),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_float<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConversionError> {
        match self.value {
            Value::Number(n) => visitor.visit_f64(n.to_f64_lossy()),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(f) => visitor.visit_f64(f),
                Err(_) => Err(self.invalid_type(&visitor)),
            },
            _ if self.lenient_null() => visitor.visit_f64(0.0),
            _ => Err(self.invalid_type(&visitor)),
        }
    }
}

/// Hand an integer to the visitor through the narrowest serde entry point.
fn visit_integer<'de, V: Visitor<'de>>(i: i128, visitor: V) -> Result<V::Value, ConversionError> {
    if let Ok(n) = i64::try_from(i) {
        visitor.visit_i64(n)
    } else if let Ok(n) = u64::try_from(i) {
        visitor.visit_u64(n)
    } else {
        visitor.visit_i128(i)
    }
}

macro_rules! forward_integer {
    ($($method:ident)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                self.deserialize_integer(visitor)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for ValueDeserializer<'de, '_> {
    type Error = ConversionError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Number(Number::Int(n)) => visitor.visit_i64(*n),
            Value::Number(number @ Number::BigInt(_)) => match number.to_i128_exact() {
                Some(i) => visit_integer(i, visitor),
                None => Err(de::Error::custom(format!(
                    "integer {} is out of range",
                    number
                ))),
            },
            Value::Number(Number::Float(f)) => visitor.visit_f64(*f),
            Value::String(s) => visitor.visit_borrowed_str(s),
            Value::Sequence(items) => visitor.visit_seq(SeqAccessor::new(items, self.options)),
            Value::Mapping(m) => visitor.visit_map(MapAccessor::new(m, Vec::new(), self.options)),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => visitor.visit_bool(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => visitor.visit_bool(false),
            _ if self.lenient_null() => visitor.visit_bool(false),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    forward_integer! {
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_float(visitor)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_float(visitor)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        if self.lenient_null() {
            return visitor.visit_char('\0');
        }
        self.deserialize_str(visitor)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::String(s) => visitor.visit_borrowed_str(s),
            Value::Bool(_) | Value::Number(_) => visitor.visit_string(self.value.to_string()),
            _ if self.lenient_null() => visitor.visit_borrowed_str(""),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::String(s) => visitor.visit_borrowed_bytes(s.as_bytes()),
            Value::Sequence(items) => visitor.visit_seq(SeqAccessor::new(items, self.options)),
            _ if self.lenient_null() => visitor.visit_borrowed_bytes(&[]),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Null => visitor.visit_unit(),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Sequence(items) => visitor.visit_seq(SeqAccessor::new(items, self.options)),
            _ if self.lenient_null() => visitor.visit_seq(SeqAccessor::new(&[], self.options)),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        // A null tuple is a tuple of nulls, so each element takes its zero value.
        if self.lenient_null() {
            return visitor.visit_seq(NullSeq::new(len, self.options));
        }
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Mapping(m) => visitor.visit_map(MapAccessor::new(m, Vec::new(), self.options)),
            _ if self.lenient_null() => {
                visitor.visit_map(MapAccessor::new(&EMPTY, Vec::new(), self.options))
            }
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        let mapping: &'de Mapping = match self.value {
            Value::Mapping(m) => m,
            _ if self.lenient_null() => &EMPTY,
            _ => return Err(self.invalid_type(&visitor)),
        };

        if self.options.fail_on_unknown_keys {
            for key in mapping.keys() {
                let name = key.to_string();
                if !fields.contains(&name.as_str()) {
                    return Err(de::Error::unknown_field(&name, fields));
                }
            }
        }

        // Declared fields the tree lacks are fed as nulls so they take
        // their zero value.
        let missing = if self.options.fail_on_null_for_primitives {
            Vec::new()
        } else {
            fields
                .iter()
                .copied()
                .filter(|field| !mapping.contains_key(field))
                .collect()
        };

        visitor.visit_map(MapAccessor::new(mapping, missing, self.options))
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::String(s) => {
                visitor.visit_enum(BorrowedStrDeserializer::<ConversionError>::new(s))
            }
            Value::Mapping(m) if m.len() == 1 => {
                let (variant, content) = &m.entries()[0];
                visitor.visit_enum(EnumAccessor {
                    variant,
                    content,
                    options: self.options,
                })
            }
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }
}

struct SeqAccessor<'de, 'o> {
    items: std::iter::Enumerate<std::slice::Iter<'de, Value>>,
    remaining: usize,
    options: &'o ConversionOptions,
}

impl<'de, 'o> SeqAccessor<'de, 'o> {
    fn new(items: &'de [Value], options: &'o ConversionOptions) -> Self {
        Self {
            items: items.iter().enumerate(),
            remaining: items.len(),
            options,
        }
    }
}

impl<'de> SeqAccess<'de> for SeqAccessor<'de, '_> {
    type Error = ConversionError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Self::Error> {
        match self.items.next() {
            Some((index, item)) => {
                self.remaining -= 1;
                seed.deserialize(ValueDeserializer::new(item, self.options))
                    .map(Some)
                    .map_err(|e| e.within(index.to_string()))
            }
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

/// `len` nulls standing in for an absent tuple.
struct NullSeq<'o> {
    index: usize,
    len: usize,
    options: &'o ConversionOptions,
}

impl<'o> NullSeq<'o> {
    fn new(len: usize, options: &'o ConversionOptions) -> Self {
        Self {
            index: 0,
            len,
            options,
        }
    }
}

impl<'de> SeqAccess<'de> for NullSeq<'_> {
    type Error = ConversionError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Self::Error> {
        if self.index == self.len {
            return Ok(None);
        }
        let index = self.index;
        self.index += 1;
        seed.deserialize(ValueDeserializer::new(&NULL, self.options))
            .map(Some)
            .map_err(|e| e.within(index.to_string()))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.len - self.index)
    }
}

/// Walks the mapping entries, then the synthesized null entries for
/// declared-but-absent fields.
struct MapAccessor<'de, 'o> {
    entries: std::slice::Iter<'de, (Value, Value)>,
    missing: std::vec::IntoIter<&'static str>,
    pending: Option<(String, &'de Value)>,
    options: &'o ConversionOptions,
}

impl<'de, 'o> MapAccessor<'de, 'o> {
    fn new(
        mapping: &'de Mapping,
        missing: Vec<&'static str>,
        options: &'o ConversionOptions,
    ) -> Self {
        Self {
            entries: mapping.entries().iter(),
            missing: missing.into_iter(),
            pending: None,
            options,
        }
    }
}

impl<'de> MapAccess<'de> for MapAccessor<'de, '_> {
    type Error = ConversionError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        if let Some((key, value)) = self.entries.next() {
            let segment = key.to_string();
            let parsed = seed
                .deserialize(ValueDeserializer::new(key, self.options))
                .map_err(|e| e.within(segment.clone()))?;
            self.pending = Some((segment, value));
            return Ok(Some(parsed));
        }
        if let Some(field) = self.missing.next() {
            let key = BorrowedStrDeserializer::<ConversionError>::new(field);
            let parsed = seed.deserialize(key)?;
            self.pending = Some((field.to_string(), &NULL));
            return Ok(Some(parsed));
        }
        Ok(None)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Self::Error> {
        match self.pending.take() {
            Some((segment, value)) => seed
                .deserialize(ValueDeserializer::new(value, self.options))
                .map_err(|e| e.within(segment)),
            None => Err(de::Error::custom("value requested before key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len() + self.missing.len())
    }
}

struct EnumAccessor<'de, 'o> {
    variant: &'de Value,
    content: &'de Value,
    options: &'o ConversionOptions,
}

impl<'de, 'o> EnumAccess<'de> for EnumAccessor<'de, 'o> {
    type Error = ConversionError;
    type Variant = VariantAccessor<'de, 'o>;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self::Variant), Self::Error> {
        let variant = seed.deserialize(ValueDeserializer::new(self.variant, self.options))?;
        Ok((
            variant,
            VariantAccessor {
                content: self.content,
                options: self.options,
            },
        ))
    }
}

struct VariantAccessor<'de, 'o> {
    content: &'de Value,
    options: &'o ConversionOptions,
}

impl<'de> VariantAccess<'de> for VariantAccessor<'de, '_> {
    type Error = ConversionError;

    fn unit_variant(self) -> Result<(), Self::Error> {
        match self.content {
            Value::Null => Ok(()),
            other => Err(de::Error::invalid_type(
                ValueDeserializer::new(other, self.options).unexpected(),
                &"unit variant",
            )),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, Self::Error> {
        seed.deserialize(ValueDeserializer::new(self.content, self.options))
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error> {
        ValueDeserializer::new(self.content, self.options).deserialize_seq(visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        ValueDeserializer::new(self.content, self.options).deserialize_struct("", fields, visitor)
    }
}
