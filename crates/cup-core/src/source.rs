//! Source parsers: format adapters that turn a byte stream into the root
//! [`Mapping`] of a document.
//!
//! Every adapter normalizes its parser's native value type into
//! [`Value`], so the rest of the crate is format-agnostic.

use std::io::Read;

use crate::error::{CupError, Result};
use crate::types::{Mapping, Number, Value};

pub use crate::properties::PropertiesSource;

/// A format adapter.
pub trait Source {
    /// Short human-readable format name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Parse the whole input into a root mapping.
    fn load(&self, input: &mut dyn Read) -> Result<Mapping>;
}

pub(crate) fn read_text(input: &mut dyn Read) -> Result<String> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;
    Ok(text)
}

fn root_mapping(format: &'static str, value: Value) -> Result<Mapping> {
    match value {
        Value::Mapping(m) => Ok(m),
        Value::Null => Ok(Mapping::new()),
        other => Err(CupError::Source {
            format,
            message: format!("document root must be a mapping, found {}", other.kind()),
        }),
    }
}

/// JSON documents. The root must be an object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSource;

impl Source for JsonSource {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn load(&self, input: &mut dyn Read) -> Result<Mapping> {
        let parsed: serde_json::Value =
            serde_json::from_reader(input).map_err(|e| CupError::Source {
                format: self.name(),
                message: e.to_string(),
            })?;
        if !parsed.is_object() {
            return Err(CupError::Source {
                format: self.name(),
                message: "document root must be an object".to_string(),
            });
        }
        root_mapping(self.name(), from_json(parsed))
    }
}

fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::Number(Number::Float(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Sequence(items.into_iter().map(from_json).collect())
        }
        serde_json::Value::Object(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| (Value::String(k), from_json(v)))
                .collect(),
        ),
    }
}

/// YAML documents. Tags are dropped, an empty document is an empty mapping,
/// and non-string keys are preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlSource;

impl Source for YamlSource {
    fn name(&self) -> &'static str {
        "YAML"
    }

    fn load(&self, input: &mut dyn Read) -> Result<Mapping> {
        let text = read_text(input)?;
        if text.trim().is_empty() {
            return Ok(Mapping::new());
        }
        let parsed: serde_yaml::Value =
            serde_yaml::from_str(&text).map_err(|e| CupError::Source {
                format: self.name(),
                message: e.to_string(),
            })?;
        root_mapping(self.name(), from_yaml(parsed))
    }
}

fn from_yaml(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::Number(Number::Float(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Sequence(items.into_iter().map(from_yaml).collect())
        }
        serde_yaml::Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| (from_yaml(k), from_yaml(v)))
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

/// TOML documents. Datetimes are kept as their RFC 3339 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlSource;

impl Source for TomlSource {
    fn name(&self) -> &'static str {
        "TOML"
    }

    fn load(&self, input: &mut dyn Read) -> Result<Mapping> {
        let text = read_text(input)?;
        let table: toml::Table = text.parse().map_err(|e: toml::de::Error| CupError::Source {
            format: self.name(),
            message: e.to_string(),
        })?;
        Ok(table
            .into_iter()
            .map(|(k, v)| (Value::String(k), from_toml(v)))
            .collect())
    }
}

fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Sequence(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => Value::Mapping(
            table
                .into_iter()
                .map(|(k, v)| (Value::String(k), from_toml(v)))
                .collect(),
        ),
    }
}
