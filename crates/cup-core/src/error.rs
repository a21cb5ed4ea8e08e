//! Error types for lookup coercion, structural conversion and loading.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or converting a document tree.
#[derive(Error, Debug)]
pub enum CupError {
    /// A typed accessor could not coerce the wrapped value (wrong runtime
    /// type or unparsable string).
    #[error("cannot convert {value} to {target}")]
    TypeCoercion { target: &'static str, value: String },

    /// `as_list`/`as_mapping` was called on a value of another kind.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A mapping contains a key that is not a string.
    #[error("mapping contains non-string key: {key}")]
    KeyType { key: String },

    /// The tree could not be materialized into the requested shape.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// The input format could not be determined from the file name.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// A source parser rejected its input.
    #[error("{format} parse error: {message}")]
    Source {
        format: &'static str,
        message: String,
    },

    /// Reading a caller-supplied stream failed. There is no path to report.
    #[error("read error: {0}")]
    Read(#[from] std::io::Error),

    /// Opening or reading a file given by path failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias used throughout cup-core.
pub type Result<T> = std::result::Result<T, CupError>;

/// Failure raised while deserializing a tree into a caller-defined shape.
///
/// `path` holds the dotted location of the offending value when known
/// (empty for the root).
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionError {
    message: String,
    path: Vec<String>,
}

impl ConversionError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
        }
    }

    /// Prepend a path segment while the error unwinds out of a nested value.
    pub(crate) fn within(mut self, segment: impl Into<String>) -> Self {
        self.path.insert(0, segment.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Dotted location of the failing value, `None` at the root.
    pub fn path(&self) -> Option<String> {
        if self.path.is_empty() {
            None
        } else {
            Some(self.path.join("."))
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(path) => write!(f, "conversion error at `{}`: {}", path, self.message),
            None => write!(f, "conversion error: {}", self.message),
        }
    }
}

impl std::error::Error for ConversionError {}

impl serde::de::Error for ConversionError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ConversionError::new(msg.to_string())
    }
}
