//! The document tree: an owned root mapping with dot-path lookup and
//! structural conversion.

use serde::Deserialize;

use crate::convert::{self, ConversionOptions};
use crate::error::ConversionError;
use crate::node::Node;
use crate::types::{Mapping, Value};

static EMPTY: Mapping = Mapping::new();

/// A fully parsed document.
///
/// The root is fixed at construction. Only the [`ConversionOptions`] used by
/// the `convert_*` family may change afterwards; they never affect content.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTree {
    // Only `new` writes this, always as a mapping.
    root: Value,
    options: ConversionOptions,
}

impl DocumentTree {
    pub fn new(root: Mapping) -> Self {
        Self {
            root: Value::Mapping(root),
            options: ConversionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn set_options(&mut self, options: ConversionOptions) {
        self.options = options;
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// The root mapping as a value.
    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn root_mapping(&self) -> &Mapping {
        self.root.as_mapping().unwrap_or(&EMPTY)
    }

    pub fn len(&self) -> usize {
        self.root_mapping().len()
    }

    pub fn is_empty(&self) -> bool {
        self.root_mapping().is_empty()
    }

    /// Top-level keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.root_mapping().keys()
    }

    /// Resolve a dot-notation path such as `"server.ssl.enabled"`.
    ///
    /// Never fails: an absent segment, or a segment applied to a value that
    /// is not a mapping, yields a null node.
    ///
    /// ```
    /// use cup_core::{load_str, Format};
    ///
    /// let tree = load_str("server:\n  port: 8080\n", Format::Yaml).unwrap();
    /// assert_eq!(tree.get("server.port").as_i32().unwrap(), 8080);
    /// assert!(tree.get("server.port.number").is_null());
    /// ```
    pub fn get(&self, path: &str) -> Node<'_> {
        Node::new(&self.root).get(path)
    }

    /// Whether `path` resolves to a non-null value.
    pub fn contains(&self, path: &str) -> bool {
        !self.get(path).is_null()
    }

    /// Materialize the whole document as `T`.
    ///
    /// Unknown keys are ignored and missing fields take their zero value
    /// unless the tree's [`ConversionOptions`] say otherwise.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] when a present value cannot become the
    /// declared field type.
    pub fn convert_to<'a, T: Deserialize<'a>>(&'a self) -> Result<T, ConversionError> {
        convert::from_value(&self.root, &self.options)
    }

    /// Materialize the subtree at `path` as `T`. A missing path converts
    /// from null.
    pub fn convert_at<'a, T: Deserialize<'a>>(&'a self, path: &str) -> Result<T, ConversionError> {
        convert::from_value(self.get(path).raw(), &self.options)
    }

    /// Like [`convert_to`](Self::convert_to), with conversion failures
    /// reported as `None`.
    pub fn try_convert_to<'a, T: Deserialize<'a>>(&'a self) -> Option<T> {
        self.convert_to().ok()
    }

    pub fn try_convert_at<'a, T: Deserialize<'a>>(&'a self, path: &str) -> Option<T> {
        self.convert_at(path).ok()
    }

    /// Convert, falling back to `T::default()` when the data does not fit.
    pub fn convert_to_or_default<'a, T: Deserialize<'a> + Default>(&'a self) -> T {
        self.try_convert_to().unwrap_or_default()
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        DocumentTree::new(Mapping::new())
    }
}

impl From<Mapping> for DocumentTree {
    fn from(root: Mapping) -> Self {
        DocumentTree::new(root)
    }
}
