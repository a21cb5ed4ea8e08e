//! # cup-core
//!
//! Hierarchical document trees for configuration-style data.
//!
//! A YAML, TOML, JSON or `.properties` document is parsed into a
//! [`DocumentTree`]. Values are reached with dot-notation paths and read
//! through [`Node`]'s typed accessors, or the whole tree (or a subtree) is
//! materialized into a `#[derive(Deserialize)]` struct.
//!
//! ## Quick start
//!
//! ```rust
//! use cup_core::{load_str, Format};
//! use serde::Deserialize;
//!
//! let yaml = "server:\n  port: \"8080\"\n  ssl:\n    enabled: \"true\"\n";
//! let tree = load_str(yaml, Format::Yaml).unwrap();
//!
//! assert_eq!(tree.get("server.port").as_i32().unwrap(), 8080);
//! assert!(tree.get("server.ssl.enabled").as_bool().unwrap());
//! assert!(tree.get("server.timeout").is_null());
//!
//! #[derive(Deserialize)]
//! struct Server {
//!     port: u16,
//!     timeout: u32,
//! }
//!
//! let server: Server = tree.convert_at("server").unwrap();
//! assert_eq!(server.port, 8080);
//! assert_eq!(server.timeout, 0);
//! ```
//!
//! ## Modules
//!
//! - [`types`]: the untyped [`Value`] model
//! - [`node`]: typed access to one value
//! - [`tree`]: the document root, path lookup and conversion
//! - [`convert`]: the lenient structural deserializer and its options
//! - [`source`]: format parsers
//! - [`loader`]: format detection and loading
//! - [`lenient`]: never-failing scalar parsers
//! - [`error`]: error types

pub mod convert;
pub mod error;
pub mod lenient;
pub mod loader;
pub mod node;
mod properties;
pub mod source;
pub mod tree;
pub mod types;

pub use convert::ConversionOptions;
pub use error::{ConversionError, CupError, Result};
pub use loader::{
    load_path, load_path_with, load_reader, load_reader_with, load_str, load_with_source, Format,
};
pub use node::Node;
pub use source::{JsonSource, PropertiesSource, Source, TomlSource, YamlSource};
pub use tree::DocumentTree;
pub use types::{Mapping, Number, Value};
