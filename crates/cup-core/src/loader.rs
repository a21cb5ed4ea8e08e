//! Format detection and document loading.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{CupError, Result};
use crate::source::{JsonSource, PropertiesSource, Source, TomlSource, YamlSource};
use crate::tree::DocumentTree;

/// The supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Yaml,
    Toml,
    Properties,
    Json,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Yaml, Format::Toml, Format::Properties, Format::Json];

    /// Detect the format from a file name's extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`CupError::UnsupportedFormat`] for any other extension.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("yml" | "yaml") => Ok(Format::Yaml),
            Some("toml") => Ok(Format::Toml),
            Some("properties") => Ok(Format::Properties),
            Some("json") => Ok(Format::Json),
            _ => Err(CupError::UnsupportedFormat(filename.to_string())),
        }
    }

    /// Look a format up by name (`yaml`, `yml`, `toml`, `properties`, `json`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            "properties" => Some(Format::Properties),
            "json" => Some(Format::Json),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Toml => "toml",
            Format::Properties => "properties",
            Format::Json => "json",
        }
    }

    /// The parser for this format.
    pub fn source(&self) -> Box<dyn Source> {
        match self {
            Format::Yaml => Box::new(YamlSource),
            Format::Toml => Box::new(TomlSource),
            Format::Properties => Box::new(PropertiesSource::new()),
            Format::Json => Box::new(JsonSource),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Load a document from disk, detecting the format from its extension.
pub fn load_path(path: impl AsRef<Path>) -> Result<DocumentTree> {
    let path = path.as_ref();
    let format = Format::from_filename(&path.to_string_lossy())?;
    load_path_with(path, format)
}

/// Load a document from disk with an explicit format.
pub fn load_path_with(path: impl AsRef<Path>, format: Format) -> Result<DocumentTree> {
    let path = path.as_ref();
    info!(path = %path.display(), %format, "loading document");
    let file = File::open(path).map_err(|source| CupError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_reader_with(BufReader::new(file), format)
}

/// Load a document from a reader. `filename` is only used to pick the format.
pub fn load_reader(input: impl Read, filename: &str) -> Result<DocumentTree> {
    let format = Format::from_filename(filename)?;
    info!(filename, %format, "loading document");
    load_reader_with(input, format)
}

/// Load a document from a reader with an explicit format.
pub fn load_reader_with(mut input: impl Read, format: Format) -> Result<DocumentTree> {
    load_with_source(&mut input, format.source().as_ref())
}

/// Load a document using a caller-supplied parser.
pub fn load_with_source(input: &mut dyn Read, source: &dyn Source) -> Result<DocumentTree> {
    let root = source.load(input)?;
    debug!(format = source.name(), keys = root.len(), "document parsed");
    Ok(DocumentTree::new(root))
}

/// Parse an in-memory document.
pub fn load_str(text: &str, format: Format) -> Result<DocumentTree> {
    load_reader_with(text.as_bytes(), format)
}
