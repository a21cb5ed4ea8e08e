//! `cup` CLI: query structured documents from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Read one value by dot path
//! cup get server.port -i app.yaml
//!
//! # Force a coercion (fails if the value does not fit)
//! cup get server.ssl.enabled --as bool -i app.properties
//!
//! # Read from stdin (the format cannot be sniffed, so pass it)
//! cat app.toml | cup get database.pool.max -f toml
//!
//! # Dump the whole tree, or a subtree, as JSON
//! cup dump -i app.toml --at database
//!
//! # List keys of the root or of a nested mapping
//! cup keys server -i app.json
//! ```

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use cup_core::{DocumentTree, Format, Node, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cup",
    version,
    about = "Query YAML, TOML, JSON and .properties documents by dot path"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log loader activity to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct InputArgs {
    /// Input file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Document format; required for stdin, otherwise sniffed from the extension
    #[arg(short, long)]
    format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value at a dot path
    Get {
        /// Dot-notation path, e.g. server.ssl.enabled
        path: String,
        #[command(flatten)]
        input: InputArgs,
        /// Coerce the value before printing
        #[arg(long = "as", value_enum)]
        kind: Option<Kind>,
    },
    /// Print the document (or the subtree at --at) as pretty JSON
    Dump {
        #[command(flatten)]
        input: InputArgs,
        /// Only dump the subtree at this path
        #[arg(long)]
        at: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the keys of the mapping at a path (the root by default)
    Keys {
        path: Option<String>,
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    #[value(name = "string")]
    Str,
    Int,
    Long,
    Double,
    Bool,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Get { path, input, kind } => {
            let tree = load(&input)?;
            let node = tree.get(&path);
            if node.is_null() {
                bail!("no value at `{}`", path);
            }
            let text = render(node, kind).with_context(|| format!("Failed to read `{}`", path))?;
            println!("{}", text);
        }
        Commands::Dump { input, at, output } => {
            let tree = load(&input)?;
            let value = match at.as_deref() {
                Some(path) => tree.get(path).raw(),
                None => tree.root(),
            };
            let json = to_json(value)?;
            write_output(output.as_ref(), &json)?;
        }
        Commands::Keys { path, input } => {
            let tree = load(&input)?;
            let node = match path.as_deref() {
                Some(path) => tree.get(path),
                None => Node::new(tree.root()),
            };
            let mapping = node.raw().as_mapping().with_context(|| {
                format!("`{}` is not a mapping", path.as_deref().unwrap_or("<root>"))
            })?;
            for key in mapping.keys() {
                println!("{}", key);
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let base = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(base));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn load(args: &InputArgs) -> Result<DocumentTree> {
    let format = match args.format.as_deref() {
        Some(name) => Some(Format::from_name(name).with_context(|| {
            format!(
                "Unknown format: '{}'. Available: yaml, toml, properties, json",
                name
            )
        })?),
        None => None,
    };

    match (&args.input, format) {
        (Some(path), Some(format)) => cup_core::load_path_with(path, format)
            .with_context(|| format!("Failed to load {}", path.display())),
        (Some(path), None) => {
            cup_core::load_path(path).with_context(|| format!("Failed to load {}", path.display()))
        }
        (None, Some(format)) => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            debug!(bytes = buf.len(), %format, "read document from stdin");
            cup_core::load_str(&buf, format).context("Failed to parse stdin")
        }
        (None, None) => bail!("--format is required when reading from stdin"),
    }
}

fn render(node: Node<'_>, kind: Option<Kind>) -> Result<String> {
    let text = match kind {
        Some(Kind::Str) => node.as_string().unwrap_or_default(),
        Some(Kind::Int) => node.as_i32()?.to_string(),
        Some(Kind::Long) => node.as_i64()?.to_string(),
        Some(Kind::Double) => node.as_f64()?.to_string(),
        Some(Kind::Bool) => node.as_bool()?.to_string(),
        Some(Kind::Json) => to_json(node.raw())?,
        None => match node.raw() {
            Value::Sequence(_) | Value::Mapping(_) => to_json(node.raw())?,
            other => other.to_string(),
        },
    };
    Ok(text)
}

fn to_json(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to render value as JSON")
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
