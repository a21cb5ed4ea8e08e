//! Structural conversion of trees into `Deserialize` shapes.

use std::collections::HashMap;

use cup_core::{load_str, ConversionOptions, DocumentTree, Format};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, PartialEq)]
struct Ssl {
    enabled: bool,
    protocols: Vec<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
struct Server {
    host: String,
    port: u16,
    timeout: u32,
    ssl: Ssl,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
struct Pool {
    min: u32,
    max: u32,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
struct Database {
    url: String,
    pool: Pool,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
struct Feature {
    name: String,
    enabled: bool,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
struct AppConfig {
    server: Server,
    database: Database,
    features: Vec<Feature>,
}

fn app_tree() -> DocumentTree {
    let yaml = r#"
app:
  name: inventory
server:
  host: 0.0.0.0
  port: 8080
  ssl:
    enabled: true
    protocols: [TLSv1.2, TLSv1.3]
database:
  url: postgres://localhost/inventory
  pool:
    min: 2
    max: 16
features:
  - name: search
    enabled: true
  - name: export
    enabled: false
"#;
    load_str(yaml, Format::Yaml).unwrap()
}

// ============================================================================
// Whole-tree and subtree conversion
// ============================================================================

#[test]
fn converts_whole_tree_ignoring_unknown_keys() {
    let config: AppConfig = app_tree().convert_to().unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert!(config.server.ssl.enabled);
    assert_eq!(config.server.ssl.protocols, ["TLSv1.2", "TLSv1.3"]);
    assert_eq!(config.database.pool, Pool { min: 2, max: 16 });
    assert_eq!(config.features.len(), 2);
    assert_eq!(config.features[1].name, "export");
}

#[test]
fn converts_subtree_at_path() {
    let pool: Pool = app_tree().convert_at("database.pool").unwrap();
    assert_eq!(pool, Pool { min: 2, max: 16 });
}

#[test]
fn converts_into_maps_and_borrowed_strs() {
    let tree = app_tree();
    let pool: HashMap<String, u64> = tree.convert_at("database.pool").unwrap();
    assert_eq!(pool["max"], 16);

    #[derive(Deserialize)]
    struct Borrowed<'a> {
        url: &'a str,
    }
    let db: Borrowed<'_> = tree.convert_at("database").unwrap();
    assert_eq!(db.url, "postgres://localhost/inventory");
}

// ============================================================================
// Lenient defaults
// ============================================================================

#[test]
fn missing_fields_take_zero_values() {
    let config: AppConfig = app_tree().convert_to().unwrap();
    assert_eq!(config.server.timeout, 0);
}

#[test]
fn missing_nested_struct_is_zeroed() {
    let tree = load_str("server:\n  port: 1\n", Format::Yaml).unwrap();
    let config: AppConfig = tree.convert_to().unwrap();
    assert_eq!(config.server.port, 1);
    assert_eq!(config.server.host, "");
    assert_eq!(config.server.ssl, Ssl::default());
    assert_eq!(config.database, Database::default());
    assert!(config.features.is_empty());
}

#[test]
fn explicit_nulls_take_zero_values() {
    let tree = load_str("min: ~\nmax: null\n", Format::Yaml).unwrap();
    let pool: Pool = tree.convert_to().unwrap();
    assert_eq!(pool, Pool { min: 0, max: 0 });
}

#[test]
fn missing_option_fields_are_none() {
    #[derive(Deserialize)]
    struct Optional {
        name: Option<String>,
        port: Option<u16>,
    }
    let tree = load_str("port: 9\n", Format::Yaml).unwrap();
    let parsed: Optional = tree.convert_to().unwrap();
    assert_eq!(parsed.name, None);
    assert_eq!(parsed.port, Some(9));
}

#[test]
fn missing_char_and_tuple_fields_take_zero_values() {
    #[derive(Deserialize)]
    struct Layout {
        sep: char,
        n: u8,
        range: (u16, String),
        rgb: [u8; 3],
    }
    let tree = load_str("n: 1
", Format::Yaml).unwrap();
    let layout: Layout = tree.convert_to().unwrap();
    assert_eq!(layout.sep, '\0');
    assert_eq!(layout.n, 1);
    assert_eq!(layout.range, (0, String::new()));
    assert_eq!(layout.rgb, [0, 0, 0]);

    let tree = load_str("sep: ~
range: ~
rgb: [1, 2, 3]
", Format::Yaml).unwrap();
    let layout: Layout = tree.convert_to().unwrap();
    assert_eq!(layout.sep, '\0');
    assert_eq!(layout.range, (0, String::new()));
    assert_eq!(layout.rgb, [1, 2, 3]);
}

#[test]
fn present_char_field_converts() {
    #[derive(Deserialize)]
    struct Sep {
        sep: char,
    }
    let tree = load_str("sep: \",\"\n", Format::Yaml).unwrap();
    assert_eq!(tree.convert_to::<Sep>().unwrap().sep, ',');
}

#[test]
fn missing_path_converts_from_null() {
    let pool: Pool = app_tree().convert_at("nowhere").unwrap();
    assert_eq!(pool, Pool::default());
}

// ============================================================================
// Scalar coercion
// ============================================================================

#[test]
fn strings_coerce_into_numbers_and_bools() {
    let text = "server.port=8080\nserver.ssl.enabled=TRUE\nserver.timeout=30\n";
    let tree = load_str(text, Format::Properties).unwrap();
    let server: Server = tree.convert_at("server").unwrap();
    assert_eq!(server.port, 8080);
    assert_eq!(server.timeout, 30);
    assert!(server.ssl.enabled);
}

#[test]
fn numbers_coerce_into_strings() {
    #[derive(Deserialize)]
    struct Labels {
        version: String,
        build: String,
        flag: String,
    }
    let tree = load_str("version: 2.0\nbuild: 17\nflag: false\n", Format::Yaml).unwrap();
    let labels: Labels = tree.convert_to().unwrap();
    assert_eq!(labels.version, "2.0");
    assert_eq!(labels.build, "17");
    assert_eq!(labels.flag, "false");
}

#[test]
fn integral_float_fits_integer_field() {
    let tree = load_str(r#"{"min": 4.0, "max": 8}"#, Format::Json).unwrap();
    let pool: Pool = tree.convert_to().unwrap();
    assert_eq!(pool, Pool { min: 4, max: 8 });
}

#[test]
fn enums_from_strings_and_single_entry_mappings() {
    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Level {
        Debug,
        Info,
    }
    #[derive(Debug, Deserialize, PartialEq)]
    enum Sink {
        File { path: String },
        Stdout,
    }
    #[derive(Deserialize)]
    struct Logging {
        level: Level,
        sink: Sink,
        fallback: Sink,
    }
    let yaml = "level: info\nsink:\n  File:\n    path: /var/log/app.log\nfallback: Stdout\n";
    let tree = load_str(yaml, Format::Yaml).unwrap();
    let logging: Logging = tree.convert_to().unwrap();
    assert_eq!(logging.level, Level::Info);
    assert_eq!(
        logging.sink,
        Sink::File {
            path: "/var/log/app.log".to_string()
        }
    );
    assert_eq!(logging.fallback, Sink::Stdout);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn string_where_struct_expected_fails() {
    let tree = load_str("server: localhost\n", Format::Yaml).unwrap();
    let err = tree.convert_to::<AppConfig>().unwrap_err();
    assert_eq!(err.path().as_deref(), Some("server"));
    assert!(tree.try_convert_to::<AppConfig>().is_none());
}

#[test]
fn malformed_number_fails_with_location() {
    let tree = load_str("database:\n  pool:\n    min: lots\n", Format::Yaml).unwrap();
    let err = tree.convert_to::<AppConfig>().unwrap_err();
    assert_eq!(err.path().as_deref(), Some("database.pool.min"));
    assert!(err.to_string().contains("database.pool.min"));
    assert!(tree.try_convert_at::<Pool>("database.pool").is_none());
}

#[test]
fn out_of_range_integer_fails() {
    let tree = load_str("min: 70000\nmax: 1\n", Format::Yaml).unwrap();
    #[derive(Deserialize)]
    struct Small {
        #[allow(dead_code)]
        min: u16,
    }
    assert!(tree.convert_to::<Small>().is_err());
}

#[test]
fn sequence_element_failure_reports_index() {
    let yaml = "features:\n  - name: a\n    enabled: true\n  - name: b\n    enabled: maybe\n";
    let tree = load_str(yaml, Format::Yaml).unwrap();
    let err = tree.convert_to::<AppConfig>().unwrap_err();
    assert_eq!(err.path().as_deref(), Some("features.1.enabled"));
}

#[test]
fn convert_to_or_default_swallows_failures() {
    let tree = load_str("server: localhost\n", Format::Yaml).unwrap();
    let config: AppConfig = tree.convert_to_or_default();
    assert_eq!(config, AppConfig::default());
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn unknown_keys_rejected_when_configured() {
    let tree = app_tree().with_options(ConversionOptions::default().fail_on_unknown_keys(true));
    let err = tree.convert_at::<Pool>("database").unwrap_err();
    assert!(err.message().contains("unknown field `url`"), "{}", err);
    assert!(tree.convert_at::<Pool>("database.pool").is_ok());
}

#[test]
fn nulls_rejected_when_configured() {
    let mut tree = load_str("min: ~\nmax: 3\n", Format::Yaml).unwrap();
    tree.set_options(ConversionOptions::default().fail_on_null_for_primitives(true));
    assert!(tree.convert_to::<Pool>().is_err());
}

#[test]
fn missing_fields_rejected_when_configured() {
    let tree = load_str("max: 3\n", Format::Yaml)
        .unwrap()
        .with_options(ConversionOptions::strict());
    let err = tree.convert_to::<Pool>().unwrap_err();
    assert!(err.message().contains("missing field `min`"), "{}", err);
}

#[test]
fn node_level_conversion() {
    let tree = app_tree();
    let features: Vec<Feature> = tree.get("features").convert_to().unwrap();
    assert_eq!(features[0].name, "search");
    assert!(tree.get("features").try_convert_to::<Vec<u8>>().is_none());
}

#[test]
fn node_conversion_ignores_tree_options() {
    let tree = load_str("pool:\n  max: 3\n", Format::Yaml)
        .unwrap()
        .with_options(ConversionOptions::strict());
    assert!(tree.convert_at::<Pool>("pool").is_err());

    let pool: Pool = tree.get("pool").convert_to().unwrap();
    assert_eq!(pool, Pool { min: 0, max: 3 });
    assert!(tree
        .get("pool")
        .convert_with::<Pool>(tree.options())
        .is_err());
}
