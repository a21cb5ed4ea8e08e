//! Integration tests for the `cup` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the get, dump
//! and keys subcommands through the actual binary, including stdin input,
//! file output, coercion flags and error exits.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

fn yaml_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/app.yaml")
}

fn properties_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/app.properties")
}

fn cup() -> Command {
    Command::cargo_bin("cup").unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// get
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn get_scalar_from_file() {
    cup()
        .args(["get", "server.port", "-i", yaml_path()])
        .assert()
        .success()
        .stdout("8080\n");
}

#[test]
fn get_structure_prints_json() {
    let output = cup()
        .args(["get", "database.pool", "-i", yaml_path()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, serde_json::json!({"min": 2, "max": 16}));
}

#[test]
fn get_missing_path_fails() {
    cup()
        .args(["get", "server.timeout", "-i", yaml_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no value at `server.timeout`"));
}

#[test]
fn get_with_bool_coercion() {
    cup()
        .args(["get", "server.ssl.enabled", "--as", "bool", "-i", properties_path()])
        .assert()
        .success()
        .stdout("true\n");
}

#[test]
fn get_with_failing_coercion() {
    cup()
        .args(["get", "server.name", "--as", "int", "-i", properties_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot convert"));
}

#[test]
fn get_from_stdin_requires_format() {
    cup()
        .args(["get", "a.b"])
        .write_stdin("a:\n  b: 1\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--format is required"));
}

#[test]
fn get_from_stdin_with_format() {
    cup()
        .args(["get", "a.b", "-f", "toml"])
        .write_stdin("[a]\nb = 1\n")
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn unknown_format_name_fails() {
    cup()
        .args(["get", "a", "-f", "ini"])
        .write_stdin("a=1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown format: 'ini'"));
}

#[test]
fn unsupported_extension_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.ini");
    std::fs::write(&path, "a=1\n").unwrap();
    cup()
        .args(["get", "a", "-i"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported document format"));
}

// ─────────────────────────────────────────────────────────────────────────────
// dump
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn dump_subtree_to_stdout() {
    let output = cup()
        .args(["dump", "-i", yaml_path(), "--at", "server.ssl"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value,
        serde_json::json!({"enabled": true, "protocols": ["TLSv1.2", "TLSv1.3"]})
    );
}

#[test]
fn dump_stringifies_non_string_keys() {
    let output = cup()
        .args(["dump", "-f", "yaml"])
        .write_stdin("~: a\nb: 1\n7: seven\n")
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value,
        serde_json::json!({"null": "a", "b": 1, "7": "seven"})
    );
}

#[test]
fn dump_properties_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.json");
    cup()
        .args(["dump", "-i", properties_path(), "-o"])
        .arg(&out)
        .assert()
        .success();
    let content = std::fs::read_to_string(&out).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["server"]["port"], "8080");
    assert_eq!(value["server"]["ssl"]["enabled"], "TRUE");
}

// ─────────────────────────────────────────────────────────────────────────────
// keys
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn keys_of_root_in_document_order() {
    cup()
        .args(["keys", "-i", yaml_path()])
        .assert()
        .success()
        .stdout("server\ndatabase\n");
}

#[test]
fn keys_of_leaf_fails() {
    cup()
        .args(["keys", "server.port", "-i", yaml_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a mapping"));
}

#[test]
fn verbose_logs_to_stderr_only() {
    cup()
        .args(["-v", "get", "server.host", "-i", yaml_path()])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stdout("0.0.0.0\n")
        .stderr(predicate::str::contains("loading document"));
}
