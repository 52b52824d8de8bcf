//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn rconfig(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rconfig"));
    cmd.current_dir(dir.path());
    for var in [
        "R_RCONFIG_FILE",
        "R_RCONFIG_EVAL",
        "R_RCONFIG_FLATTEN",
        "R_RCONFIG_DEBUG",
        "R_RCONFIG_SEP",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rconfig"));
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("rconfig"));
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rconfig"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("flatten"))
        .stdout(predicate::str::contains("nest"));
}

#[test]
fn test_resolve_layers_default_file_flags_and_set() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("rconfig.yml"), "db:\n  host: a\n").expect("write");

    let output = rconfig(&tmp)
        .args(["resolve", "--set", "db.host=b", "--", "--db.port", "5432"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json, serde_json::json!({ "db": { "host": "b", "port": 5432 } }));
}

#[test]
fn test_resolve_explicit_files_in_order() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("a.yml"), "name: first\nkeep: 1\n").expect("write");
    fs::write(tmp.path().join("b.toml"), "name = \"second\"\n").expect("write");

    rconfig(&tmp)
        .args(["resolve", "-c", "a.yml", "-c", "b.toml", "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: second"))
        .stdout(predicate::str::contains("keep: 1"));
}

#[test]
fn test_resolve_debug_prints_trace() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("rconfig.yml"), "a: 1\n").expect("write");

    let output = rconfig(&tmp)
        .args(["resolve", "--debug", "--", "-j", r#"{"b": 2}"#])
        .output()
        .expect("run");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["a"], serde_json::json!(1));
    assert_eq!(json["b"], serde_json::json!(2));
    assert_eq!(json["trace"]["type"], serde_json::json!("merged"));
    assert_eq!(json["trace"]["sources"][0]["kind"], serde_json::json!("default_file"));
    assert_eq!(json["trace"]["sources"][1]["kind"], serde_json::json!("inline_string"));
}

#[test]
fn test_resolve_debug_from_environment() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("rconfig.yml"), "a: 1\n").expect("write");

    rconfig(&tmp)
        .env("R_RCONFIG_DEBUG", "TRUE")
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"trace\""));
}

#[test]
fn test_resolve_flatten() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(
        tmp.path().join("rconfig.yml"),
        "user:\n  name: Jack\n  roles: [a, b]\n",
    )
    .expect("write");

    let output = rconfig(&tmp).args(["resolve", "--flatten"]).output().expect("run");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json, serde_json::json!({ "user.name": "Jack", "user.roles": ["a", "b"] }));
}

#[test]
fn test_resolve_eval_toggle() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("rconfig.yml"), "a: !expr upper('x')\n").expect("write");

    rconfig(&tmp)
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"X\""));

    rconfig(&tmp)
        .args(["resolve", "--eval", "false"])
        .assert()
        .success()
        .stdout(predicate::str::contains("!expr upper('x')"));
}

#[test]
fn test_resolve_rejects_invalid_eval_value() {
    let tmp = TempDir::new().expect("tmp");
    rconfig(&tmp)
        .args(["resolve", "--eval", "maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected a boolean"));
}

#[test]
fn test_resolve_missing_file_fails() {
    let tmp = TempDir::new().expect("tmp");
    rconfig(&tmp)
        .args(["resolve", "-c", "absent.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.yml"));
}

#[test]
fn test_resolve_duplicate_set_fails() {
    let tmp = TempDir::new().expect("tmp");
    rconfig(&tmp)
        .args(["resolve", "--set", "a=1", "--set", "a=2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("more than once"));
}

#[test]
fn test_flatten_and_nest_commands() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("nested.json"), r#"{"a": {"b": 1, "c": 2}}"#).expect("write");
    fs::write(tmp.path().join("flat.json"), r#"{"a.b": 1, "a.c": 2}"#).expect("write");

    let output = rconfig(&tmp).args(["flatten", "nested.json"]).output().expect("run");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json, serde_json::json!({ "a.b": 1, "a.c": 2 }));

    let output = rconfig(&tmp).args(["nest", "flat.json"]).output().expect("run");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json, serde_json::json!({ "a": { "b": 1, "c": 2 } }));
}

#[test]
fn test_nest_reports_conflicts() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("flat.json"), r#"{"a": 1, "a.b": 2}"#).expect("write");

    rconfig(&tmp)
        .args(["nest", "flat.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("naming error"));
}
