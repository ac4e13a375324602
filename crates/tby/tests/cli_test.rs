//! Integration tests for the `tby` CLI binary.
//!
//! These exercise argument parsing, config loading and the read-only
//! commands against throwaway config files. Nothing here launches a tunnel.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::NamedTempFile;

// ── Helpers ─────────────────────────────────────────────────────────

const SAMPLE: &str = "\
tunnels:
- type: ssh
  user: root
  node_name: db
  remote_port: 5432
  local_port: 5432
- type: k8s
  context: gke-cluster
  resource_namespace: default
  resource_kind: svc
  resource_name: web-server
  remote_port: 8080
  local_port: 80
";

/// Build a [`Command`] for the `tby` binary with env isolation.
///
/// Clears `TBY_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn tby_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("tby");
    cmd.env("HOME", "/tmp/tby-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/tby-cli-test-nonexistent")
        .env_remove("TBY_CONFIG")
        .env_remove("TBY_INVALID_RECORDS")
        .env_remove("RUST_LOG");
    cmd
}

/// Write `contents` to a temp file usable as `--config`.
fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// `tby --config <file> <args>`.
fn tby_with(file: &NamedTempFile, args: &[&str]) -> assert_cmd::Command {
    let mut cmd = tby_cmd();
    cmd.arg("--config").arg(file.path()).args(args);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = tby_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    tby_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("port-forward")
            .and(predicate::str::contains("up"))
            .and(predicate::str::contains("down"))
            .and(predicate::str::contains("list")),
    );
}

#[test]
fn test_version_flag() {
    tby_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tby"));
}

#[test]
fn test_completions_bash() {
    tby_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tby"));
}

// ── Script helpers ──────────────────────────────────────────────────

#[test]
fn test_port_prints_local_port() {
    let file = config_file(SAMPLE);
    tby_with(&file, &["port", "1"])
        .assert()
        .success()
        .stdout("80\n");
}

#[test]
fn test_host_prints_localhost_and_port() {
    let file = config_file(SAMPLE);
    tby_with(&file, &["host", "0"])
        .assert()
        .success()
        .stdout("localhost:5432\n");
}

#[test]
fn test_config_env_var_is_honored() {
    let file = config_file(SAMPLE);
    tby_cmd()
        .env("TBY_CONFIG", file.path())
        .args(["port", "0"])
        .assert()
        .success()
        .stdout("5432\n");
}

#[test]
fn test_legacy_field_names_decode() {
    let file = config_file(
        "tunnels:\n- type: ssh\n  user: root\n  nodeName: db\n  remotePort: 5432\n  localPort: 15432\n",
    );
    tby_with(&file, &["port", "0"])
        .assert()
        .success()
        .stdout("15432\n");
}

// ── list ────────────────────────────────────────────────────────────

#[test]
fn test_list_shows_table() {
    let file = config_file(SAMPLE);
    tby_with(&file, &["--color", "never", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Id")
                .and(predicate::str::contains("Status"))
                .and(predicate::str::contains("root@db"))
                .and(predicate::str::contains("5432:5432"))
                .and(predicate::str::contains("svc/web-server"))
                .and(predicate::str::contains("80:8080")),
        );
}

#[test]
fn test_ls_alias_plain_output() {
    let file = config_file(SAMPLE);
    tby_with(&file, &["-o", "plain", "ls"])
        .assert()
        .success()
        .stdout("0\n1\n");
}

#[test]
fn test_list_json_output() {
    let file = config_file(SAMPLE);
    let output = tby_with(&file, &["-o", "json", "list"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["type"], "ssh");
    assert_eq!(value[1]["name"], "svc/web-server");
    assert_eq!(value[1]["local_port"], 80);
}

#[test]
fn test_list_empty_config() {
    let file = config_file("");
    tby_with(&file, &["-o", "plain", "list"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ── config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_prints_override() {
    let file = config_file(SAMPLE);
    tby_with(&file, &["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(file.path().to_string_lossy().as_ref()));
}

#[test]
fn test_config_show_prints_signatures() {
    let file = config_file(SAMPLE);
    tby_with(&file, &["-o", "plain", "config", "show"])
        .assert()
        .success()
        .stdout(
            "tsh ssh -NL 5432:localhost:5432 root@db\n\
             kubectl port-forward --context gke-cluster -n default svc/web-server 80:8080\n",
        );
}

// ── Error handling ──────────────────────────────────────────────────

#[test]
fn test_non_numeric_id_is_usage_error() {
    let file = config_file(SAMPLE);
    let output = tby_with(&file, &["up", "abc"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("Failed to parse ID"), "{text}");
}

#[test]
fn test_out_of_range_id_is_not_found() {
    let file = config_file(SAMPLE);
    let output = tby_with(&file, &["up", "5"]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    let text = combined_output(&output);
    assert!(text.contains("Tunnel 5 not found"), "{text}");
}

#[test]
fn test_down_without_process_is_not_found() {
    let file = config_file(
        "tunnels:\n- type: ssh\n  user: nobody\n  node_name: tby-cli-test-host\n  remote_port: 1\n  local_port: 1\n",
    );
    let output = tby_with(&file, &["down", "0"]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    let text = combined_output(&output);
    assert!(text.contains("is not running"), "{text}");
}

#[test]
fn test_invalid_type_is_config_error() {
    let file = config_file("tunnels:\n- type: invalid\n");
    let output = tby_with(&file, &["list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("Can't parse tby config file"), "{text}");
}

#[test]
fn test_invalid_type_skipped_by_env_setting() {
    let file = config_file(&format!("{SAMPLE}- type: invalid\n"));
    tby_with(&file, &["-o", "plain", "list"])
        .env("TBY_INVALID_RECORDS", "skip")
        .assert()
        .success()
        .stdout("0\n1\n");
}

#[test]
fn test_missing_config_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = tby_cmd()
        .arg("--config")
        .arg(dir.path().join("tby.yml"))
        .arg("list")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("Can't load tby config file"), "{text}");
}
