//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to get a yardbook command isolated from the user's config
pub fn yardbook() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("yardbook"));
    cmd.env("YARDBOOK_CONFIG", "/nonexistent/yardbook/config.yaml")
        .env("YARDBOOK_AUTHOR", "tester")
        .env_remove("YARDBOOK_LOG")
        .env_remove("YARDBOOK_CURRENCY")
        .env_remove("YARDBOOK_GAUGE");
    cmd
}

/// Helper to create a test collection in a temp directory
pub fn setup_test_collection() -> TempDir {
    let tmp = TempDir::new().unwrap();
    yardbook().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

fn stdout_line(output: std::process::Output) -> String {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to create a test purchase; returns its short ID
pub fn create_test_purchase(tmp: &TempDir, manufacturer: &str, catalog_number: &str) -> String {
    let output = yardbook()
        .current_dir(tmp.path())
        .args([
            "purchase",
            "new",
            "--manufacturer",
            manufacturer,
            "--catalog-number",
            catalog_number,
            "-f",
            "short-id",
        ])
        .output()
        .unwrap();
    stdout_line(output)
}

/// Helper to add a model with a running number; returns its short ID
pub fn add_test_model(tmp: &TempDir, purchase: &str, number: &str) -> String {
    let output = yardbook()
        .current_dir(tmp.path())
        .args(["model", "add", purchase, "--number", number, "-f", "short-id"])
        .output()
        .unwrap();
    stdout_line(output)
}

/// Helper to add an accessory; returns its short ID
pub fn add_test_accessory(tmp: &TempDir, purchase: &str, description: &str) -> String {
    let output = yardbook()
        .current_dir(tmp.path())
        .args(["acc", "add", purchase, "--description", description, "-f", "short-id"])
        .output()
        .unwrap();
    stdout_line(output)
}

/// Full ID of a record given any reference to it
pub fn full_id(tmp: &TempDir, kind: &str, reference: &str) -> String {
    let output = yardbook()
        .current_dir(tmp.path())
        .args([kind, "show", reference, "-f", "id"])
        .output()
        .unwrap();
    stdout_line(output)
}

/// Path of a record file given its full ID
pub fn record_path(tmp: &TempDir, id: &str) -> PathBuf {
    let dir = match &id[..3] {
        "PUR" => "purchases",
        "MDL" => "models",
        "ACC" => "accessories",
        other => panic!("unknown prefix {other}"),
    };
    tmp.path().join(dir).join(format!("{id}.yb.yaml"))
}

/// Parsed contents of a record file
pub fn read_record(path: &Path) -> serde_yml::Value {
    serde_yml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Change one field of a record file the way a hand edit would
pub fn set_field(path: &Path, field: &str, value: impl Into<serde_yml::Value>) {
    let mut record = read_record(path);
    record[field] = value.into();
    std::fs::write(path, serde_yml::to_string(&record).unwrap()).unwrap();
}

/// Running numbers of a purchase's models in list order
pub fn model_numbers(tmp: &TempDir, purchase: &str) -> Vec<String> {
    let output = yardbook()
        .current_dir(tmp.path())
        .args(["model", "list", purchase, "-f", "tsv"])
        .output()
        .unwrap();
    let stdout = stdout_line(output);

    let mut lines = stdout.lines();
    let header: Vec<&str> = lines.next().unwrap_or_default().split('\t').collect();
    let column = header.iter().position(|h| *h == "NUMBER").unwrap();
    lines
        .map(|l| l.split('\t').nth(column).unwrap_or_default().to_string())
        .collect()
}

/// Short IDs of a purchase's accessories in list order
pub fn accessory_ids(tmp: &TempDir, purchase: &str) -> Vec<String> {
    let output = yardbook()
        .current_dir(tmp.path())
        .args(["acc", "list", purchase, "-f", "short-id"])
        .output()
        .unwrap();
    stdout_line(output)
        .lines()
        .map(str::to_string)
        .collect()
}
