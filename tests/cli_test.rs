//! CLI smoke tests

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_commands() {
    Command::cargo_bin("solvetrack")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("submit"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn missing_config_fails_with_guidance() {
    Command::cargo_bin("solvetrack")
        .unwrap()
        .args(["status", "--config", "/nonexistent/config.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config"));
}

#[test]
fn submit_requires_a_file() {
    Command::cargo_bin("solvetrack")
        .unwrap()
        .arg("submit")
        .assert()
        .failure();
}
