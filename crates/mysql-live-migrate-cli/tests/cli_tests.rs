//! CLI integration tests for mysql-live-migrate.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for various error conditions.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the mysql-live-migrate binary.
fn cmd() -> Command {
    Command::cargo_bin("mysql-live-migrate").unwrap()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("health-check"));
}

#[test]
fn test_run_subcommand_help() {
    cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mysql-live-migrate"));
}

// =============================================================================
// Configuration Error Tests
// =============================================================================

#[test]
fn test_missing_config_file_fails() {
    cmd()
        .args(["--config", "/nonexistent/config.yaml", "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_invalid_config_fails_with_config_exit_code() {
    let path = std::env::temp_dir().join("mysql-live-migrate-cli-test-invalid.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    // origin == destination is rejected by validation
    writeln!(
        file,
        "database:\n  host: localhost\n  database: app\n  user: root\n  password: x\n\
         migration:\n  origin: users\n  destination: users"
    )
    .unwrap();

    cmd()
        .args(["--config", path.to_str().unwrap(), "run"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Configuration error"));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_unparseable_yaml_fails() {
    let path = std::env::temp_dir().join("mysql-live-migrate-cli-test-bad-yaml.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "database: [not, a, mapping").unwrap();

    cmd()
        .args(["--config", path.to_str().unwrap(), "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));

    std::fs::remove_file(&path).ok();
}
