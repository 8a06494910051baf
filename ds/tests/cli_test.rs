//! CLI smoke tests for the ds binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("ds").expect("binary builds");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("stats"));
}

#[test]
fn list_on_empty_store() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = Command::cargo_bin("ds").expect("binary builds");
    cmd.arg("--dir")
        .arg(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No sessions found"));
}

#[test]
fn show_missing_session_fails() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = Command::cargo_bin("ds").expect("binary builds");
    cmd.arg("--dir")
        .arg(dir.path())
        .arg("show")
        .arg("does-not-exist")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session not found"));
}
