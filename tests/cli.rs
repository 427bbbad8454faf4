//! CLI-surface integration tests: `-h/--help` and `-v/--version` exit 0,
//! unknown flags exit 1, positional arguments are rejected.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_flag_exits_zero_and_prints_usage() {
    Command::cargo_bin("typetrace_backend")
        .expect("binary should build")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_exits_zero() {
    Command::cargo_bin("typetrace_backend")
        .expect("binary should build")
        .arg("--version")
        .assert()
        .success();
}

#[test]
fn unknown_flag_exits_nonzero() {
    Command::cargo_bin("typetrace_backend")
        .expect("binary should build")
        .arg("--not-a-real-flag")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn positional_argument_is_rejected() {
    Command::cargo_bin("typetrace_backend")
        .expect("binary should build")
        .arg("some-positional-arg")
        .assert()
        .failure()
        .code(1);
}
