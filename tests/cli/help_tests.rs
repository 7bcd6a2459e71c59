use super::common::subwrap;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    subwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("call"));
}

#[test]
fn call_help_shows_wrapping_options() {
    subwrap()
        .args(["call", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--package"))
        .stdout(predicate::str::contains("--inherited"))
        .stdout(predicate::str::contains("--always-post"));
}

#[test]
fn missing_subcommand_fails() {
    subwrap().assert().failure();
}
