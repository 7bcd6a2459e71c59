use super::common::{orchard_lib, subwrap};
use predicates::prelude::*;
use std::fs;

#[test]
fn call_traces_and_returns_result() {
    let lib = orchard_lib();
    subwrap()
        .arg("-I")
        .arg(lib.path())
        .args(["call", "Orchard::Tree::add", "--args", "[2, 3]"])
        .assert()
        .success()
        .stdout(predicate::str::diff("5\n"))
        .stderr(predicate::str::contains("Orchard::Tree::add(2, 3) [single]"))
        .stderr(predicate::str::contains("Orchard::Tree::add = (5) [single]"));
}

#[test]
fn sequence_shape_returns_all_values() {
    let lib = orchard_lib();
    subwrap()
        .arg("-I")
        .arg(lib.path())
        .args(["call", "Orchard::Tree::fruit", "--shape", "sequence"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[\"pear\",\"apple\"]\n"));
}

#[test]
fn void_shape_prints_null() {
    let lib = orchard_lib();
    subwrap()
        .arg("-I")
        .arg(lib.path())
        .args(["call", "Orchard::Tree::fruit", "--shape", "void"])
        .assert()
        .success()
        .stdout(predicate::str::diff("null\n"))
        .stderr(predicate::str::contains("Orchard::Tree::fruit = () [void]"));
}

#[test]
fn quiet_suppresses_trace_lines() {
    let lib = orchard_lib();
    subwrap()
        .arg("-q")
        .arg("-I")
        .arg(lib.path())
        .args(["call", "Orchard::Tree::add", "--args", "[1]"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1\n"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn inherited_method_is_traced_through_forwarder() {
    let lib = orchard_lib();
    subwrap()
        .arg("-I")
        .arg(lib.path())
        .args([
            "call",
            "Orchard::Tree::water",
            "--method",
            "--inherited",
            "--shape",
            "sequence",
            "--args",
            "[\"daily\"]",
        ])
        .assert()
        .success()
        .stdout(predicate::str::diff("[\"Orchard::Tree\",\"daily\"]\n"))
        .stderr(predicate::str::contains(
            "Orchard::Tree::water(\"Orchard::Tree\", \"daily\")",
        ));
}

#[test]
fn failing_call_reports_error() {
    let lib = orchard_lib();
    subwrap()
        .arg("-I")
        .arg(lib.path())
        .args(["call", "Orchard::Tree::fail"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("branch snapped"))
        .stderr(predicate::str::contains("Orchard::Tree::fail = ").not());
}

#[test]
fn always_post_traces_failed_calls() {
    let lib = orchard_lib();
    subwrap()
        .arg("-I")
        .arg(lib.path())
        .args(["call", "Orchard::Tree::fail", "--always-post"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Orchard::Tree::fail = () [single]"));
}

#[test]
fn options_file_selects_targets() {
    let lib = orchard_lib();
    let options = lib.path().join("wrap.toml");
    fs::write(&options, "packages = [\"Util\"]\n").unwrap();

    subwrap()
        .arg("-I")
        .arg(lib.path())
        .args(["call", "Orchard::Tree::add", "--args", "[4]", "--options"])
        .arg(&options)
        .assert()
        .success()
        .stdout(predicate::str::diff("4\n"))
        .stderr(predicate::str::contains("Orchard::Tree::add").not());
}

#[test]
fn unknown_option_key_is_rejected() {
    let lib = orchard_lib();
    let options = lib.path().join("wrap.json");
    fs::write(&options, "{\"packages\": [], \"wrap_everything\": true}").unwrap();

    subwrap()
        .arg("-I")
        .arg(lib.path())
        .args(["call", "Orchard::Tree::add", "--options"])
        .arg(&options)
        .assert()
        .failure()
        .stderr(predicate::str::contains("wrap_everything"));
}

#[test]
fn malformed_package_pattern_is_rejected() {
    let lib = orchard_lib();
    subwrap()
        .arg("-I")
        .arg(lib.path())
        .args(["call", "Orchard::Tree::add", "-p", "Orchard::*::Tree"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Orchard::*::Tree"));
}

#[test]
fn unqualified_target_is_rejected() {
    subwrap()
        .args(["call", "add"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a fully qualified name"));
}
