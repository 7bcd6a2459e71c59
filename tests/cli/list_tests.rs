use super::common::{orchard_lib, subwrap};
use predicates::prelude::*;

#[test]
fn list_prints_callables_only() {
    let lib = orchard_lib();
    subwrap()
        .arg("-I")
        .arg(lib.path())
        .args(["list", "Orchard::Tree"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Orchard::Tree::add"))
        .stdout(predicate::str::contains("Orchard::Tree::height"))
        .stdout(predicate::str::contains("VERSION").not())
        .stdout(predicate::str::contains("Orchard::Tree::water").not())
        .stderr(predicate::str::contains("Plant"));
}

#[test]
fn list_unknown_namespace_fails() {
    let lib = orchard_lib();
    subwrap()
        .arg("-I")
        .arg(lib.path())
        .args(["list", "Nowhere::Near"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Can't locate Nowhere/Near.pm"));
}
