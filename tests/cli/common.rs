use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

pub fn subwrap() -> Command {
    let mut cmd = Command::cargo_bin("subwrap").unwrap();
    cmd.env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

/// A module library shared by the CLI tests.
pub fn orchard_lib() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let files = [
        ("Plant.pm", "sub water = args\nsub kind = value \"plant\"\n"),
        (
            "Orchard/Tree.pm",
            "package Orchard::Tree\n\
             parent Plant\n\
             import Util::measure as height\n\
             scalar VERSION = \"1.0\"\n\
             sub add = sum\n\
             sub fruit = list \"pear\" \"apple\"\n\
             sub fail = die branch snapped\n",
        ),
        ("Util.pm", "sub measure = value 12\n"),
    ];
    for (relative, contents) in files {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    dir
}
