//! CLI smoke tests over the fixture project.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture_descriptor() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/project/game.project")
}

#[test]
fn bundle_writes_descriptor_and_archive() {
    let build_dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("project-bundler")
        .unwrap()
        .arg("bundle")
        .arg("--project")
        .arg(fixture_descriptor())
        .arg("--build-dir")
        .arg(build_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("game.projectc"))
        .stdout(predicate::str::contains("game.darc"));

    assert!(build_dir.path().join("game.projectc").is_file());
    assert!(build_dir.path().join("game.darc").is_file());
    assert!(build_dir.path().join("data/readme.txt").is_file());
}

#[test]
fn inspect_lists_archive_entries() {
    let build_dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("project-bundler")
        .unwrap()
        .arg("bundle")
        .arg("--project")
        .arg(fixture_descriptor())
        .arg("--build-dir")
        .arg(build_dir.path())
        .assert()
        .success();

    Command::cargo_bin("project-bundler")
        .unwrap()
        .arg("inspect")
        .arg(build_dir.path().join("game.darc"))
        .assert()
        .success()
        .stdout(predicate::str::contains("2 entries"))
        .stdout(predicate::str::contains("data/readme.txt"))
        .stdout(predicate::str::contains("data/tuning.bin"));
}

#[test]
fn missing_descriptor_fails() {
    Command::cargo_bin("project-bundler")
        .unwrap()
        .arg("bundle")
        .arg("--project")
        .arg("/no/such/game.project")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn inspect_rejects_non_archives() {
    Command::cargo_bin("project-bundler")
        .unwrap()
        .arg("inspect")
        .arg(fixture_descriptor())
        .assert()
        .failure()
        .stderr(predicate::str::contains("magic"));
}
