//! Error handling and exit codes of the tcp CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_source_not_found() {
    let fx = TestFixture::new();

    cargo_bin_cmd!("tcp")
        .arg(fx.src.path().join("missing"))
        .arg(fx.out())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[source_not_found]"));

    assert!(!fx.out().exists());
}

#[test]
fn test_source_is_a_file() {
    let fx = TestFixture::new();
    fx.write_src("file.txt", "x");

    cargo_bin_cmd!("tcp")
        .arg(fx.src.path().join("file.txt"))
        .arg(fx.out())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error[invalid_input]"))
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn test_invalid_glob_is_rejected() {
    let fx = TestFixture::new();
    fx.write_src("a.txt", "a");

    fx.tcp(&["-x", "[abc"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid exclusion pattern"));

    assert!(!fx.out().exists());
}

#[test]
fn test_path_pattern_is_rejected() {
    let fx = TestFixture::new();
    fx.write_src("a.txt", "a");

    fx.tcp(&["-x", "src/target"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error[invalid_input]"));
}

#[test]
fn test_zero_throttle_is_rejected() {
    let fx = TestFixture::new();
    fx.write_src("a.txt", "a");

    fx.tcp(&["-j", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("at least 1"));
}

#[test]
fn test_unknown_update_mode() {
    let fx = TestFixture::new();

    fx.tcp(&["-u", "sometimes"]).assert().code(2);
}

#[test]
fn test_entry_errors_are_counted_and_run_continues() {
    let fx = TestFixture::new();
    // A file cannot replace a directory at the destination.
    fx.write_src("data", "file");
    fs::create_dir_all(fx.out().join("data")).unwrap();
    fx.write_src("ok.txt", "fine");

    fx.tcp(&["-u", "overwrite"])
        .env_remove("RUST_LOG")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Errors:              1"))
        .stderr(predicate::str::contains("Failed to copy"));

    fx.assert_file_content(&fx.out().join("ok.txt"), "fine");
    assert!(fx.out().join("data").is_dir());
}

#[test]
fn test_quiet_hides_warnings() {
    let fx = TestFixture::new();
    fx.write_src("data", "file");
    fs::create_dir_all(fx.out().join("data")).unwrap();

    fx.tcp(&["-u", "overwrite", "-q"])
        .env_remove("RUST_LOG")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to copy").not());
}

#[test]
fn test_destination_blocked_by_file() {
    let fx = TestFixture::new();
    fx.write_src("a.txt", "a");
    fs::write(fx.out(), "in the way").unwrap();

    fx.tcp(&[])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to prepare destination"));
}
