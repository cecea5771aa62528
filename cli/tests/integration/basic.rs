//! Basic functionality integration tests for the tcp CLI.

#[path = "../common/mod.rs"]
mod common;

use common::TestFixture;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_copy_tree() {
    let fx = TestFixture::new();
    fx.create_sample_tree();

    fx.tcp(&[])
        .assert()
        .success()
        .stdout(predicate::str::contains("Files copied:        3"))
        .stdout(predicate::str::contains("Directories created: 3"));

    fx.assert_file_content(&fx.out().join("dir1/file1.txt"), "one");
    fx.assert_file_content(&fx.out().join("dir1/subdir1/file2.txt"), "two");
    fx.assert_file_content(&fx.out().join("dir2/file3.txt"), "three");
}

#[test]
fn test_copy_creates_empty_directories() {
    let fx = TestFixture::new();
    fs::create_dir_all(fx.src.path().join("empty/inner")).unwrap();

    fx.tcp(&[]).assert().success();

    assert!(fx.out().join("empty/inner").is_dir());
}

#[test]
fn test_rerun_copies_nothing() {
    let fx = TestFixture::new();
    fx.create_sample_tree();

    fx.tcp(&[]).assert().success();
    fx.tcp(&[])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to copy (3 files already exist)"));
}

#[test]
fn test_parallel_copy() {
    let fx = TestFixture::new();
    for d in 0..5 {
        for f in 0..20 {
            fx.write_src(&format!("d{d}/f{f}.txt"), &format!("{d}/{f}"));
        }
    }

    fx.tcp(&["-j", "8"]).assert().success();

    assert_eq!(fx.count_files_recursive(&fx.out()), 100);
    fx.assert_file_content(&fx.out().join("d3/f17.txt"), "3/17");
}

#[test]
fn test_exclude_directories() {
    let fx = TestFixture::new();
    fx.write_src("app/main.rs", "fn main() {}");
    fx.write_src("target/debug/app", "binary");
    fx.write_src("app/.git/HEAD", "ref");
    fx.write_src("logs.old/a.log", "log");

    fx.tcp(&["-x", "target", "-x", ".git", "-x", "*.old"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Excluded dirs:       3"));

    assert!(fx.out().join("app/main.rs").exists());
    assert!(!fx.out().join("target").exists());
    assert!(!fx.out().join("app/.git").exists());
    assert!(!fx.out().join("logs.old").exists());
}

#[test]
fn test_exclude_pattern_with_stray_spaces() {
    let fx = TestFixture::new();
    fx.write_src("app/main.rs", "fn main() {}");
    fx.write_src("node_modules/left-pad/index.js", "pad");

    fx.tcp(&["-x", "node_modules "])
        .assert()
        .success()
        .stdout(predicate::str::contains("Excluded dirs:       1"));

    assert!(!fx.out().join("node_modules").exists());
}

#[test]
fn test_no_recurse() {
    let fx = TestFixture::new();
    fx.write_src("top.txt", "top");
    fx.write_src("sub/deep.txt", "deep");

    fx.tcp(&["--no-recurse"]).assert().success();

    assert!(fx.out().join("top.txt").exists());
    assert!(fx.out().join("sub").is_dir());
    assert!(!fx.out().join("sub/deep.txt").exists());
}

#[test]
fn test_quiet_still_prints_summary() {
    let fx = TestFixture::new();
    fx.write_src("a.txt", "a");

    fx.tcp(&["-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Files copied:        1"));
}

#[test]
fn test_verbose_logs_entries() {
    let fx = TestFixture::new();
    fx.write_src("a.txt", "a");

    fx.tcp(&["-v"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("copied"))
        .stderr(predicate::str::contains("a.txt"));
}

#[test]
fn test_help_lists_options() {
    assert_cmd::cargo::cargo_bin_cmd!("tcp")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--update"))
        .stdout(predicate::str::contains("--exclude"))
        .stdout(predicate::str::contains("--what-if"))
        .stdout(predicate::str::contains("--throttle"));
}
