//! What-if (dry run) integration tests for the tcp CLI.

#[path = "../common/mod.rs"]
mod common;

use common::{TestFixture, parse_json};
use predicates::prelude::*;

#[test]
fn test_what_if_writes_nothing() {
    let fx = TestFixture::new();
    fx.create_sample_tree();

    fx.tcp(&["--what-if"])
        .assert()
        .success()
        .stdout(predicate::str::contains("What if: nothing was written"))
        .stdout(predicate::str::contains("Files copied:        3"))
        .stdout(predicate::str::contains("Directories created: 3"));

    assert!(!fx.out().exists());
}

#[test]
fn test_dry_run_alias() {
    let fx = TestFixture::new();
    fx.write_src("a.txt", "a");

    fx.tcp(&["--dry-run"]).assert().success();
    fx.tcp(&["-n"]).assert().success();

    assert!(!fx.out().exists());
}

#[test]
fn test_what_if_matches_real_run() {
    let fx = TestFixture::new();
    fx.create_sample_tree();
    fx.write_src("node_modules/x/index.js", "x");
    fx.write_out("dir1/file1.txt", "existing");

    let preview = fx
        .tcp(&["-u", "overwrite", "-x", "node_modules", "--what-if", "--output", "json"])
        .output()
        .unwrap();
    let real = fx
        .tcp(&["-u", "overwrite", "-x", "node_modules", "--output", "json"])
        .output()
        .unwrap();
    assert!(preview.status.success());
    assert!(real.status.success());

    let preview = parse_json(&preview.stdout);
    let real = parse_json(&real.stdout);
    assert_eq!(preview["mode"], "dry_run");
    assert_eq!(real["mode"], "execute");
    for key in [
        "total_files",
        "total_directories",
        "files_skipped",
        "files_overwritten",
        "excluded_directories",
        "errors",
        "bytes_copied",
    ] {
        assert_eq!(preview["result"][key], real["result"][key], "{key}");
    }
    assert_eq!(real["result"]["files_overwritten"], 1);
}

#[test]
fn test_what_if_leaves_existing_files() {
    let fx = TestFixture::new();
    fx.write_src("a.txt", "new");
    fx.write_out("a.txt", "old");

    fx.tcp(&["-u", "overwrite", "--what-if"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Files overwritten:   1"));

    fx.assert_file_content(&fx.out().join("a.txt"), "old");
}

#[test]
fn test_what_if_reports_kind_conflicts() {
    let fx = TestFixture::new();
    fx.write_src("data", "file");
    fx.write_src("dir2/file3.txt", "three");
    fx.write_src("ok.txt", "fine");
    fx.write_out("data/inside.txt", "a directory where a file goes");
    fx.write_out("dir2", "a file where a directory goes");

    let preview = fx
        .tcp(&["-u", "overwrite", "--what-if", "--output", "json"])
        .output()
        .unwrap();
    let real = fx
        .tcp(&["-u", "overwrite", "--output", "json"])
        .output()
        .unwrap();
    assert_eq!(preview.status.code(), Some(1));
    assert_eq!(real.status.code(), Some(1));

    let preview = parse_json(&preview.stdout);
    let real = parse_json(&real.stdout);
    assert_eq!(real["result"]["errors"], 3);
    assert_eq!(real["result"]["total_files"], 1);
    assert_eq!(preview["result"], {
        let mut expected = real["result"].clone();
        expected["duration_ms"] = preview["result"]["duration_ms"].clone();
        expected
    });
}
