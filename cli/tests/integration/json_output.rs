//! JSON output of the tcp CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{TestFixture, parse_json};

#[test]
fn test_json_summary_shape() {
    let fx = TestFixture::new();
    fx.create_sample_tree();

    let output = fx.tcp(&["--output", "json"]).output().unwrap();
    assert!(output.status.success());

    let value = parse_json(&output.stdout);
    assert_eq!(value["schema_version"], "1.0");
    assert_eq!(value["mode"], "execute");
    assert_eq!(value["update_mode"], "skip");
    assert!(value["source"].is_string());
    assert!(value["destination"].is_string());

    let result = &value["result"];
    assert_eq!(result["total_files"], 3);
    assert_eq!(result["total_directories"], 3);
    assert_eq!(result["files_skipped"], 0);
    assert_eq!(result["files_overwritten"], 0);
    assert_eq!(result["excluded_directories"], 0);
    assert_eq!(result["errors"], 0);
    assert_eq!(result["bytes_copied"], 11);
    assert!(result["duration_ms"].is_u64());
}

#[test]
fn test_json_stdout_is_a_single_document() {
    let fx = TestFixture::new();
    fx.write_src("a.txt", "a");

    let output = fx.tcp(&["--output", "json", "-v"]).output().unwrap();
    assert!(output.status.success());

    // Logs go to stderr, so stdout parses as exactly one value.
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim().lines().count(), 1);
    parse_json(stdout.as_bytes());
}

#[test]
fn test_json_update_mode_names() {
    for (flag, name) in [
        ("skip", "skip"),
        ("overwrite", "overwrite"),
        ("if-newer", "if_newer"),
    ] {
        let fx = TestFixture::new();
        fx.write_src("a.txt", "a");
        let output = fx.tcp(&["--output", "json", "-u", flag]).output().unwrap();
        assert!(output.status.success());
        assert_eq!(parse_json(&output.stdout)["update_mode"], name);
    }
}

#[test]
fn test_json_fatal_error() {
    let fx = TestFixture::new();

    let output = cargo_bin_cmd!("tcp")
        .arg(fx.src.path().join("missing"))
        .arg(fx.out())
        .args(["--output", "json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let value = parse_json(&output.stdout);
    assert_eq!(value["error"]["code"], "source_not_found");
    assert!(value["error"]["message"].as_str().unwrap().contains("missing"));
}

#[test]
fn test_json_reports_errors_with_failing_exit() {
    let fx = TestFixture::new();
    fx.write_src("data", "file");
    std::fs::create_dir_all(fx.out().join("data")).unwrap();

    let output = fx
        .tcp(&["--output", "json", "-u", "overwrite"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(parse_json(&output.stdout)["result"]["errors"], 1);
}
