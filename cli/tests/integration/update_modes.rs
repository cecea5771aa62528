//! Update mode behavior of the tcp CLI, at several throttle levels.

#[path = "../common/mod.rs"]
mod common;

use common::{TestFixture, parse_json};
use filetime::{FileTime, set_file_mtime};
use rstest::rstest;
use std::fs;

/// Ten source files, five of which already exist at the destination.
fn half_present() -> TestFixture {
    let fx = TestFixture::new();
    for i in 0..10 {
        fx.write_src(&format!("file{i}.txt"), &format!("new {i}"));
    }
    for i in 0..5 {
        fx.write_out(&format!("file{i}.txt"), "old");
    }
    fx
}

fn run_json(fx: &TestFixture, extra: &[&str]) -> serde_json::Value {
    let mut args = vec!["--output", "json"];
    args.extend_from_slice(extra);
    let output = fx.tcp(&args).output().unwrap();
    assert!(output.status.success(), "tcp failed: {output:?}");
    parse_json(&output.stdout)["result"].clone()
}

#[rstest]
#[case("1")]
#[case("4")]
#[case("16")]
fn test_skip_is_default(#[case] throttle: &str) {
    let fx = half_present();

    let result = run_json(&fx, &["-j", throttle]);

    assert_eq!(result["total_files"], 5);
    assert_eq!(result["files_skipped"], 5);
    assert_eq!(result["files_overwritten"], 0);
    fx.assert_file_content(&fx.out().join("file0.txt"), "old");
    fx.assert_file_content(&fx.out().join("file9.txt"), "new 9");
}

#[rstest]
#[case("1")]
#[case("4")]
#[case("16")]
fn test_overwrite(#[case] throttle: &str) {
    let fx = half_present();

    let result = run_json(&fx, &["-u", "overwrite", "-j", throttle]);

    assert_eq!(result["total_files"], 10);
    assert_eq!(result["files_overwritten"], 5);
    assert_eq!(result["files_skipped"], 0);
    for i in 0..10 {
        fx.assert_file_content(&fx.out().join(format!("file{i}.txt")), &format!("new {i}"));
    }
}

#[rstest]
#[case("1")]
#[case("8")]
fn test_if_newer(#[case] throttle: &str) {
    let fx = TestFixture::new();
    let old = FileTime::from_unix_time(1_600_000_000, 0);
    let new = FileTime::from_unix_time(1_700_000_000, 0);

    fx.write_src("changed.txt", "source");
    fx.write_out("changed.txt", "dest");
    set_file_mtime(fx.src.path().join("changed.txt"), new).unwrap();
    set_file_mtime(fx.out().join("changed.txt"), old).unwrap();

    fx.write_src("unchanged.txt", "source");
    fx.write_out("unchanged.txt", "dest");
    set_file_mtime(fx.src.path().join("unchanged.txt"), old).unwrap();
    set_file_mtime(fx.out().join("unchanged.txt"), old).unwrap();

    let result = run_json(&fx, &["-u", "if-newer", "-j", throttle]);

    assert_eq!(result["total_files"], 1);
    assert_eq!(result["files_overwritten"], 1);
    assert_eq!(result["files_skipped"], 1);
    fx.assert_file_content(&fx.out().join("changed.txt"), "source");
    fx.assert_file_content(&fx.out().join("unchanged.txt"), "dest");
}

#[test]
fn test_prompt_without_terminal_skips() {
    let fx = half_present();

    // stdin is not a terminal under the test harness.
    let output = fx
        .tcp(&["-u", "prompt", "--output", "json"])
        .write_stdin("y\ny\ny\ny\ny\n")
        .output()
        .unwrap();

    assert!(output.status.success());
    let result = &parse_json(&output.stdout)["result"];
    assert_eq!(result["files_skipped"], 5);
    assert_eq!(result["files_overwritten"], 0);
    fx.assert_file_content(&fx.out().join("file0.txt"), "old");
}

#[test]
fn test_counts_match_across_throttles() {
    let fx = TestFixture::new();
    for d in 0..6 {
        for f in 0..8 {
            fx.write_src(&format!("d{d}/f{f}.txt"), &format!("{d}{f}"));
        }
    }
    fx.write_src("d2/cache/blob", "x");

    let mut results = Vec::new();
    for throttle in ["1", "2", "8"] {
        let out = fx.dst.path().join(format!("out{throttle}"));
        for f in 0..8 {
            common::write_file(&out.join(format!("d1/f{f}.txt")), "old");
        }
        let output = assert_cmd::cargo::cargo_bin_cmd!("tcp")
            .arg(fx.src.path())
            .arg(&out)
            .args(["-u", "overwrite", "-x", "cache", "-j", throttle, "--output", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let mut result = parse_json(&output.stdout)["result"].clone();
        result["duration_ms"] = serde_json::Value::Null;
        results.push(result);

        assert_eq!(fs::read_to_string(out.join("d1/f3.txt")).unwrap(), "13");
    }

    assert_eq!(results[0], results[1]);
    assert_eq!(results[0], results[2]);
    assert_eq!(results[0]["files_overwritten"], 8);
    assert_eq!(results[0]["excluded_directories"], 1);
}
