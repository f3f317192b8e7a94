//! Integration tests for the attrsync command line
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const TRACE: &str = r#"{"op":"write","pages":[10,11,13,14]}
{"op":"read","bufs":[{"page":1},{"page":2},{"page":null}]}
"#;

#[test]
fn test_brw_stats_text_report() {
    let dir = TempDir::new().unwrap();
    let trace = write_file(&dir, "trace.jsonl", TRACE);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("brw-stats").arg(&trace);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("snapshot_time:"))
        .stdout(predicate::str::contains("pages per brw"))
        .stdout(predicate::str::contains("discont pages"))
        .stdout(predicate::str::contains("discont blocks"))
        .stdout(predicate::str::contains("|          1 100 100"));
}

#[test]
fn test_brw_stats_json_report() {
    let dir = TempDir::new().unwrap();
    let trace = write_file(&dir, "trace.jsonl", TRACE);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("brw-stats")
        .arg(&trace)
        .arg("--format")
        .arg("json")
        .arg("-j")
        .arg("2");

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let sections = parsed["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 3);
    assert_eq!(sections[0]["title"], "pages per brw");
    assert_eq!(sections[0]["write_total"], 1);
    assert_eq!(sections[0]["read_total"], 1);
}

#[test]
fn test_brw_stats_config_file() {
    let dir = TempDir::new().unwrap();
    let trace = write_file(&dir, "trace.jsonl", TRACE);
    let config = write_file(&dir, "replay.toml", "format = \"json\"\nworkers = 4\n");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("brw-stats").arg(&trace).arg("--config").arg(&config);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"sections\""));
}

#[test]
fn test_brw_stats_rejects_bad_trace() {
    let dir = TempDir::new().unwrap();
    let trace = write_file(&dir, "trace.jsonl", "{\"op\":\"write\",\"pages\":[1]}\nnot json\n");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("brw-stats").arg(&trace);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_brw_stats_rejects_zero_blocks_per_page() {
    let dir = TempDir::new().unwrap();
    let trace = write_file(&dir, "trace.jsonl", TRACE);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("brw-stats")
        .arg(&trace)
        .arg("--blocks-per-page")
        .arg("0");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("blocks_per_page"));
}

#[test]
fn test_brw_stats_rejects_oversized_blocks_per_page() {
    let dir = TempDir::new().unwrap();
    let trace = write_file(&dir, "trace.jsonl", TRACE);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("brw-stats")
        .arg(&trace)
        .arg("--blocks-per-page")
        .arg("4294967296");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("blocks_per_page"));

    let config = write_file(&dir, "replay.toml", "blocks_per_page = 1000000\n");
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("brw-stats").arg(&trace).arg("--config").arg(&config);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("blocks_per_page"));
}

#[test]
fn test_merge_copies_only_masked_valid_fields() {
    let dir = TempDir::new().unwrap();
    let dst = write_file(
        &dir,
        "dst.json",
        r#"{"id":1,"size":10,"mtime":5,"valid":"ID | SIZE | MTIME"}"#,
    );
    let src = write_file(
        &dir,
        "src.json",
        r#"{"id":9,"size":4096,"mtime":77,"valid":"SIZE | MTIME"}"#,
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("merge").arg(&dst).arg(&src).arg("--mask").arg("size");

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let merged: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(merged["id"], 1);
    assert_eq!(merged["size"], 4096);
    assert_eq!(merged["mtime"], 5);
}

#[test]
fn test_merge_rejects_unknown_attribute() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.json", "{}");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("merge").arg(&a).arg(&a).arg("-m").arg("size,colour");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn test_compare_reports_changes() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.json", r#"{"size":1,"uid":5}"#);
    let b = write_file(&dir, "b.json", r#"{"size":2,"uid":5}"#);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("compare").arg(&a).arg(&b).arg("-m").arg("uid");
    cmd.assert()
        .success()
        .stdout(predicate::str::diff("unchanged\n"));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("compare").arg(&a).arg(&b).arg("-m").arg("uid,size");
    cmd.assert()
        .success()
        .stdout(predicate::str::diff("changed\n"));
}

#[test]
fn test_compare_inline_only_with_flag() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.json", r#"{"inline":"0102"}"#);
    let b = write_file(&dir, "b.json", r#"{"inline":"0103"}"#);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("compare").arg(&a).arg(&b);
    cmd.assert()
        .success()
        .stdout(predicate::str::diff("unchanged\n"));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("compare").arg(&a).arg(&b).arg("--inline");
    cmd.assert()
        .success()
        .stdout(predicate::str::diff("changed\n"));
}

#[test]
fn test_setattr_clears_sgid_for_non_member() {
    let dir = TempDir::new().unwrap();
    // 0o100644 regular file owned by group 50
    let object = write_file(
        &dir,
        "obj.json",
        r#"{"id":3,"mode":33188,"gid":50,"valid":"ID | MODE | GID"}"#,
    );
    // Requests 0o102755
    let request = write_file(&dir, "req.json", r#"{"valid":"MODE","mode":34285}"#);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("setattr")
        .arg(&object)
        .arg(&request)
        .arg("--uid")
        .arg("1000")
        .arg("--gid")
        .arg("1000");

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let updated: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(updated["mode"], 0o100755);
}

#[test]
fn test_setattr_member_keeps_sgid() {
    let dir = TempDir::new().unwrap();
    let object = write_file(&dir, "obj.json", r#"{"id":3,"mode":33188,"gid":50}"#);
    let request = write_file(&dir, "req.json", r#"{"valid":"MODE","mode":34285}"#);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("setattr")
        .arg(&object)
        .arg(&request)
        .arg("--uid")
        .arg("1000")
        .arg("--gid")
        .arg("1000")
        .arg("--groups")
        .arg("50");

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let updated: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(updated["mode"], 0o102755);
}

#[test]
fn test_setattr_principal_from_config() {
    let dir = TempDir::new().unwrap();
    let object = write_file(&dir, "obj.json", r#"{"id":3,"mode":33188,"gid":50}"#);
    let request = write_file(&dir, "req.json", r#"{"valid":"MODE","mode":34285}"#);
    let config = write_file(
        &dir,
        "attrsync.toml",
        "[principal]\nuid = 1000\ngid = 1000\ngroups = [50]\n",
    );

    // Membership of group 50 comes from the file
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("setattr").arg(&object).arg(&request).arg("--config").arg(&config);

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let updated: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(updated["mode"], 0o102755);

    // --groups replaces the configured list
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("setattr")
        .arg(&object)
        .arg(&request)
        .arg("--config")
        .arg(&config)
        .arg("--groups")
        .arg("7");

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let updated: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(updated["mode"], 0o100755);

    // --gid 50 makes the principal a member again
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("setattr")
        .arg(&object)
        .arg(&request)
        .arg("--config")
        .arg(&config)
        .arg("--groups")
        .arg("7")
        .arg("--gid")
        .arg("50");

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let updated: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(updated["mode"], 0o102755);
}

#[test]
fn test_setattr_rejects_bad_config() {
    let dir = TempDir::new().unwrap();
    let object = write_file(&dir, "obj.json", "{}");
    let request = write_file(&dir, "req.json", "{}");
    let config = write_file(&dir, "attrsync.toml", "[principal]\nuid = \"root\"\n");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("setattr").arg(&object).arg(&request).arg("--config").arg(&config);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("attrsync.toml"));
}

#[test]
fn test_debug_flag_logs_to_stderr() {
    let dir = TempDir::new().unwrap();
    let object = write_file(&dir, "obj.json", r#"{"mode":33188,"gid":50}"#);
    let request = write_file(&dir, "req.json", r#"{"valid":"MODE","mode":34285}"#);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("--debug").arg("setattr").arg(&object).arg(&request).arg("--uid").arg("7");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("clearing set-group-ID"));
}

#[test]
fn test_missing_input_file() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("attrsync");
    cmd.arg("merge").arg("/nonexistent/a.json").arg("/nonexistent/b.json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}
