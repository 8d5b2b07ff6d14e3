//! End-to-end tests for the bibr binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn bibr() -> Command {
    Command::cargo_bin("bibr").unwrap()
}

#[test]
fn extract_text_file_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("entry.txt");
    fs::write(&input, "A Study of Systems by John Smith, 2021.").unwrap();

    bibr()
        .arg("extract")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""author":"John Smith""#))
        .stdout(predicate::str::contains(r#""year":"2021""#));
}

#[test]
fn extract_text_file_report_format() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("entry.txt");
    fs::write(&input, "A Study of Systems by John Smith, 2021.").unwrap();

    bibr()
        .arg("extract")
        .arg(&input)
        .args(["--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: A Study of Systems by John Smith"))
        .stdout(predicate::str::contains("Author: John Smith"))
        .stdout(predicate::str::contains("Year: 2021"));
}

#[test]
fn extract_csv_has_header() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("entry.txt");
    fs::write(&input, "A pamphlet by Jane Doe, 1901.").unwrap();

    bibr()
        .arg("extract")
        .arg(&input)
        .args(["--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("title,author,year"))
        .stdout(predicate::str::contains("Jane Doe"));
}

#[test]
fn extract_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("entry.txt");
    let output = dir.path().join("record.json");
    fs::write(&input, "A pamphlet by Jane Doe, 1901.").unwrap();

    bibr()
        .arg("extract")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("Jane Doe"));
}

#[test]
fn extract_missing_file_fails() {
    bibr()
        .arg("extract")
        .arg("no-such-file.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn extract_unsupported_extension_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("entry.odt");
    fs::write(&input, "some bytes").unwrap();

    bibr().arg("extract").arg(&input).assert().failure();
}

#[test]
fn summarize_keeps_leading_segments() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("essay.txt");
    fs::write(&input, "First point. Second point. Third point. Fourth point.").unwrap();

    bibr()
        .arg("summarize")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("First point. Second point"))
        .stdout(predicate::str::contains("Third point").not());
}

#[test]
fn summarize_segment_count_override() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("essay.txt");
    fs::write(&input, "First point. Second point. Third point.").unwrap();

    bibr()
        .arg("summarize")
        .arg(&input)
        .args(["--segments", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("First point"))
        .stdout(predicate::str::contains("Second point").not());
}

#[test]
fn batch_writes_records_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");
    fs::write(
        dir.path().join("one.txt"),
        "A Study of Systems by John Smith, 2021.",
    )
    .unwrap();
    fs::write(dir.path().join("two.txt"), "A pamphlet by Jane Doe, 1901.").unwrap();

    let pattern = dir.path().join("*.txt");

    bibr()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output-dir")
        .arg(&out_dir)
        .arg("--summary")
        .assert()
        .success();

    assert!(out_dir.join("one.json").exists());
    assert!(out_dir.join("two.json").exists());

    let summary = fs::read_to_string(out_dir.join("summary.csv")).unwrap();
    assert!(summary.contains("one.txt"));
    assert!(summary.contains("John Smith"));
    assert!(summary.contains("success"));
}

#[test]
fn batch_no_matches_fails() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = dir.path().join("*.txt");

    bibr()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn batch_continue_on_error_reports_failures() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");
    fs::write(dir.path().join("good.txt"), "A pamphlet by Jane Doe, 1901.").unwrap();
    fs::write(dir.path().join("bad.pdf"), "not really a pdf").unwrap();

    let pattern = dir.path().join("*");

    bibr()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output-dir")
        .arg(&out_dir)
        .arg("--continue-on-error")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful, 1 failed"));
}

#[test]
fn config_show_prints_defaults() {
    bibr()
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("extraction"))
        .stdout(predicate::str::contains("summary_segments"));
}

#[test]
fn config_path_reports_location() {
    bibr()
        .arg("config")
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file:"));
}

#[test]
fn models_list_shows_packs() {
    bibr()
        .arg("models")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("ocr"))
        .stdout(predicate::str::contains("ner"))
        .stdout(predicate::str::contains("det.onnx"));
}
