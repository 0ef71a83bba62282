//! CLI test cases.
//!
//! These run the real binary against the text fixtures in `tests/fixtures`.
//! We always pass `--reference-date` so that results don't depend on the
//! day the tests are run.

use assert_cmd::Command;
use predicates::prelude::*;

/// Our fixed "today".
static REFERENCE_DATE: &str = "2026-10-18";

/// Create a new `Command` with our binary.
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("doc-expiry").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help() {
    cmd().arg("--help").assert().success();
}

#[test]
fn test_version() {
    cmd().arg("--version").assert().success();
}

#[test]
fn test_date_french_certificate() {
    cmd()
        .args(["date", "tests/fixtures/texts/epc_fr.txt"])
        .args(["--reference-date", REFERENCE_DATE])
        .assert()
        .success()
        .stdout("2031-09-15\n");
}

#[test]
fn test_date_dutch_attestation() {
    cmd()
        .args(["date", "tests/fixtures/texts/attest_nl.txt"])
        .args(["--reference-date", REFERENCE_DATE])
        .assert()
        .success()
        .stdout("2030-12-31\n");
}

#[test]
fn test_date_month_names() {
    cmd()
        .args(["date", "tests/fixtures/texts/month_names.txt"])
        .args(["--reference-date", REFERENCE_DATE])
        .assert()
        .success()
        .stdout("2029-03-02\n");
}

#[test]
fn test_date_keyword_too_far_away() {
    cmd()
        .args(["date", "tests/fixtures/texts/no_expiry_nl.txt"])
        .args(["--reference-date", REFERENCE_DATE])
        .assert()
        .success()
        .stdout("Not found\n");
}

#[test]
fn test_date_from_stdin() {
    cmd()
        .args(["date", "--reference-date", REFERENCE_DATE])
        .write_stdin("Valable jusqu'au 15 juin 2025, émis le 1 juin 2020.")
        .assert()
        .success()
        .stdout("2025-06-15\n");
}

#[test]
fn test_date_empty_stdin() {
    cmd()
        .args(["date", "--reference-date", REFERENCE_DATE])
        .write_stdin("")
        .assert()
        .success()
        .stdout("Not found\n");
}

#[test]
fn test_date_window_override() {
    // "Geldig tot" is 12 characters before the date, so a window of 5
    // misses it.
    cmd()
        .args(["date", "tests/fixtures/texts/attest_nl.txt"])
        .args(["--reference-date", REFERENCE_DATE, "--window", "5"])
        .assert()
        .success()
        .stdout("Not found\n");
}

#[test]
fn test_date_window_from_config_file() {
    cmd()
        .args(["date", "tests/fixtures/texts/attest_nl.txt"])
        .args(["--reference-date", REFERENCE_DATE])
        .args(["--config", "tests/fixtures/config/narrow_window.json"])
        .assert()
        .success()
        .stdout("Not found\n");
}

#[test]
fn test_date_dutch_only_config_ignores_french_keywords() {
    cmd()
        .args(["date", "tests/fixtures/texts/epc_fr.txt"])
        .args(["--reference-date", REFERENCE_DATE])
        .args(["--config", "tests/fixtures/config/dutch_only.toml"])
        .assert()
        .success()
        .stdout("Not found\n");
}

#[test]
fn test_date_rejects_bad_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "patterns = ['(\\d+']\n").unwrap();
    cmd()
        .args(["date", "tests/fixtures/texts/epc_fr.txt"])
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date pattern"));
}

#[test]
fn test_date_missing_file() {
    cmd()
        .args(["date", "tests/fixtures/texts/does_not_exist.txt"])
        .assert()
        .failure();
}

#[test]
fn test_extract_jsonl_input() {
    cmd()
        .args(["extract", "tests/fixtures/batch/input.jsonl"])
        .args(["--reference-date", REFERENCE_DATE])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(
                r#"{"id":"epc","status":"ok","errors":[],"report_type":"EPC","expiring_date":"2031-09-15"}"#,
            )
            .and(predicate::str::contains(
                r#"{"id":"attest","status":"ok","errors":[],"expiring_date":"2030-12-31"}"#,
            ))
            .and(predicate::str::contains(
                r#"{"id":3,"status":"ok","errors":[],"expiring_date":"2027-06-06"}"#,
            ))
            .and(predicate::str::contains(
                r#"{"id":4,"status":"ok","errors":[],"expiring_date":"Not found"}"#,
            )),
        );
}

#[test]
fn test_extract_csv_input() {
    cmd()
        .args(["extract", "tests/fixtures/batch/input.csv"])
        .args(["--reference-date", REFERENCE_DATE])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""id":"epc""#)
                .and(predicate::str::contains(r#""expiring_date":"2031-09-15""#))
                .and(predicate::str::contains(r#""expiring_date":"2026-06-30""#)),
        );
}

#[test]
fn test_extract_empty_stdin() {
    cmd()
        .args(["extract", "--reference-date", REFERENCE_DATE])
        .write_stdin("")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_extract_take_first() {
    let output = cmd()
        .args(["extract", "tests/fixtures/batch/input.jsonl"])
        .args(["--reference-date", REFERENCE_DATE, "--take-first", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
}

#[test]
fn test_extract_to_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.jsonl");
    cmd()
        .args(["extract", "tests/fixtures/batch/input.jsonl"])
        .args(["--reference-date", REFERENCE_DATE])
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout("");
    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written.lines().count(), 4);
}

#[test]
fn test_extract_failure_rate() {
    cmd()
        .args(["extract", "tests/fixtures/batch/bad_input.jsonl"])
        .args(["--reference-date", REFERENCE_DATE])
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""status":"failed""#))
        .stderr(predicate::str::contains("were failures"));

    cmd()
        .args(["extract", "tests/fixtures/batch/bad_input.jsonl"])
        .args(["--reference-date", REFERENCE_DATE])
        .args(["--allowed-failure-rate", "0.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""expiring_date":"2030-01-01""#));
}

#[test]
fn test_scan_dir() {
    let preds = tempfile::tempdir().unwrap();
    cmd()
        .args(["scan-dir", "tests/fixtures/texts"])
        .args(["--reference-date", REFERENCE_DATE])
        .arg("--preds-dir")
        .arg(preds.path())
        .assert()
        .success();

    let epc = std::fs::read_to_string(preds.path().join("epc_fr.json")).unwrap();
    assert_eq!(epc, "{\n    \"expiring_date\": \"2031-09-15\"\n}\n");
    let none = std::fs::read_to_string(preds.path().join("no_expiry_nl.json")).unwrap();
    assert_eq!(none, "{\n    \"expiring_date\": \"Not found\"\n}\n");
}

#[test]
fn test_schema() {
    for schema_type in [
        "ExtractInput",
        "ExtractOutput",
        "PredictionRecord",
        "ExtractorConfig",
    ] {
        cmd()
            .args(["schema", schema_type])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"$schema\""));
    }
}

#[test]
fn test_config_round_trips_through_config_flag() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    cmd()
        .arg("config")
        .arg("-o")
        .arg(&config)
        .assert()
        .success();
    cmd()
        .args(["date", "tests/fixtures/texts/epc_fr.txt"])
        .args(["--reference-date", REFERENCE_DATE])
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout("2031-09-15\n");
}
