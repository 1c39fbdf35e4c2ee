//! Integration tests for the scopeprof binary
//!
//! The reports rely on the macros recording, so they need the default build.
#![cfg(not(feature = "disabled"))]

use predicates::prelude::*;
use std::io::Write;

fn scopeprof() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("scopeprof");
    // Keep the workload small
    cmd.arg("--iterations").arg("2");
    cmd
}

#[test]
fn test_text_report_sections() {
    scopeprof()
        .assert()
        .success()
        .stdout(predicate::str::contains("Lucky number:"))
        .stdout(predicate::str::contains("Stats after the first run:"))
        .stdout(predicate::str::contains("Stats after the second run:"))
        .stdout(predicate::str::contains("All-thread stats (main + 2 workers):"))
        .stdout(predicate::str::contains(
            "WHAT: AVG_TIME (TOTAL_TIME / TIMES_EXECUTED)",
        ))
        .stdout(predicate::str::contains("All times in microseconds"));
}

#[test]
fn test_text_report_paths() {
    scopeprof()
        .assert()
        .success()
        .stdout(predicate::str::contains("heavy_calc: "))
        .stdout(predicate::str::contains("heavy_calc/huge_power/first_power_loop: "))
        .stdout(predicate::str::contains(
            "heavy_calc/huge_power/big_wave_power_loop/big_wave: ",
        ));
}

#[test]
fn test_global_counts_main_and_workers() {
    // Main thread runs twice, each of 3 workers once
    let output = scopeprof().arg("--threads").arg("3").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);

    let global = stdout
        .split("All-thread stats")
        .nth(1)
        .expect("global section present");
    let line = global
        .lines()
        .find(|l| l.starts_with("heavy_calc: "))
        .expect("heavy_calc row present");
    assert!(line.ends_with("/ 5)"), "unexpected row: {}", line);
}

#[test]
fn test_json_output_parses() {
    let output = scopeprof().arg("--format").arg("json").output().unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["format"], "scopeprof-json-v1");
    assert_eq!(parsed["max_depth"], 15);
    assert!(parsed["entries"].is_array());
    assert_eq!(parsed["summary"]["paths"], 7);
}

#[test]
fn test_unit_and_filter_flags() {
    scopeprof()
        .arg("--unit")
        .arg("ms")
        .arg("--filter")
        .arg("power_loop$")
        .assert()
        .success()
        .stdout(predicate::str::contains("All times in milliseconds"))
        .stdout(predicate::str::contains("heavy_calc/huge_power/second_power_loop: "))
        .stdout(predicate::str::contains("heavy_calc/big_wave: ").not());
}

#[test]
fn test_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[report]\nunit = \"ns\"\nsort = \"visits\"").unwrap();

    scopeprof()
        .arg("--config")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("All times in nanoseconds"));
}

#[test]
fn test_invalid_filter_fails() {
    scopeprof()
        .arg("--filter")
        .arg("(")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_missing_config_fails() {
    scopeprof()
        .arg("--config")
        .arg("/nonexistent/scopeprof.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_zero_threads() {
    scopeprof()
        .arg("--threads")
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::contains("All-thread stats (main + 0 workers):"));
}
