//! Runs every fixture under `tests/fixtures` through the binary.
//!
//! `valid/*.input` must exit 0 with empty stderr and stdout equal to the
//! matching `.output` file byte for byte. Every file in `error/` must exit 66
//! with stderr starting `ERROR -- `. Failures are collected so one run reports
//! every broken fixture.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const BIN: &str = env!("CARGO_BIN_EXE_nosj_deserializer");

fn fixture_dir(kind: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(kind)
}

fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    paths.sort();
    paths
}

fn check_valid(input: &Path) -> Result<(), String> {
    let output = Command::new(BIN).arg(input).output().map_err(|e| e.to_string())?;
    if output.status.code() != Some(0) {
        return Err(format!(
            "exit {:?}, stderr {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    if !output.stderr.is_empty() {
        return Err("stderr not empty".to_string());
    }
    let want = fs::read(input.with_extension("output")).map_err(|e| e.to_string())?;
    if output.stdout != want {
        return Err(format!(
            "got {:?}, want {:?}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&want)
        ));
    }
    Ok(())
}

fn check_invalid(input: &Path) -> Result<(), String> {
    let output = Command::new(BIN).arg(input).output().map_err(|e| e.to_string())?;
    if output.status.code() != Some(66) {
        return Err(format!("exit {:?}", output.status.code()));
    }
    if !output.stderr.starts_with(b"ERROR -- ") {
        return Err(format!(
            "stderr {:?}",
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    Ok(())
}

#[test]
fn test_valid_fixtures() {
    let mut failures = Vec::new();
    let mut checked = 0;
    for path in sorted_entries(&fixture_dir("valid")) {
        if path.extension().and_then(|e| e.to_str()) != Some("input") {
            continue;
        }
        checked += 1;
        if let Err(reason) = check_valid(&path) {
            failures.push(format!("{}: {reason}", path.display()));
        }
    }
    assert!(checked > 0, "no valid fixtures found");
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn test_error_fixtures() {
    let mut failures = Vec::new();
    let paths = sorted_entries(&fixture_dir("error"));
    assert!(!paths.is_empty(), "no error fixtures found");
    for path in paths {
        if let Err(reason) = check_invalid(&path) {
            failures.push(format!("{}: {reason}", path.display()));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn test_library_agrees_with_fixtures() {
    for path in sorted_entries(&fixture_dir("valid")) {
        if path.extension().and_then(|e| e.to_str()) != Some("input") {
            continue;
        }
        let input = fs::read(&path).unwrap();
        let want = fs::read_to_string(path.with_extension("output")).unwrap();
        let value = nosj::parse(&input).unwrap();
        assert_eq!(value.to_string(), want, "{}", path.display());
    }
    for path in sorted_entries(&fixture_dir("error")) {
        let input = fs::read(&path).unwrap();
        assert!(nosj::parse(&input).is_err(), "{}", path.display());
    }
}
