use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn create_test_files(dir: &Path, files: &[(&str, &[u8])]) -> Result<()> {
    fs::create_dir_all(dir)?;
    for (name, content) in files {
        fs::write(dir.join(name), content)?;
    }
    Ok(())
}

fn compile(temp_dir: &TempDir, patterns: &str, hex: bool) -> Result<std::path::PathBuf> {
    let pattern_file = temp_dir.path().join("patterns.txt");
    fs::write(&pattern_file, patterns)?;
    let output = temp_dir.path().join("patterns.acs");

    let mut cmd = Command::cargo_bin("acscout")?;
    cmd.arg("compile")
        .arg("-p")
        .arg(&pattern_file)
        .arg("-o")
        .arg(&output);
    if hex {
        cmd.arg("--hex");
    }
    cmd.assert().success();
    Ok(output)
}

#[test]
fn test_compile_and_inspect() -> Result<()> {
    let temp_dir = tempdir()?;
    let pattern_file = temp_dir.path().join("words.txt");
    fs::write(&pattern_file, "he\nshe\n\nhis\nhers\n")?;
    let output = temp_dir.path().join("words.acs");

    Command::cargo_bin("acscout")?
        .arg("compile")
        .arg("-p")
        .arg(&pattern_file)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiled 4 patterns into 11 states"));

    Command::cargo_bin("acscout")?
        .arg("inspect")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Accepting states:  4"))
        .stdout(predicate::str::contains("Longest pattern:   4 bytes"));
    Ok(())
}

#[test]
fn test_scan_stats() -> Result<()> {
    let temp_dir = tempdir()?;
    let automaton = compile(&temp_dir, "he\nshe\nhis\nhers\n", false)?;
    let data = temp_dir.path().join("data");
    create_test_files(&data, &[("a.txt", b"ushers"), ("b.txt", b"nothing")])?;

    Command::cargo_bin("acscout")?
        .arg("scan")
        .arg("-a")
        .arg(&automaton)
        .arg("-d")
        .arg(&data)
        .arg("--stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 matches in 1 of 2 files"));
    Ok(())
}

#[test]
fn test_scan_json_from_pattern_file() -> Result<()> {
    let temp_dir = tempdir()?;
    let pattern_file = temp_dir.path().join("sigs.hex");
    fs::write(&pattern_file, "deadbeef\n")?;
    let data = temp_dir.path().join("data");
    create_test_files(&data, &[("firmware.bin", &[0x00, 0xde, 0xad, 0xbe, 0xef])])?;

    Command::cargo_bin("acscout")?
        .arg("scan")
        .arg("-p")
        .arg(&pattern_file)
        .arg("--hex")
        .arg("-d")
        .arg(&data)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_matches\": 1"))
        .stdout(predicate::str::contains("\"start\": 1"));
    Ok(())
}

#[test]
fn test_scan_first_only_lists_matches() -> Result<()> {
    let temp_dir = tempdir()?;
    let automaton = compile(&temp_dir, "needle\n", false)?;
    let data = temp_dir.path().join("data");
    create_test_files(&data, &[("hay.txt", b"needle needle needle")])?;

    Command::cargo_bin("acscout")?
        .arg("scan")
        .arg("-a")
        .arg(&automaton)
        .arg("-d")
        .arg(&data)
        .arg("--first")
        .assert()
        .success()
        .stdout(predicate::str::contains("hay.txt"))
        .stdout(predicate::str::contains("0..6"))
        .stdout(predicate::str::contains("Found 1 matches in 1 of 1 files"));
    Ok(())
}

#[test]
fn test_scan_without_patterns_fails() -> Result<()> {
    let temp_dir = tempdir()?;

    Command::cargo_bin("acscout")?
        .arg("scan")
        .arg("-d")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no patterns"));
    Ok(())
}

#[test]
fn test_inspect_corrupt_automaton_fails() -> Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("broken.acs");
    fs::write(&path, b"not an automaton")?;

    Command::cargo_bin("acscout")?
        .arg("inspect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Decode error"));
    Ok(())
}

#[test]
fn test_compile_reports_bad_hex_line() -> Result<()> {
    let temp_dir = tempdir()?;
    let pattern_file = temp_dir.path().join("bad.hex");
    fs::write(&pattern_file, "00ff\nzz\n")?;

    Command::cargo_bin("acscout")?
        .arg("compile")
        .arg("-p")
        .arg(&pattern_file)
        .arg("--hex")
        .arg("-o")
        .arg(temp_dir.path().join("bad.acs"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
    Ok(())
}
