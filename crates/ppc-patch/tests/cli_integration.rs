//! Integration tests for the dolpatch CLI.

use env_logger as _;
use log as _;
use ppc_encoding::{blr, li, nop, Instructions, Register};
use ppc_patch as _;
use rstest as _;
use serde as _;
use serde_json as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror as _;

fn binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.join("dolpatch")
}

fn create_temp_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn image() -> Vec<u8> {
    Instructions::from([li(Register::R3, 0), blr(), nop(), blr()]).to_bytes()
}

const RETURN_ONE: &str = r#"{
  "sets": [
    {
      "name": "Return one",
      "patches": [
        { "name": "li r3, 1", "offset": "0x0", "before": "38600000", "after": "38600001" }
      ]
    }
  ]
}"#;

#[test]
fn apply_writes_patched_binary() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = create_temp_file(temp_dir.path(), "main.dol", &image());
    let manifest = create_temp_file(temp_dir.path(), "patches.json", RETURN_ONE.as_bytes());
    let output = temp_dir.path().join("out.dol");

    let status = Command::new(binary_path())
        .args([
            "apply",
            input.to_str().unwrap(),
            manifest.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .status()
        .expect("failed to run dolpatch");

    assert!(status.success());
    let patched = fs::read(&output).unwrap();
    assert_eq!(&patched[0..4], &[0x38, 0x60, 0x00, 0x01]);
    assert_eq!(&patched[4..], &image()[4..]);
    assert_eq!(fs::read(&input).unwrap(), image());
}

#[test]
fn apply_uses_default_output_path() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = create_temp_file(temp_dir.path(), "main.dol", &image());
    let manifest = create_temp_file(temp_dir.path(), "patches.json", RETURN_ONE.as_bytes());

    let status = Command::new(binary_path())
        .args(["apply", input.to_str().unwrap(), manifest.to_str().unwrap()])
        .status()
        .expect("failed to run dolpatch");

    assert!(status.success());
    assert!(temp_dir.path().join("main.patched.dol").exists());
}

#[test]
fn dry_run_writes_nothing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = create_temp_file(temp_dir.path(), "main.dol", &image());
    let manifest = create_temp_file(temp_dir.path(), "patches.json", RETURN_ONE.as_bytes());

    let output = Command::new(binary_path())
        .args([
            "apply",
            input.to_str().unwrap(),
            manifest.to_str().unwrap(),
            "--dry-run",
        ])
        .output()
        .expect("failed to run dolpatch");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("apply cleanly"));
    assert!(!temp_dir.path().join("main.patched.dol").exists());
}

#[test]
fn mismatched_binary_fails_without_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = create_temp_file(temp_dir.path(), "main.dol", &[0u8; 16]);
    let manifest = create_temp_file(temp_dir.path(), "patches.json", RETURN_ONE.as_bytes());

    let output = Command::new(binary_path())
        .args(["apply", input.to_str().unwrap(), manifest.to_str().unwrap()])
        .output()
        .expect("failed to run dolpatch");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: before data did not match"));
    assert!(!temp_dir.path().join("main.patched.dol").exists());
}

#[test]
fn invalid_manifest_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = create_temp_file(temp_dir.path(), "main.dol", &image());
    let manifest = create_temp_file(temp_dir.path(), "patches.json", b"{\"sets\": 4}");

    let output = Command::new(binary_path())
        .args(["apply", input.to_str().unwrap(), manifest.to_str().unwrap()])
        .output()
        .expect("failed to run dolpatch");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error: invalid manifest"));
}

#[test]
fn help_exits_successfully() {
    let output = Command::new(binary_path())
        .arg("--help")
        .output()
        .expect("failed to run dolpatch");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage: dolpatch"));
}

#[test]
fn apply_help_exits_successfully() {
    let output = Command::new(binary_path())
        .args(["apply", "--help"])
        .output()
        .expect("failed to run dolpatch");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage: dolpatch"));
}
