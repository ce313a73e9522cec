//! Binary-level tests for the whitelist tools.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn generate(dir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_generate-doctor-whitelist"))
        .current_dir(dir)
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_no_arguments_fails() {
    let dir = TempDir::new().unwrap();
    let output = generate(dir.path(), &[], "");
    assert!(!output.status.success());
    assert!(!dir.path().join("doctor_whitelist.json").exists());
}

#[test]
fn test_text_file_duplicates_collapse() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("doctors.txt"), "DOC1\nDOC1\nDOC2\n").unwrap();

    let output = generate(dir.path(), &["--from-file", "doctors.txt"], "");
    assert!(output.status.success());

    let whitelist = read_json(&dir.path().join("doctor_whitelist.json"));
    assert_eq!(whitelist["whitelist"], serde_json::json!(["DOC1", "DOC2"]));
    assert_eq!(whitelist["total_doctors"], 2);
    assert!(whitelist["created"].is_string());
}

#[test]
fn test_missing_file_does_not_abort_other_sources() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("roster.csv"), "doctor_id,name\nMD7,Grey\nMD3,Shepherd\n")
        .unwrap();

    let output = generate(
        dir.path(),
        &[
            "--from-file",
            "missing.txt",
            "--from-csv",
            "roster.csv",
            "--output",
            "custom.json",
        ],
        "",
    );
    assert!(output.status.success());

    let whitelist = read_json(&dir.path().join("custom.json"));
    assert_eq!(whitelist["whitelist"], serde_json::json!(["MD3", "MD7"]));
}

#[test]
fn test_interactive_entry() {
    let dir = TempDir::new().unwrap();
    let output = generate(dir.path(), &["--interactive"], "DOC9\nDOC9\nDOC1\n\nignored\n");
    assert!(output.status.success());

    let prompts = String::from_utf8(output.stderr).unwrap();
    assert!(prompts.contains("Added: DOC9"));
    assert!(prompts.contains("Skipped (duplicate): DOC9"));

    let whitelist = read_json(&dir.path().join("doctor_whitelist.json"));
    assert_eq!(whitelist["whitelist"], serde_json::json!(["DOC1", "DOC9"]));
}

#[test]
fn test_nothing_collected_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let output = generate(dir.path(), &["--interactive"], "\n");
    assert!(output.status.success());
    assert!(!dir.path().join("doctor_whitelist.json").exists());
}

#[test]
fn test_show_doctor_ids() {
    let dir = TempDir::new().unwrap();
    generate(dir.path(), &["--random", "3", "--pattern", "MD{letter}{number}"], "");

    let output = Command::new(env!("CARGO_BIN_EXE_show-doctor-ids"))
        .current_dir(dir.path())
        .env_remove("DOCTOR_WHITELIST_PATH")
        .env_remove("DOCTOR_LABELS_DIR")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Total authorized doctors: 3"));
    assert!(stdout.contains(" 3. MD"));
}

#[test]
fn test_show_doctor_ids_missing_whitelist() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_show-doctor-ids"))
        .current_dir(dir.path())
        .env_remove("DOCTOR_WHITELIST_PATH")
        .env_remove("DOCTOR_LABELS_DIR")
        .output()
        .unwrap();
    assert!(!output.status.success());
}
