//! Exit-status tests for the `pdf2tex` binary.
//!
//! None of these reach pdfium or the network: they stop at the argument,
//! credential, or missing-path stage.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::Path;

/// `pdf2tex` with a clean environment: no inherited file list, no API key,
/// no spinner.
fn pdf2tex(cwd: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("pdf2tex");
    cmd.current_dir(cwd)
        .env_remove("PDF2TEX_FILES")
        .env_remove("PDF2TEX_PROVIDER")
        .env_remove("PDF2TEX_MODEL")
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG")
        .env("PDF2TEX_NO_PROGRESS", "true");
    cmd
}

fn tex_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".tex"))
        .collect()
}

#[test]
fn no_argument_exits_zero_without_credential() {
    let dir = tempfile::tempdir().unwrap();

    pdf2tex(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("nothing to do"));
}

#[test]
fn blank_argument_exits_zero_without_credential() {
    let dir = tempfile::tempdir().unwrap();

    pdf2tex(dir.path()).arg("  \t ").assert().success();
    assert!(tex_files(dir.path()).is_empty());
}

#[test]
fn missing_credential_exits_one_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.pdf"), b"%PDF-1.4\n").unwrap();

    pdf2tex(dir.path())
        .arg("a.pdf")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
    assert!(tex_files(dir.path()).is_empty());
}

#[test]
fn credential_follows_selected_provider() {
    let dir = tempfile::tempdir().unwrap();

    pdf2tex(dir.path())
        .env_remove("ANTHROPIC_API_KEY")
        .args(["--provider", "anthropic", "a.pdf"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"));
}

#[test]
fn only_missing_paths_exit_zero() {
    let dir = tempfile::tempdir().unwrap();

    pdf2tex(dir.path())
        .env("GEMINI_API_KEY", "dummy-key")
        .arg("missing.pdf")
        .assert()
        .success()
        .stderr(
            predicate::str::contains("Skipped missing.pdf: file not found")
                .and(predicate::str::contains("0 converted, 1 skipped")),
        );
    assert!(tex_files(dir.path()).is_empty());
}

#[test]
fn files_list_can_come_from_environment() {
    let dir = tempfile::tempdir().unwrap();

    pdf2tex(dir.path())
        .env("GEMINI_API_KEY", "dummy-key")
        .env("PDF2TEX_FILES", "gone-1.pdf gone-2.pdf")
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"skipped\"").count(2));
}
