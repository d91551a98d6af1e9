use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;
use walkdir::WalkDir;

fn find_log(root: &Path, marker: &str) -> PathBuf {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .map(|e| e.into_path())
        .find(|p| p.to_string_lossy().contains(marker))
        .unwrap_or_else(|| panic!("no {marker} log under {}", root.display()))
}

#[test]
fn piped_command_output_lands_in_test_log() {
    let prefix = tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_engrun"))
        .arg("--prefix")
        .arg(prefix.path())
        .args(["--log-id", "itest", "--", "echo hello | tr a-z A-Z"])
        .output()
        .expect("failed to run engrun binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("INFO [main]: Running: echo hello | tr a-z A-Z"));
    assert!(stdout.contains("INFO [main]: returncode: 0"));

    let test_log = find_log(prefix.path(), "engrun.test.");
    assert!(test_log.to_string_lossy().contains("/itest/engrun."));
    assert_eq!(
        fs::read_to_string(&test_log).unwrap(),
        "### echo hello | tr a-z A-Z ###\nHELLO\n\n"
    );

    // Command output goes to the debug file unformatted, not to the console.
    let debug_log = fs::read_to_string(find_log(prefix.path(), "engrun.debug.")).unwrap();
    assert!(debug_log.contains("\nHELLO\n"));
    assert!(!stdout.contains("HELLO"));

    let saved = fs::read_to_string(find_log(prefix.path(), "engrun.stdout.")).unwrap();
    assert!(saved.contains("Running: echo hello | tr a-z A-Z"));
    assert!(!saved.contains("DEBUG"));
}

#[test]
fn failing_command_exits_non_zero_with_return_code() {
    let prefix = tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_engrun"))
        .arg("--prefix")
        .arg(prefix.path())
        .args(["--log-id", "itest", "--", "false"])
        .output()
        .expect("failed to run engrun binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("command failed: false"));
    assert!(stderr.contains("returncode=1"));

    let debug_log = fs::read_to_string(find_log(prefix.path(), "engrun.debug.")).unwrap();
    assert!(debug_log.contains("Shell Command Execution Error"));
}

#[test]
fn call_mode_streams_to_terminal() {
    let prefix = tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_engrun"))
        .arg("--prefix")
        .arg(prefix.path())
        .args(["--log-id", "itest", "--call", "--settle-ms", "0", "--", "echo streamed"])
        .output()
        .expect("failed to run engrun binary");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("streamed"));
    let test_log = fs::read_to_string(find_log(prefix.path(), "engrun.test.")).unwrap();
    assert_eq!(test_log, "### echo streamed ###\nreturncode: 0\n");
}
