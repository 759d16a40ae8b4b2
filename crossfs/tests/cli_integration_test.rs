//! End-to-end tests of the `crossfs` binary.

use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

/// Empty settings file so a user's own config cannot change results.
fn empty_settings() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"").unwrap();
    file
}

fn crossfs(args: &[&str]) -> Output {
    let settings = empty_settings();
    Command::new(env!("CARGO_BIN_EXE_crossfs"))
        .arg("--log-to-stderr")
        .arg("--config")
        .arg(settings.path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run crossfs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============= Guard Subcommands =============

#[test]
fn test_validate_prints_resolved_path() {
    let output = crossfs(&["--platform", "linux", "--base-dir", "/home/me", "validate", "docs/a.txt"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim_end(), "/home/me/docs/a.txt");
}

#[test]
fn test_denied_path_exits_with_guard_status() {
    let output = crossfs(&[
        "--platform",
        "linux",
        "--base-dir",
        "/home/me",
        "validate",
        "../../root/.ssh",
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("ACCESS_DENIED"));
}

#[test]
fn test_json_guard_failure_reports_code() {
    let output = crossfs(&["--platform", "linux", "--format", "json", "sanitize", "ls && id"]);
    assert_eq!(output.status.code(), Some(2));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["code"], "UNSAFE_COMMAND");
    assert!(value["error"].as_str().unwrap().contains("linux"));
}

#[test]
fn test_executable_subcommand_requotes() {
    let output = crossfs(&[
        "--platform",
        "windows",
        "executable",
        "%ProgramFiles%\\My App\\tool.exe",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim_end(), "\"%ProgramFiles%\\My App\\tool.exe\"");
}

#[test]
fn test_windows_copy_is_rendered_not_run() {
    let output = crossfs(&[
        "--platform",
        "windows",
        "copy",
        "C:\\temp\\src dir",
        "C:\\temp\\dst dir",
        "--recursive",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output).trim_end(),
        "xcopy \"C:\\temp\\src dir\" \"C:\\temp\\dst dir\" /E /I /Y"
    );
}

#[test]
fn test_search_depth_out_of_range() {
    let output = crossfs(&["--platform", "linux", "search", "/tmp", "*.rs", "--max-depth", "40"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("DEPTH_OUT_OF_RANGE"));
}

#[test]
fn test_platform_report_json() {
    let output = crossfs(&["--platform", "macos", "--format", "json", "platform"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["kind"], "platform");
    assert_eq!(value["profile"], "macos");
    assert!(
        value["allowed_prefixes"]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p == "/Users/")
    );
}

#[test]
fn test_unknown_platform_is_a_fatal_error() {
    let output = crossfs(&["--platform", "beos", "platform"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Unknown platform"));
}

// ============= Execution =============

#[cfg(unix)]
#[test]
fn test_exec_runs_in_base_dir() {
    let output = crossfs(&["--base-dir", "/tmp", "exec", "echo hi"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim_end(), "hi");
}

#[cfg(unix)]
#[test]
fn test_exec_propagates_child_exit_status() {
    let output = crossfs(&["--base-dir", "/tmp", "exec", "sh -c 'exit 4'"]);
    assert_eq!(output.status.code(), Some(4));
}

#[cfg(unix)]
#[test]
fn test_exec_refuses_unsafe_command() {
    let output = crossfs(&["--base-dir", "/tmp", "exec", "echo hi; touch /tmp/crossfs-pwned"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!std::path::Path::new("/tmp/crossfs-pwned").exists());
}
