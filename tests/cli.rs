//! CLI integration tests: exit codes, report formats and policy handling

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn guard_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fleet-script-guard"));
    cmd.env("HOME", home);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    guard_cmd(home).args(args).output().expect("run fleet-script-guard")
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

// ============================================================================
// Exit codes
// ============================================================================

#[test]
fn safe_script_exits_0() {
    let dir = TempDir::new().unwrap();
    let script = write_file(&dir, "hello.cmd", "echo Hello\n");

    let out = run(dir.path(), &["check", script.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("No dangerous patterns detected."));
}

#[test]
fn blocked_script_exits_1() {
    let dir = TempDir::new().unwrap();
    let script = write_file(&dir, "reboot.cmd", "shutdown /r\n");

    let out = run(dir.path(), &["check", script.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).contains("BLOCKED"));
}

#[test]
fn danger_script_exits_2() {
    let dir = TempDir::new().unwrap();
    let script = write_file(&dir, "spooler.cmd", "net stop SomeCustomApp\n");

    let out = run(dir.path(), &["check", script.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stdout(&out).contains("APPROVAL REQUIRED"));
}

#[test]
fn warning_only_script_exits_0() {
    let dir = TempDir::new().unwrap();
    let script = write_file(&dir, "ping.cmd", "ping PC01\n");

    let out = run(dir.path(), &["check", script.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn missing_script_exits_3() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.cmd");

    let out = run(dir.path(), &["check", missing.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Failed to read script"));
}

#[test]
fn usage_error_exits_3() {
    let dir = TempDir::new().unwrap();
    let out = run(dir.path(), &["check"]);
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn help_exits_0() {
    let dir = TempDir::new().unwrap();
    let out = run(dir.path(), &["--help"]);
    assert_eq!(out.status.code(), Some(0));
}

// ============================================================================
// Input and output
// ============================================================================

#[test]
fn script_from_stdin() {
    let dir = TempDir::new().unwrap();
    let mut child = guard_cmd(dir.path())
        .args(["check", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn fleet-script-guard");

    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"format C: /q\n")
        .expect("write stdin");

    let out = child.wait_with_output().expect("wait");
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn json_report_on_stdout() {
    let dir = TempDir::new().unwrap();
    let script = write_file(&dir, "reboot.cmd", "echo start\nshutdown /r\n");

    let out = run(dir.path(), &["check", script.to_str().unwrap(), "--format", "json"]);
    assert_eq!(out.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).expect("valid JSON report");
    assert_eq!(json["policy_applied"], false);
    assert_eq!(json["result"]["is_safe"], false);
    assert_eq!(json["result"]["risk_level"], "CRITICAL");
    assert_eq!(json["result"]["findings"][0]["line"], 2);
    assert!(json["catalog_version"].is_string());
}

#[test]
fn report_written_to_file() {
    let dir = TempDir::new().unwrap();
    let script = write_file(&dir, "hello.cmd", "echo Hello\n");
    let report = dir.path().join("report.json");

    let out = run(
        dir.path(),
        &[
            "check",
            script.to_str().unwrap(),
            "--format",
            "json",
            "--output",
            report.to_str().unwrap(),
        ],
    );
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).is_empty(), "Report goes to the file, not stdout");

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).expect("valid JSON report");
    assert_eq!(json["result"]["is_safe"], true);
}

// ============================================================================
// Policies
// ============================================================================

#[test]
fn policy_file_flags_unapproved_host() {
    let dir = TempDir::new().unwrap();
    let script = write_file(&dir, "copy.cmd", "dir \\\\REMOTE01\\share\n");
    let policy = write_file(&dir, "policy.toml", "allowed_hostnames = [\"PC01\"]\n");

    let out = run(
        dir.path(),
        &[
            "check",
            script.to_str().unwrap(),
            "--policy",
            policy.to_str().unwrap(),
            "--format",
            "json",
        ],
    );
    assert_eq!(out.status.code(), Some(2));

    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["policy_applied"], true);
    assert_eq!(json["result"]["scope_violation_descriptions"].as_array().unwrap().len(), 1);
}

#[test]
fn allow_host_flag_approves_host() {
    let dir = TempDir::new().unwrap();
    let script = write_file(&dir, "copy.cmd", "dir \\\\REMOTE01\\share\n");
    let policy = write_file(&dir, "policy.toml", "allowed_hostnames = [\"PC01\"]\n");

    let out = run(
        dir.path(),
        &[
            "check",
            script.to_str().unwrap(),
            "--policy",
            policy.to_str().unwrap(),
            "--allow-host",
            "remote01",
        ],
    );
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn broken_policy_degrades_to_catalog_only() {
    let dir = TempDir::new().unwrap();
    let script = write_file(&dir, "copy.cmd", "dir \\\\REMOTE01\\share\n");
    let policy = write_file(&dir, "policy.toml", "allowed_hostnames = [\n");

    let out = run(
        dir.path(),
        &[
            "check",
            script.to_str().unwrap(),
            "--policy",
            policy.to_str().unwrap(),
            "--format",
            "json",
        ],
    );
    assert_eq!(out.status.code(), Some(0), "Catalog finds nothing in a plain dir");
    assert!(String::from_utf8_lossy(&out.stderr).contains("Policy not applied"));

    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["policy_applied"], false);
}

// ============================================================================
// Rule listing
// ============================================================================

#[test]
fn rules_lists_catalog() {
    let dir = TempDir::new().unwrap();
    let out = run(dir.path(), &["rules"]);
    assert_eq!(out.status.code(), Some(0));

    let text = stdout(&out);
    assert!(text.contains("Rule catalog"));
    assert!(text.contains("BLOCKED"));
    assert!(text.contains("DANGER"));
    assert!(text.contains("WARNING"));
}

#[test]
fn rules_single_tier() {
    let dir = TempDir::new().unwrap();
    let out = run(dir.path(), &["rules", "--tier", "blocked"]);
    assert_eq!(out.status.code(), Some(0));

    let text = stdout(&out);
    assert!(text.contains("Boot configuration modification"));
    assert!(!text.contains("Network reconnaissance command"), "Other tiers are omitted");
}
