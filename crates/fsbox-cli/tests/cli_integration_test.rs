//! Integration tests running the `fsbox` binary against a temporary sandbox.

use serde_json::Value;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn fsbox(sandbox: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fsbox"))
        .arg("--directory")
        .arg(sandbox)
        .args(["--format", "json"])
        .args(args)
        .env_remove("FILESYSTEM_BASE_DIR")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn fsbox_with_stdin(sandbox: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_fsbox"))
        .arg("--directory")
        .arg(sandbox)
        .args(["--format", "json"])
        .args(args)
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

fn json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Tests that the sandbox directory is created on first use.
#[test]
fn test_creates_sandbox_directory() {
    let temp = TempDir::new().unwrap();
    let sandbox = temp.path().join("fresh");

    let output = fsbox(&sandbox, &["list"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(sandbox.is_dir());
    assert_eq!(json(&output)["result"]["entries"], serde_json::json!([]));
}

/// Tests a write, read, and delete round through the binary.
#[test]
fn test_write_read_delete() {
    let temp = TempDir::new().unwrap();

    let output = fsbox(
        temp.path(),
        &["write", "notes/todo.txt", "--content", "buy milk\n"],
    );
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        json(&output)["result"]["message"],
        "File written successfully to notes/todo.txt"
    );

    let output = fsbox(temp.path(), &["read", "notes/todo.txt"]);
    assert_eq!(json(&output)["result"]["content"], "buy milk\n");

    let output = fsbox(temp.path(), &["delete", "notes"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json(&output)["error"]["kind"], "directory_not_empty");

    let output = fsbox(temp.path(), &["delete", "notes", "--recursive"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(!temp.path().join("notes").exists());
}

/// Tests that write reads content from stdin when no flag is given.
#[test]
fn test_write_from_stdin() {
    let temp = TempDir::new().unwrap();

    let output = fsbox_with_stdin(temp.path(), &["write", "piped.txt"], "from stdin");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        std::fs::read_to_string(temp.path().join("piped.txt")).unwrap(),
        "from stdin"
    );
}

/// Tests that escaping paths exit with the rejection code.
#[test]
fn test_traversal_exit_code() {
    let temp = TempDir::new().unwrap();
    let sandbox = temp.path().join("box");

    let output = fsbox(&sandbox, &["write", "../escape.txt", "--content", "x"]);

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(json(&output)["error"]["kind"], "path_violation");
    assert!(!temp.path().join("escape.txt").exists());
}

/// Tests the raw call subcommand.
#[test]
fn test_call_subcommand() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("src")).unwrap();
    std::fs::write(temp.path().join("src/main.rs"), "fn main() {}\n").unwrap();

    let output = fsbox(temp.path(), &["call", "tree", r#"{"path": ""}"#]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        json(&output)["result"]["tree"]["src"]["children"]["main.rs"]["type"],
        "file"
    );

    let output = fsbox(temp.path(), &["call", "rename", r#"{"path": "src"}"#]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(json(&output)["error"]["kind"], "unknown_operation");
}

/// Tests patching from stdin when the patch utility is available.
#[test]
fn test_patch_from_stdin() {
    if which::which("patch").is_err() {
        eprintln!("skipping: patch utility not installed");
        return;
    }
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("todo.txt"), "buy milk\n").unwrap();

    let diff = "--- todo.txt\n+++ todo.txt\n@@ -1 +1 @@\n-buy milk\n+buy oat milk\n";
    let output = fsbox_with_stdin(temp.path(), &["patch", "todo.txt"], diff);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        std::fs::read_to_string(temp.path().join("todo.txt")).unwrap(),
        "buy oat milk\n"
    );
}
