//! Path traversal tests.
//!
//! Validates that textual escapes are rejected before any filesystem access.

use fsbox_core::{ErrorKind, SandboxConfig};
use fsbox_files::{Dispatcher, PathResolver};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn sandbox() -> (TempDir, Dispatcher) {
    let temp = TempDir::new().unwrap();
    let dispatcher = Dispatcher::new(&SandboxConfig::new(temp.path().join("box")).unwrap());
    (temp, dispatcher)
}

/// Test that parent directory segments are rejected in every position.
#[test]
fn test_rejects_parent_directory() {
    let (_temp, dispatcher) = sandbox();
    let dangerous = [
        "..",
        "../",
        "../etc/passwd",
        "../../root",
        "foo/../bar",
        "foo/../../etc",
        "foo/..",
        "./..",
        "..\\windows",
    ];

    for path in dangerous {
        let err = dispatcher
            .resolver()
            .resolve(path)
            .expect_err("traversal must be rejected");
        assert!(err.is_path_violation(), "'{path}' should be a path violation: {err}");
    }
}

/// Test that absolute paths are rejected rather than re-rooted.
#[test]
fn test_rejects_absolute_paths() {
    let (_temp, dispatcher) = sandbox();

    for path in ["/", "/etc/passwd", "/tmp", "\\", "\\\\server\\share"] {
        let response = dispatcher.dispatch("read", json!({ "path": path }));
        assert!(!response.ok, "'{path}' should be rejected");
        assert_eq!(response.error.unwrap().kind, ErrorKind::PathViolation);
    }
}

/// Test that embedded NUL bytes are rejected.
#[test]
fn test_rejects_nul_bytes() {
    let (_temp, dispatcher) = sandbox();

    let err = dispatcher.resolver().resolve("safe\0/../../etc").unwrap_err();
    assert!(err.is_path_violation());
    let err = dispatcher.resolver().resolve("file.txt\0").unwrap_err();
    assert!(err.is_path_violation());
}

/// Test that every operation refuses an escaping path without side effects.
#[test]
fn test_every_operation_rejects_escape() {
    let (temp, dispatcher) = sandbox();
    let victim = temp.path().join("victim.txt");
    fs::write(&victim, "original").unwrap();

    let requests = [
        ("read", json!({"path": "../victim.txt"})),
        ("list", json!({"path": ".."})),
        ("tree", json!({"path": "../"})),
        ("write", json!({"path": "../victim.txt", "content": "pwned"})),
        ("delete", json!({"path": "../victim.txt", "recursive": true})),
        ("patch", json!({"path": "../victim.txt", "patch": "--- a\n+++ b\n"})),
    ];

    for (name, args) in requests {
        let response = dispatcher.dispatch(name, args);
        let failure = response.error.expect("escape must fail");
        assert_eq!(failure.kind, ErrorKind::PathViolation, "{name}");
    }

    assert_eq!(fs::read_to_string(&victim).unwrap(), "original");
    assert_eq!(fs::read_dir(dispatcher.resolver().root()).unwrap().count(), 0);
}

/// Test that resolved paths always stay under the root.
#[test]
fn test_resolved_paths_stay_under_root() {
    let temp = TempDir::new().unwrap();
    let config = SandboxConfig::new(temp.path()).unwrap();
    let resolver = PathResolver::new(&config);

    for path in ["", ".", "a", "a/b/c.txt", "./x", "dir/./file", ".hidden", "a b/c d.txt"] {
        let resolved = resolver.resolve(path).unwrap();
        assert!(
            resolved.as_path().starts_with(config.base_dir()),
            "'{path}' resolved to {}",
            resolved.as_path().display()
        );
    }
}
