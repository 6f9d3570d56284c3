//! Symlink escape tests.
//!
//! A symlink inside the sandbox may point anywhere; following it must never
//! give access to what lies outside.

#![cfg(unix)]

use fsbox_core::{ErrorKind, SandboxConfig};
use fsbox_files::Dispatcher;
use serde_json::json;
use std::fs;
use std::os::unix::fs::symlink;
use tempfile::TempDir;

struct Fixture {
    _temp: TempDir,
    outside: std::path::PathBuf,
    inside: std::path::PathBuf,
    dispatcher: Dispatcher,
}

fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let inside = temp.path().join("box");
    let outside = temp.path().join("outside");
    fs::create_dir(&outside).unwrap();
    fs::write(outside.join("secret.txt"), "top secret").unwrap();

    let dispatcher = Dispatcher::new(&SandboxConfig::new(&inside).unwrap());
    Fixture {
        _temp: temp,
        outside,
        inside,
        dispatcher,
    }
}

fn assert_violation(dispatcher: &Dispatcher, name: &str, args: serde_json::Value) {
    let response = dispatcher.dispatch(name, args.clone());
    let failure = response
        .error
        .unwrap_or_else(|| panic!("{name} {args} should fail"));
    assert_eq!(failure.kind, ErrorKind::PathViolation, "{name} {args}");
}

/// Test that a directory symlink pointing out cannot be read through.
#[test]
fn test_directory_symlink_escape() {
    let fx = fixture();
    symlink(&fx.outside, fx.inside.join("link")).unwrap();

    assert_violation(&fx.dispatcher, "read", json!({"path": "link/secret.txt"}));
    assert_violation(&fx.dispatcher, "list", json!({"path": "link"}));
    assert_violation(&fx.dispatcher, "tree", json!({"path": "link"}));
    assert_violation(
        &fx.dispatcher,
        "write",
        json!({"path": "link/planted.txt", "content": "x"}),
    );
    assert_violation(
        &fx.dispatcher,
        "delete",
        json!({"path": "link/secret.txt"}),
    );

    assert!(!fx.outside.join("planted.txt").exists());
    assert_eq!(
        fs::read_to_string(fx.outside.join("secret.txt")).unwrap(),
        "top secret"
    );
}

/// Test that a file symlink pointing out cannot be overwritten or deleted.
#[test]
fn test_file_symlink_escape() {
    let fx = fixture();
    symlink(fx.outside.join("secret.txt"), fx.inside.join("alias.txt")).unwrap();

    assert_violation(&fx.dispatcher, "read", json!({"path": "alias.txt"}));
    assert_violation(
        &fx.dispatcher,
        "write",
        json!({"path": "alias.txt", "content": "overwritten"}),
    );
    assert_violation(
        &fx.dispatcher,
        "patch",
        json!({"path": "alias.txt", "patch": "--- a\n+++ b\n"}),
    );

    assert_eq!(
        fs::read_to_string(fx.outside.join("secret.txt")).unwrap(),
        "top secret"
    );
}

/// Test that a dangling symlink cannot be used to create a file later.
#[test]
fn test_dangling_symlink_is_rejected() {
    let fx = fixture();
    symlink(fx.outside.join("future.txt"), fx.inside.join("dangling")).unwrap();

    assert_violation(
        &fx.dispatcher,
        "write",
        json!({"path": "dangling", "content": "x"}),
    );
    assert!(!fx.outside.join("future.txt").exists());
}

/// Test that a tree of the root fails as a whole when any branch escapes.
#[test]
fn test_tree_fails_on_nested_escape() {
    let fx = fixture();
    fs::create_dir_all(fx.inside.join("a/b")).unwrap();
    fs::write(fx.inside.join("a/ok.txt"), "").unwrap();
    symlink(&fx.outside, fx.inside.join("a/b/out")).unwrap();

    assert_violation(&fx.dispatcher, "tree", json!({"path": ""}));
}

/// Test that listing shows escaping symlinks by name without following them.
#[test]
fn test_list_does_not_follow_into_outside() {
    let fx = fixture();
    symlink(&fx.outside, fx.inside.join("link")).unwrap();

    let outcome = fx.dispatcher.handle("list", json!({"path": ""})).unwrap();
    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["entries"], json!(["link"]));
    assert!(!value.to_string().contains("secret"));
}

/// Test that deleting an escaping symlink removes nothing outside.
#[test]
fn test_recursive_delete_does_not_follow_out() {
    let fx = fixture();
    fs::create_dir(fx.inside.join("dir")).unwrap();
    symlink(&fx.outside, fx.inside.join("dir/out")).unwrap();

    fx.dispatcher
        .handle("delete", json!({"path": "dir", "recursive": true}))
        .unwrap();

    assert!(!fx.inside.join("dir").exists());
    assert!(fx.outside.join("secret.txt").exists());
}

/// Test that deleting a symlink removes the link, not its target.
#[test]
fn test_delete_symlink_removes_link_only() {
    let fx = fixture();
    fs::create_dir(fx.inside.join("real")).unwrap();
    fs::write(fx.inside.join("real/keep.txt"), "keep").unwrap();
    symlink(fx.inside.join("real"), fx.inside.join("alias")).unwrap();

    fx.dispatcher
        .handle("delete", json!({"path": "alias", "recursive": true}))
        .unwrap();

    assert!(fs::symlink_metadata(fx.inside.join("alias")).is_err());
    assert_eq!(
        fs::read_to_string(fx.inside.join("real/keep.txt")).unwrap(),
        "keep"
    );

    let again = fx.dispatcher.dispatch("delete", json!({"path": "alias"}));
    assert_eq!(again.error.unwrap().kind, ErrorKind::NotFound);
}

/// Test that escaping and dangling links can be cleaned up safely.
#[test]
fn test_delete_escaping_and_dangling_links() {
    let fx = fixture();
    symlink(fx.outside.join("secret.txt"), fx.inside.join("alias.txt")).unwrap();
    symlink(&fx.outside, fx.inside.join("link")).unwrap();
    symlink(fx.outside.join("future.txt"), fx.inside.join("dangling")).unwrap();

    for path in ["alias.txt", "link", "dangling"] {
        fx.dispatcher
            .handle("delete", json!({"path": path, "recursive": true}))
            .unwrap();
        assert!(fs::symlink_metadata(fx.inside.join(path)).is_err(), "{path}");
    }

    assert_eq!(
        fs::read_to_string(fx.outside.join("secret.txt")).unwrap(),
        "top secret"
    );
    let listed = fx.dispatcher.handle("list", json!({"path": ""})).unwrap();
    assert_eq!(serde_json::to_value(&listed).unwrap()["entries"], json!([]));
}
