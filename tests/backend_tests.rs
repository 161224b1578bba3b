//! Integration tests for backend selection and the directory remote

#![allow(deprecated)]

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

mod common;
use common::diary_cmd;

fn init_with_remote(root: &Path, remote: &Path) {
    diary_cmd()
        .arg("init")
        .arg(root)
        .arg("--remote")
        .arg(remote)
        .assert()
        .success();

    // Keep probes of a missing remote short
    diary_cmd()
        .current_dir(root)
        .args(["config", "ready_timeout_ms", "50"])
        .assert()
        .success();
    diary_cmd()
        .current_dir(root)
        .args(["config", "ready_poll_interval_ms", "5"])
        .assert()
        .success();
}

#[test]
fn test_remote_mode_stores_documents() {
    let temp = TempDir::new().unwrap();
    let remote = TempDir::new().unwrap();
    init_with_remote(temp.path(), remote.path());

    diary_cmd()
        .current_dir(temp.path())
        .arg("backend")
        .assert()
        .success()
        .stdout(predicate::str::contains("Active: remote"));

    let image = temp.path().join("photo.png");
    fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

    diary_cmd()
        .current_dir(temp.path())
        .args(["new", "--title", "synced", "--content", "x", "--date", "2025-07-05"])
        .arg("--image")
        .arg(&image)
        .assert()
        .success();

    let documents: Vec<_> = fs::read_dir(remote.path().join("posts")).unwrap().collect();
    assert_eq!(documents.len(), 1);
    let blobs: Vec<_> = fs::read_dir(remote.path().join("blobs/posts")).unwrap().collect();
    assert_eq!(blobs.len(), 1);
    assert!(!temp.path().join(".diary/storage/diary_posts").exists());

    diary_cmd()
        .current_dir(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("synced  [image]"));
}

#[test]
fn test_missing_remote_falls_back_to_local() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("not-mounted");
    init_with_remote(temp.path(), &missing);

    diary_cmd()
        .current_dir(temp.path())
        .args(["backend", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Preferred: remote"))
        .stdout(predicate::str::contains("Active: local"))
        .stdout(predicate::str::contains("not available"));

    diary_cmd()
        .current_dir(temp.path())
        .args(["new", "--title", "offline", "--content", "x"])
        .assert()
        .success();

    assert!(temp.path().join(".diary/storage/diary_posts").exists());
    assert!(!missing.exists());
    assert_eq!(
        fs::read_to_string(temp.path().join(".diary/storage/use_remote")).unwrap(),
        "true"
    );
}

#[test]
fn test_toggle_switches_backend() {
    let temp = TempDir::new().unwrap();
    let remote = TempDir::new().unwrap();
    init_with_remote(temp.path(), remote.path());

    diary_cmd()
        .current_dir(temp.path())
        .args(["backend", "toggle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Active: local"));

    diary_cmd()
        .current_dir(temp.path())
        .args(["new", "--title", "local only", "--content", "x"])
        .assert()
        .success();
    assert!(!remote.path().join("posts").exists());

    diary_cmd()
        .current_dir(temp.path())
        .args(["backend", "toggle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Active: remote"));

    diary_cmd()
        .current_dir(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No posts yet"));
}

#[test]
fn test_remote_env_override() {
    let temp = TempDir::new().unwrap();
    let remote = TempDir::new().unwrap();
    diary_cmd().arg("init").arg(temp.path()).assert().success();

    diary_cmd()
        .current_dir(temp.path())
        .args(["backend", "remote"])
        .env("DIARY_REMOTE", remote.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Active: remote"));

    diary_cmd()
        .current_dir(temp.path())
        .env("DIARY_REMOTE", remote.path())
        .args(["new", "--title", "via env", "--content", "x"])
        .assert()
        .success();

    assert_eq!(fs::read_dir(remote.path().join("posts")).unwrap().count(), 1);
}

#[test]
fn test_import_into_remote() {
    let temp = TempDir::new().unwrap();
    let remote = TempDir::new().unwrap();
    init_with_remote(temp.path(), remote.path());

    let backup = temp.path().join("backup.json");
    fs::write(
        &backup,
        r#"[{"id":"a","title":"one","content":"","createdAt":"2025-07-01"},{"title":"two","content":"","createdAt":"2025-07-02"}]"#,
    )
    .unwrap();

    diary_cmd()
        .current_dir(temp.path())
        .arg("import")
        .arg(&backup)
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("restored 2 post(s)"));

    assert_eq!(fs::read_dir(remote.path().join("posts")).unwrap().count(), 2);
    assert!(remote.path().join("posts/a.json").is_file());

    diary_cmd()
        .current_dir(temp.path())
        .args(["show", "a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: one"));
}
