//! Integration tests for writing, listing and deleting posts

#![allow(deprecated)]

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

mod common;
use common::diary_cmd;

fn init_diary(root: &Path) {
    diary_cmd().arg("init").arg(root).assert().success();
}

fn create_post(root: &Path, args: &[&str]) -> String {
    let output = diary_cmd()
        .current_dir(root)
        .arg("new")
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);

    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .trim()
        .strip_prefix("Created post ")
        .expect("create output")
        .to_string()
}

#[test]
fn test_create_and_list_scenario() {
    let temp = TempDir::new().unwrap();
    init_diary(temp.path());

    let id = create_post(
        temp.path(),
        &["--title", "오늘의 기록", "--content", "<b>hi</b>", "--date", "2025-07-05"],
    );

    diary_cmd()
        .current_dir(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 post\n"))
        .stdout(predicate::str::contains(format!("2025-07-05  {}  오늘의 기록", id)));

    diary_cmd()
        .current_dir(temp.path())
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: 오늘의 기록"))
        .stdout(predicate::str::contains("<b>hi</b>"));

    let stored = fs::read_to_string(temp.path().join(".diary/storage/diary_posts")).unwrap();
    assert!(stored.contains("\"createdAt\":\"2025-07-05\""));
}

#[test]
fn test_list_orders_by_date() {
    let temp = TempDir::new().unwrap();
    init_diary(temp.path());

    create_post(temp.path(), &["--title", "older", "--content", "a", "--date", "2025-07-01"]);
    create_post(temp.path(), &["--title", "newer", "--content", "b", "--date", "2025-07-05"]);

    let output = diary_cmd()
        .current_dir(temp.path())
        .arg("list")
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();

    let newer = stdout.find("newer").unwrap();
    let older = stdout.find("older").unwrap();
    assert!(newer < older);
}

#[test]
fn test_bad_date_falls_back_to_today() {
    let temp = TempDir::new().unwrap();
    init_diary(temp.path());

    let id = create_post(
        temp.path(),
        &["--title", "undated", "--content", "x", "--date", "yesterday-ish"],
    );

    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
    diary_cmd()
        .current_dir(temp.path())
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Date: {}", today)));
}

#[test]
fn test_edit_replaces_fields() {
    let temp = TempDir::new().unwrap();
    init_diary(temp.path());

    let id = create_post(
        temp.path(),
        &["--title", "draft", "--content", "<p>first</p>", "--date", "2025-07-05"],
    );

    diary_cmd()
        .current_dir(temp.path())
        .args(["edit", &id, "--title", "final", "--content", "<p>second</p>"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Updated post {}", id)));

    diary_cmd()
        .current_dir(temp.path())
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: final"))
        .stdout(predicate::str::contains("Date: 2025-07-05"))
        .stdout(predicate::str::contains("<p>second</p>"))
        .stdout(predicate::str::contains("first").not());
}

#[test]
fn test_paste_is_sanitized() {
    let temp = TempDir::new().unwrap();
    init_diary(temp.path());

    let id = create_post(
        temp.path(),
        &[
            "--title",
            "pasted",
            "--paste",
            "<ul class=\"x\"><li style=\"color:red\"><span>one</span></li></ul><script>bad()</script>",
        ],
    );

    let stored = fs::read_to_string(temp.path().join(".diary/storage/diary_posts")).unwrap();
    assert!(stored.contains("<ul><li>one</li></ul>"));
    assert!(!stored.contains("style="));
    assert!(!stored.contains("class="));
    assert!(!stored.contains("bad()"));

    diary_cmd()
        .current_dir(temp.path())
        .args(["show", &id])
        .assert()
        .success();
}

#[test]
fn test_format_wraps_selection() {
    let temp = TempDir::new().unwrap();
    init_diary(temp.path());

    let id = create_post(temp.path(), &["--title", "t", "--content", "hello world"]);

    diary_cmd()
        .current_dir(temp.path())
        .args(["format", &id, "b", "world"])
        .assert()
        .success();

    diary_cmd()
        .current_dir(temp.path())
        .args(["format", &id, "a", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--href"));

    diary_cmd()
        .current_dir(temp.path())
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello <b>world</b>"));
}

#[test]
fn test_image_is_stored_inline_locally() {
    let temp = TempDir::new().unwrap();
    init_diary(temp.path());
    let image = temp.path().join("photo.png");
    fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

    let id = create_post(
        temp.path(),
        &["--title", "pic", "--content", "x", "--image", image.to_str().unwrap()],
    );

    diary_cmd()
        .current_dir(temp.path())
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Image: (inline)"));

    diary_cmd()
        .current_dir(temp.path())
        .args(["edit", &id, "--remove-image"])
        .assert()
        .success();

    diary_cmd()
        .current_dir(temp.path())
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Image:").not());
}

#[test]
fn test_delete_twice() {
    let temp = TempDir::new().unwrap();
    init_diary(temp.path());

    let id = create_post(temp.path(), &["--title", "gone", "--content", "x"]);

    diary_cmd()
        .current_dir(temp.path())
        .args(["delete", &id, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Deleted post {}", id)));

    diary_cmd()
        .current_dir(temp.path())
        .args(["delete", &id, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to delete"));

    diary_cmd()
        .current_dir(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No posts yet"));
}

#[test]
fn test_delete_declined_keeps_post() {
    let temp = TempDir::new().unwrap();
    init_diary(temp.path());

    let id = create_post(temp.path(), &["--title", "kept", "--content", "x"]);

    diary_cmd()
        .current_dir(temp.path())
        .args(["delete", &id])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled"));

    diary_cmd()
        .current_dir(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("kept"));
}

#[test]
fn test_legacy_dates_are_normalized_on_display() {
    let temp = TempDir::new().unwrap();
    init_diary(temp.path());

    fs::write(
        temp.path().join(".diary/storage/diary_posts"),
        r#"[{"id":"1720137600000","title":"legacy","content":"<p>written 2025. 07. 05.</p>","createdAt":"2025. 07. 05.","image":""}]"#,
    )
    .unwrap();

    diary_cmd()
        .current_dir(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-07-05  1720137600000  legacy"))
        .stdout(predicate::str::contains("2025. 07. 05.").not());

    diary_cmd()
        .current_dir(temp.path())
        .args(["show", "1720137600000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<p>written 2025-07-05</p>"))
        .stdout(predicate::str::contains("Image:").not());
}

#[test]
fn test_corrupt_local_data_reads_as_empty() {
    let temp = TempDir::new().unwrap();
    init_diary(temp.path());

    fs::write(temp.path().join(".diary/storage/diary_posts"), "{not json").unwrap();

    diary_cmd()
        .current_dir(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No posts yet"))
        .stderr(predicate::str::contains("unreadable"));

    diary_cmd()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("unreadable"));

    diary_cmd()
        .current_dir(temp.path())
        .args(["clear", "--yes"])
        .assert()
        .success();

    diary_cmd()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("No local data stored"));
}
