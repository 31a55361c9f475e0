//! End-to-end runs of the slideshow-cache binary against a temporary root

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

fn cache_cmd(root: &std::path::Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("slideshow-cache").unwrap();
    cmd.env("SLIDESHOW_CACHE_DIR", root).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_put_then_cat_roundtrips_body() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("cache");
    let body = temp_dir.path().join("slide.png");
    fs::write(&body, PNG_MAGIC).unwrap();

    cache_cmd(&root)
        .args(["put", "http://x/slide.png"])
        .arg(&body)
        .args(["-H", "Content-Type: image/png"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with(".png\n"));

    cache_cmd(&root)
        .args(["cat", "http://x/slide.png"])
        .assert()
        .success()
        .stdout(PNG_MAGIC);

    assert!(root.join("storage-keys.json").is_file());
}

#[test]
fn test_list_and_remove() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("cache");
    let body = temp_dir.path().join("notes.txt");
    fs::write(&body, "speaker notes").unwrap();

    cache_cmd(&root)
        .args(["put", "http://x/notes"])
        .arg(&body)
        .assert()
        .success();

    cache_cmd(&root)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("200\thttp://x/notes\t"));

    cache_cmd(&root)
        .args(["remove", "http://x/notes"])
        .assert()
        .success()
        .stdout("removed http://x/notes\n");

    cache_cmd(&root)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_show_missing_key_fails() {
    let temp_dir = TempDir::new().unwrap();

    cache_cmd(temp_dir.path())
        .args(["show", "http://x/missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No cached entry for http://x/missing"));
}
