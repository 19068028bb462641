// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

fn store() -> (TempDir, BlobStore) {
    let dir = TempDir::new().unwrap();
    let store = BlobStore::new(dir.path().join("blobs")).unwrap();
    (dir, store)
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn upload_identical_content_returns_same_uri() {
    let (dir, store) = store();
    let a = write_file(&dir, "a.txt", "same bytes");
    let b = write_file(&dir, "b.txt", "same bytes");

    let uri_a = store.upload(&a).unwrap();
    let uri_b = store.upload(&b).unwrap();
    assert_eq!(uri_a, uri_b);
    assert!(uri_a.starts_with(BLOB_SCHEME));
}

#[test]
fn upload_different_content_returns_different_uris() {
    let (dir, store) = store();
    let a = write_file(&dir, "a.txt", "first");
    let b = write_file(&dir, "b.txt", "second");

    assert_ne!(store.upload(&a).unwrap(), store.upload(&b).unwrap());
}

#[test]
fn upload_nonexistent_path_is_not_found() {
    let (dir, store) = store();
    let err = store.upload(&dir.path().join("missing.txt")).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn upload_dir_on_file_is_not_a_directory() {
    let (dir, store) = store();
    let file = write_file(&dir, "plain.txt", "x");
    let err = store.upload_dir(&file).unwrap_err();
    assert!(matches!(err, StoreError::NotADirectory(_)));
}

#[test]
fn upload_dir_preserves_nested_tree() {
    let (dir, store) = store();
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("nested/deep")).unwrap();
    fs::write(src.join("top.txt"), "top").unwrap();
    fs::write(src.join("nested/mid.txt"), "mid").unwrap();
    fs::write(src.join("nested/deep/leaf.txt"), "leaf").unwrap();

    let uri = store.upload_dir(&src).unwrap();
    let stored = store.get_path(&uri).unwrap();

    assert_eq!(fs::read_to_string(stored.join("top.txt")).unwrap(), "top");
    assert_eq!(fs::read_to_string(stored.join("nested/mid.txt")).unwrap(), "mid");
    assert_eq!(fs::read_to_string(stored.join("nested/deep/leaf.txt")).unwrap(), "leaf");
}

#[test]
fn upload_dir_identical_trees_deduplicate() {
    let (dir, store) = store();
    for name in ["one", "two"] {
        let src = dir.path().join(name);
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("sub/f.txt"), "payload").unwrap();
    }

    let uri_one = store.upload_dir(&dir.path().join("one")).unwrap();
    let uri_two = store.upload_dir(&dir.path().join("two")).unwrap();
    assert_eq!(uri_one, uri_two);
}

#[test]
fn get_path_unknown_uri_is_not_found() {
    let (_dir, store) = store();
    let err = store.get_path("blob://deadbeef").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn get_path_malformed_uri_is_invalid() {
    let (_dir, store) = store();
    assert!(matches!(store.get_path("file:///etc/passwd").unwrap_err(), StoreError::InvalidUri(_)));
    assert!(matches!(store.get_path("blob://../escape").unwrap_err(), StoreError::InvalidUri(_)));
}

#[test]
fn exists_never_errors() {
    let (dir, store) = store();
    assert!(!store.exists("blob://deadbeef"));
    assert!(!store.exists("not-a-uri"));

    let file = write_file(&dir, "f.txt", "content");
    let uri = store.upload(&file).unwrap();
    assert!(store.exists(&uri));
}

#[cfg(unix)]
#[test]
fn upload_dir_distinguishes_non_utf8_file_names() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let (dir, store) = store();

    // Same content, file names differing only in invalid UTF-8 bytes; a
    // lossy conversion would collapse both names to "f\u{FFFD}"
    let tree_a = dir.path().join("tree_a");
    let tree_b = dir.path().join("tree_b");
    fs::create_dir_all(&tree_a).unwrap();
    fs::create_dir_all(&tree_b).unwrap();
    fs::write(tree_a.join(OsStr::from_bytes(b"f\xff")), "payload").unwrap();
    fs::write(tree_b.join(OsStr::from_bytes(b"f\xfe")), "payload").unwrap();

    assert_ne!(store.upload_dir(&tree_a).unwrap(), store.upload_dir(&tree_b).unwrap());
}
