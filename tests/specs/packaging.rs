// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Packaging pipeline specs: blobs → bundles → images.

use crate::prelude::*;
use hive_core::PackagingStatus;
use hive_store::UriDownloader;
use std::fs;
use tempfile::TempDir;

#[test]
fn uploaded_tree_builds_into_a_retrievable_image() {
    let dir = TempDir::new().unwrap();
    let blobs = BlobStore::new(dir.path().join("blobs")).unwrap();
    let images = ImageStore::new(dir.path().join("images")).unwrap();
    let service = PackagingService::new(UriDownloader::new(blobs.clone()), images.clone());

    let src = dir.path().join("tools");
    fs::create_dir_all(src.join("nested")).unwrap();
    fs::write(src.join("tool.py"), b"print('hi')").unwrap();
    fs::write(src.join("nested/config.json"), b"{}").unwrap();

    let uri = blobs.upload_dir(&src).unwrap();
    let job = service.create_agent_image("worker", &[SourceBundle::new(&uri, "tools", "dir")]);

    assert_eq!(job.status, PackagingStatus::Succeeded);
    let image = job.image.unwrap();
    assert_eq!(image.name, "worker");

    let root = images.get_path(&image.id).unwrap();
    assert_eq!(fs::read(root.join("bundles/tools/tool.py")).unwrap(), b"print('hi')");
    assert_eq!(fs::read(root.join("bundles/tools/nested/config.json")).unwrap(), b"{}");
}

#[test]
fn identical_content_reuses_the_same_uri_across_images() {
    let dir = TempDir::new().unwrap();
    let blobs = BlobStore::new(dir.path().join("blobs")).unwrap();

    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, b"same bytes").unwrap();
    fs::write(&b, b"same bytes").unwrap();

    assert_eq!(blobs.upload(&a).unwrap(), blobs.upload(&b).unwrap());
}

#[test]
fn failed_build_is_reported_not_raised_and_leaves_no_image() {
    let dir = TempDir::new().unwrap();
    let blobs = BlobStore::new(dir.path().join("blobs")).unwrap();
    let images = ImageStore::new(dir.path().join("images")).unwrap();
    let service = PackagingService::new(UriDownloader::new(blobs), images.clone());

    let bad = SourceBundle::new("blob://feedfacefeedface", "ghost", "file");
    let job = service.create_agent_image("broken", &[bad]);

    assert_eq!(job.status, PackagingStatus::Failed);
    assert!(job.error.is_some());
    assert!(job.image.is_none());
}
