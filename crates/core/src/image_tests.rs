// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn source_bundle_new_sets_required_labels() {
    let bundle = SourceBundle::new("blob://abc", "tools", "source");
    assert_eq!(bundle.name().unwrap(), "tools");
    assert_eq!(bundle.labels.get(BUNDLE_LABEL_TYPE).map(String::as_str), Some("source"));
}

#[test]
fn source_bundle_missing_name_label_fails() {
    let bundle = SourceBundle {
        uri: "blob://abc".to_string(),
        labels: HashMap::from([(BUNDLE_LABEL_TYPE.to_string(), "source".to_string())]),
    };
    assert_eq!(
        bundle.name(),
        Err(BundleError::MissingLabel { uri: "blob://abc".to_string(), label: BUNDLE_LABEL_NAME })
    );
}

#[test]
fn source_bundle_missing_type_label_fails() {
    let bundle = SourceBundle {
        uri: "blob://abc".to_string(),
        labels: HashMap::from([(BUNDLE_LABEL_NAME.to_string(), "tools".to_string())]),
    };
    assert_eq!(
        bundle.name(),
        Err(BundleError::MissingLabel { uri: "blob://abc".to_string(), label: BUNDLE_LABEL_TYPE })
    );
}

#[test]
fn packaging_job_constructors() {
    let image = Image {
        id: ImageId::from_string("img-1"),
        name: "base".to_string(),
        path: "/tmp/img-1".to_string(),
    };
    let ok = PackagingJob::succeeded(image.clone());
    assert_eq!(ok.status, PackagingStatus::Succeeded);
    assert_eq!(ok.image, Some(image));
    assert!(ok.error.is_none());

    let failed = PackagingJob::failed("bundle not found");
    assert_eq!(failed.status, PackagingStatus::Failed);
    assert!(failed.image.is_none());
    assert_eq!(failed.error.as_deref(), Some("bundle not found"));
}

#[test]
fn image_serde_roundtrip_registry_tag_path() {
    let image = Image {
        id: ImageId::from_string("img-2"),
        name: "remote".to_string(),
        path: "registry.example.com/agents/remote:v3".to_string(),
    };
    let json = serde_json::to_string(&image).unwrap();
    let restored: Image = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, image);
}
