// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image, bundle, and packaging-job types.
//!
//! An image is a built, immutable artifact an execution unit starts from.
//! `path` is either a local directory or a remote registry tag — callers
//! must not assume it is a filesystem directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_id! {
    /// Unique identifier for a built agent image.
    pub struct ImageId("img-");
}

/// Required bundle label: declares what kind of content the bundle carries.
pub const BUNDLE_LABEL_TYPE: &str = "type";
/// Bundle label used as the materialized directory name under `bundles/`.
pub const BUNDLE_LABEL_NAME: &str = "name";

/// A built agent image. Immutable once created; superseded only by a new id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    pub name: String,
    /// Local directory of the built image, or a remote registry tag when the
    /// image was created with one.
    pub path: String,
}

/// A named, labeled reference to source content to be materialized into an
/// image. `uri` is typically a `blob://<content-hash>` reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBundle {
    pub uri: String,
    /// Must include `type`; `name` is used as the materialized directory name.
    pub labels: HashMap<String, String>,
}

impl SourceBundle {
    pub fn new(uri: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            labels: HashMap::from([
                (BUNDLE_LABEL_NAME.to_string(), name.into()),
                (BUNDLE_LABEL_TYPE.to_string(), kind.into()),
            ]),
        }
    }

    /// Validate required labels and return the materialized directory name.
    pub fn name(&self) -> Result<&str, BundleError> {
        if !self.labels.contains_key(BUNDLE_LABEL_TYPE) {
            return Err(BundleError::MissingLabel { uri: self.uri.clone(), label: BUNDLE_LABEL_TYPE });
        }
        self.labels
            .get(BUNDLE_LABEL_NAME)
            .map(String::as_str)
            .ok_or_else(|| BundleError::MissingLabel { uri: self.uri.clone(), label: BUNDLE_LABEL_NAME })
    }
}

/// A bundle failed validation before resolution was attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BundleError {
    #[error("bundle {uri} is missing required label `{label}`")]
    MissingLabel { uri: String, label: &'static str },
}

/// Terminal status of a packaging job. Never partially successful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackagingStatus {
    Succeeded,
    Failed,
}

/// Outcome of `PackagingService::create_agent_image`.
///
/// A failed build is an expected, recoverable outcome — it is reported here
/// rather than as an error, so batch workflows can continue past one failed
/// image. Callers branch on `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagingJob {
    pub status: PackagingStatus,
    pub image: Option<Image>,
    pub error: Option<String>,
}

impl PackagingJob {
    pub fn succeeded(image: Image) -> Self {
        Self { status: PackagingStatus::Succeeded, image: Some(image), error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { status: PackagingStatus::Failed, image: None, error: Some(error.into()) }
    }
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
