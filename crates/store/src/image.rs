// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable manifest store for buildable agent images.
//!
//! Every image gets a per-id directory under the store root holding a
//! `manifest.json`. Images created with a registry tag keep the tag string
//! as their addressable path; the per-id directory then holds only the
//! manifest.

use hive_core::{Image, ImageId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Manifest file name, present at the root of every locally stored image.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Errors from image store operations.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("image not found: {0}")]
    NotFound(ImageId),

    #[error("image already exists: {0}")]
    AlreadyExists(ImageId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// On-disk manifest format.
#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    id: ImageId,
    name: String,
    path: String,
}

/// Manifest store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Open (and create if needed) an image store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ImageStoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory an image's content is staged into before `create` persists
    /// its manifest. Not reachable through `get` until the manifest exists.
    pub fn staging_path(&self, id: &ImageId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Persist an image manifest.
    ///
    /// With `registry_tag`, the image's `path` is the tag itself — a pointer
    /// to an externally hosted artifact, not a local directory.
    pub fn create(
        &self,
        id: &ImageId,
        name: &str,
        registry_tag: Option<&str>,
    ) -> Result<Image, ImageStoreError> {
        let dir = self.staging_path(id);
        if dir.join(MANIFEST_FILE).exists() {
            return Err(ImageStoreError::AlreadyExists(id.clone()));
        }
        fs::create_dir_all(&dir)?;

        let path = match registry_tag {
            Some(tag) => tag.to_string(),
            None => dir.display().to_string(),
        };
        let manifest = Manifest { id: id.clone(), name: name.to_string(), path: path.clone() };
        let bytes = serde_json::to_vec_pretty(&manifest)?;
        fs::write(dir.join(MANIFEST_FILE), bytes)?;

        Ok(Image { id: id.clone(), name: name.to_string(), path })
    }

    /// Look up an image by id. Absence is a valid outcome; a corrupt
    /// manifest is reported as absence after logging.
    pub fn get(&self, id: &ImageId) -> Option<Image> {
        let manifest_path = self.staging_path(id).join(MANIFEST_FILE);
        let bytes = fs::read(&manifest_path).ok()?;
        match serde_json::from_slice::<Manifest>(&bytes) {
            Ok(m) => Some(Image { id: m.id, name: m.name, path: m.path }),
            Err(e) => {
                tracing::warn!(%id, error = %e, "corrupt image manifest");
                None
            }
        }
    }

    /// Local per-id directory for an image. Errors if the id is unknown.
    pub fn get_path(&self, id: &ImageId) -> Result<PathBuf, ImageStoreError> {
        let dir = self.staging_path(id);
        if !dir.join(MANIFEST_FILE).exists() {
            return Err(ImageStoreError::NotFound(id.clone()));
        }
        Ok(dir)
    }

    /// True if an image manifest exists for this id.
    pub fn exists(&self, id: &ImageId) -> bool {
        self.staging_path(id).join(MANIFEST_FILE).exists()
    }

    /// Remove a staged image directory that never got a manifest.
    ///
    /// Used by packaging to guarantee failed builds leave nothing reachable.
    pub(crate) fn discard_staging(&self, id: &ImageId) {
        let dir = self.staging_path(id);
        if let Err(e) = fs::remove_dir_all(&dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(%id, error = %e, "failed to discard staged image dir");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
