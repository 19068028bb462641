// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! URI resolution and materialization backed by the blob store.
//!
//! Packaging resolves every bundle URI through this layer so image builds
//! never touch blob-store internals directly.

use crate::blob::{copy_tree, BlobStore, StoreError, BLOB_SCHEME};
use std::fs;
use std::path::Path;

/// Resolves `blob://` URIs and materializes their content at a destination.
#[derive(Debug, Clone)]
pub struct UriDownloader {
    blobs: BlobStore,
}

impl UriDownloader {
    pub fn new(blobs: BlobStore) -> Self {
        Self { blobs }
    }

    /// Materialize the content behind `uri` at `dest`.
    ///
    /// File blobs become the file `dest` itself; directory blobs become the
    /// directory `dest` with the full relative tree preserved.
    pub fn materialize(&self, uri: &str, dest: &Path) -> Result<(), StoreError> {
        if !uri.starts_with(BLOB_SCHEME) {
            return Err(StoreError::InvalidUri(uri.to_string()));
        }
        let src = self.blobs.get_path(uri)?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        if src.is_dir() {
            copy_tree(&src, dest)?;
        } else {
            fs::copy(&src, dest)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "downloader_tests.rs"]
mod tests;
