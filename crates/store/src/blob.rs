// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-addressed blob storage.
//!
//! Blobs are keyed by a sha256 hash of their bytes (files) or of their
//! recursive tree (directories), so two uploads of identical content always
//! resolve to the same `blob://<hash>` URI. The store is
//! filesystem-authoritative: a blob exists iff `<root>/<hash>` exists.

use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// URI scheme for content-addressed blobs.
pub const BLOB_SCHEME: &str = "blob://";

/// Errors from blob storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("invalid blob uri: {0}")]
    InvalidUri(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Content-addressed file/directory store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Open (and create if needed) a blob store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Upload a single file, returning its content-addressed URI.
    ///
    /// Idempotent: re-uploading identical content (under any source name) is
    /// a no-op that returns the existing URI.
    pub fn upload(&self, path: &Path) -> Result<String, StoreError> {
        if !path.is_file() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }

        let hash = hash_file(path)?;
        let dest = self.root.join(&hash);
        if !dest.exists() {
            // Copy via temp name so a concurrent reader never sees a partial blob
            let tmp = self.root.join(format!("{}.tmp", hash));
            fs::copy(path, &tmp)?;
            fs::rename(&tmp, &dest)?;
        }

        Ok(format!("{}{}", BLOB_SCHEME, hash))
    }

    /// Upload a directory tree, returning its content-addressed URI.
    ///
    /// The full relative file tree is preserved under the blob. The tree hash
    /// covers sorted relative paths and per-file content hashes, so identical
    /// trees with different source names deduplicate.
    pub fn upload_dir(&self, path: &Path) -> Result<String, StoreError> {
        if !path.is_dir() {
            return Err(StoreError::NotADirectory(path.to_path_buf()));
        }

        let hash = hash_tree(path)?;
        let dest = self.root.join(&hash);
        if !dest.exists() {
            copy_tree(path, &dest)?;
        }

        Ok(format!("{}{}", BLOB_SCHEME, hash))
    }

    /// Resolve a blob URI to its stored path.
    pub fn get_path(&self, uri: &str) -> Result<PathBuf, StoreError> {
        let hash = parse_uri(uri)?;
        let path = self.root.join(hash);
        if !path.exists() {
            return Err(StoreError::NotFound(uri.to_string()));
        }
        Ok(path)
    }

    /// True if the URI names a stored blob. Never errors: malformed URIs and
    /// unknown hashes both report `false`.
    pub fn exists(&self, uri: &str) -> bool {
        match parse_uri(uri) {
            Ok(hash) => self.root.join(hash).exists(),
            Err(_) => false,
        }
    }
}

/// Extract the hash component from a `blob://<hash>` URI.
fn parse_uri(uri: &str) -> Result<&str, StoreError> {
    let hash = uri
        .strip_prefix(BLOB_SCHEME)
        .ok_or_else(|| StoreError::InvalidUri(uri.to_string()))?;
    if hash.is_empty() || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(StoreError::InvalidUri(uri.to_string()));
    }
    Ok(hash)
}

/// sha256 of a file's bytes, hex-encoded.
fn hash_file(path: &Path) -> Result<String, StoreError> {
    let mut hasher = Sha256::new();
    let mut file = fs::File::open(path)?;
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex_encode(&hasher.finalize()))
}

/// Deterministic hash of a directory tree: sorted relative paths interleaved
/// with per-file content hashes.
fn hash_tree(root: &Path) -> Result<String, StoreError> {
    let mut entries: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| StoreError::Io(e.into()))?;
        if entry.file_type().is_file() {
            entries.push(entry.path().to_path_buf());
        }
    }
    entries.sort();

    let mut hasher = Sha256::new();
    for path in entries {
        let rel = path.strip_prefix(root).unwrap_or(&path);
        // Raw encoded bytes, not a lossy string: file names that differ only
        // in non-UTF-8 bytes must hash differently
        hasher.update(rel.as_os_str().as_encoded_bytes());
        hasher.update([0u8]);
        hasher.update(hash_file(&path)?.as_bytes());
        hasher.update([0u8]);
    }
    Ok(hex_encode(&hasher.finalize()))
}

/// Recursively copy a directory tree, preserving relative structure.
pub(crate) fn copy_tree(src: &Path, dest: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(dest)?;
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| StoreError::Io(e.into()))?;
        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        if rel.as_os_str().is_empty() {
            continue;
        }
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
        // Symlinks are skipped: blob trees carry plain files only
    }
    Ok(())
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{:02x}", b);
        s
    })
}

#[cfg(test)]
#[path = "blob_tests.rs"]
mod tests;
