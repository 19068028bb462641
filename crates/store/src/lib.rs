// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hive-store: durable artifact storage for the agent kernel.
//!
//! - [`blob`] — content-addressed blob storage (`blob://<hash>` URIs)
//! - [`image`] — manifest store for buildable agent images
//! - [`downloader`] — URI resolution and materialization
//! - [`packaging`] — builds images from named source bundles

pub mod blob;
pub mod downloader;
pub mod image;
pub mod packaging;

pub use blob::{BlobStore, StoreError, BLOB_SCHEME};
pub use downloader::UriDownloader;
pub use image::{ImageStore, ImageStoreError};
pub use packaging::PackagingService;
