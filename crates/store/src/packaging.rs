// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image build pipeline: resolve source bundles into a persisted image.
//!
//! Build failures are expected, recoverable outcomes — they are captured in
//! the returned [`PackagingJob`] rather than raised, so batch workflows can
//! continue past one failed image. A failed build leaves no partial image
//! directory reachable through the image store.

use crate::downloader::UriDownloader;
use crate::image::ImageStore;
use hive_core::{ImageId, PackagingJob, SourceBundle};
use tracing::{info, warn};

/// Directory under an image root where bundles are materialized.
pub const BUNDLES_DIR: &str = "bundles";

/// Builds agent images from named source bundles.
#[derive(Debug, Clone)]
pub struct PackagingService {
    downloader: UriDownloader,
    images: ImageStore,
}

impl PackagingService {
    pub fn new(downloader: UriDownloader, images: ImageStore) -> Self {
        Self { downloader, images }
    }

    /// Build an image named `name` from `bundles`.
    ///
    /// Each bundle is materialized into `<image>/bundles/<label.name>`. Any
    /// bundle validation or resolution failure short-circuits the whole job;
    /// on success the image is persisted before return, so a subsequent
    /// `ImageStore::get` must succeed.
    pub fn create_agent_image(&self, name: &str, bundles: &[SourceBundle]) -> PackagingJob {
        let id = ImageId::new();
        let image_dir = self.images.staging_path(&id);
        let bundles_dir = image_dir.join(BUNDLES_DIR);

        for bundle in bundles {
            let bundle_name = match bundle.name() {
                Ok(n) => n,
                Err(e) => return self.fail(&id, name, e.to_string()),
            };
            let dest = bundles_dir.join(bundle_name);
            if let Err(e) = self.downloader.materialize(&bundle.uri, &dest) {
                return self.fail(
                    &id,
                    name,
                    format!("bundle {} ({}): {}", bundle_name, bundle.uri, e),
                );
            }
        }

        match self.images.create(&id, name, None) {
            Ok(image) => {
                info!(image_id = %id, %name, bundles = bundles.len(), "agent image built");
                PackagingJob::succeeded(image)
            }
            Err(e) => self.fail(&id, name, format!("manifest write failed: {}", e)),
        }
    }

    /// Discard the staged directory and report the failure.
    fn fail(&self, id: &ImageId, name: &str, error: String) -> PackagingJob {
        warn!(image_id = %id, %name, %error, "agent image build failed");
        self.images.discard_staging(id);
        PackagingJob::failed(error)
    }
}

#[cfg(test)]
#[path = "packaging_tests.rs"]
mod tests;
