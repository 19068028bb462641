// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hive-core: shared domain types for the hive agent orchestration kernel.

pub mod agent;
pub mod id;
pub mod image;
pub mod message;
pub mod spawn;

pub use agent::{Agent, AgentId, AgentState, TeamId};
pub use image::{
    BundleError, Image, ImageId, PackagingJob, PackagingStatus, SourceBundle, BUNDLE_LABEL_NAME,
    BUNDLE_LABEL_TYPE,
};
pub use message::{Message, Role};
pub use spawn::{SpawnInfo, SpawnRequest, SpawnResult};
