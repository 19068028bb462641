// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hive-kernel: the agent orchestration control plane.
//!
//! Composes the leaf components into a spawn/turn/cleanup lifecycle:
//!
//! - [`ports`] — exclusive port lease pool
//! - [`registry`] — authoritative table of live agent handles
//! - [`resolver`] — agent id → network address mapping
//! - [`server`] — per-agent streaming turn server
//! - [`client`] — turn client driving streamed responses
//! - [`spawner`] — pluggable execution backends (local, sandbox, cluster)
//! - [`kernel`] — facade owning the above plus teardown

pub mod client;
pub mod env;
pub mod handler;
pub mod kernel;
pub mod ports;
pub mod registry;
pub mod resolver;
pub mod server;
pub mod spawner;

pub use client::{AgentClient, ClientError};
pub use handler::{EchoHandler, TurnHandler};
pub use kernel::AgentKernel;
pub use ports::{PortAllocator, PortError};
pub use registry::{AgentRegistry, ListFilter, RegistryError};
pub use resolver::{RegistryResolver, Resolver};
pub use server::{AgentServer, ServerHandle};
pub use spawner::cluster::ClusterSpawner;
pub use spawner::local::LocalSpawner;
pub use spawner::sandbox::SandboxSpawner;
pub use spawner::{Spawner, SpawnerError};
