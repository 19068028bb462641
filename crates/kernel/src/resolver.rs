// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent id → network address resolution.

use crate::registry::AgentRegistry;
use hive_core::AgentId;
use std::sync::Arc;

/// Metadata key a backend may set to route traffic somewhere other than
/// loopback (e.g., a pod IP).
pub const HOST_METADATA_KEY: &str = "host";

/// Maps an agent id to the `host:port` its turn server listens on.
pub trait Resolver: Send + Sync + 'static {
    /// `None` if the agent id is unknown — callers must fail before any
    /// network I/O is attempted.
    fn resolve(&self, agent_id: &AgentId) -> Option<String>;
}

/// Resolver backed by the agent registry. Local and sandboxed agents listen
/// on loopback; cluster backends record the pod IP under the `host` metadata
/// key at registration time.
pub struct RegistryResolver {
    registry: Arc<AgentRegistry>,
}

impl RegistryResolver {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self { registry }
    }
}

impl Resolver for RegistryResolver {
    fn resolve(&self, agent_id: &AgentId) -> Option<String> {
        let agent = self.registry.get(agent_id)?;
        let host = agent
            .metadata
            .get(HOST_METADATA_KEY)
            .map(String::as_str)
            .unwrap_or("127.0.0.1");
        Some(format!("{}:{}", host, agent.http_port))
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
