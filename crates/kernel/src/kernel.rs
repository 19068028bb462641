// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kernel facade: one handle composing spawn, turn, and teardown.
//!
//! Owns the registry, port pool, spawner, and turn client. Components are
//! explicitly constructed and explicitly owned; there are no ambient
//! singletons, and `cleanup` is the single authoritative teardown point.

use crate::client::{AgentClient, ClientError};
use crate::ports::PortAllocator;
use crate::registry::{AgentRegistry, ListFilter};
use crate::resolver::RegistryResolver;
use crate::spawner::local::LocalSpawner;
use crate::spawner::{Spawner, SpawnerError};
use hive_core::{Agent, AgentId, AgentState, Message, SpawnRequest, SpawnResult};
use hive_wire::{TurnChunk, TurnRequest};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Errors surfaced by kernel operations.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error(transparent)]
    Spawner(#[from] SpawnerError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Facade over the orchestration components.
pub struct AgentKernel {
    registry: Arc<AgentRegistry>,
    ports: Arc<PortAllocator>,
    spawner: Arc<dyn Spawner>,
    client: AgentClient,
}

impl AgentKernel {
    /// Compose a kernel from explicitly constructed parts. The spawner must
    /// share `registry` and `ports` with the kernel.
    pub fn new(
        registry: Arc<AgentRegistry>,
        ports: Arc<PortAllocator>,
        spawner: Arc<dyn Spawner>,
    ) -> Self {
        let client = AgentClient::new(Arc::new(RegistryResolver::new(Arc::clone(&registry))));
        Self { registry, ports, spawner, client }
    }

    /// Kernel wired to the local backend over the given port range.
    pub fn local(port_start: u16, port_end: u16) -> Self {
        let registry = Arc::new(AgentRegistry::new());
        let ports = Arc::new(PortAllocator::new(port_start, port_end));
        let spawner = Arc::new(LocalSpawner::new(Arc::clone(&registry), Arc::clone(&ports)));
        Self::new(registry, ports, spawner)
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Spawn one agent through the configured backend.
    pub async fn spawn(&self, request: SpawnRequest) -> Result<SpawnResult, KernelError> {
        Ok(self.spawner.spawn(request).await?)
    }

    /// Stop one agent and release its resources.
    pub async fn stop(&self, agent_id: &AgentId) -> Result<(), KernelError> {
        Ok(self.spawner.stop(agent_id).await?)
    }

    /// Open a turn stream against a spawned agent.
    pub async fn turn(
        &self,
        request: TurnRequest,
    ) -> Result<mpsc::Receiver<TurnChunk>, KernelError> {
        Ok(self.client.turn(request).await?)
    }

    /// Fetch an agent's full server-side conversation history.
    pub async fn get_history(&self, agent_id: &AgentId) -> Result<Vec<Message>, KernelError> {
        Ok(self.client.get_history(agent_id).await?)
    }

    /// List registered agents matching the filter.
    pub fn list(&self, filter: &ListFilter) -> Vec<Agent> {
        self.registry.list(filter)
    }

    /// Tear down every spawned execution unit, best-effort.
    ///
    /// Individual backend failures are logged and skipped, never aborting
    /// the sweep. Every registry entry is removed and every outstanding port
    /// released regardless of what the backend reports.
    pub async fn cleanup(&self) {
        let ids = self.registry.ids();
        info!(agents = ids.len(), "kernel cleanup started");

        for agent_id in ids {
            if let Err(e) = self.spawner.stop(&agent_id).await {
                warn!(%agent_id, error = %e, "backend stop failed during cleanup");
                // A successful stop already returned the port, and a stopped
                // record's port may have been re-leased since. Only reclaim
                // leases the backend failed to give back.
                if let Some(agent) = self.registry.get(&agent_id) {
                    if agent.state != AgentState::Stopped {
                        self.ports.release(agent.http_port);
                    }
                }
            }
            if let Err(e) = self.registry.delete(&agent_id) {
                warn!(%agent_id, error = %e, "registry delete failed during cleanup");
            }
        }

        info!(leased = self.ports.leased(), "kernel cleanup finished");
    }
}

#[cfg(test)]
#[path = "kernel_tests.rs"]
mod tests;
