// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local backend — agents run as in-process server tasks.
//!
//! No isolation boundary: each agent is an [`AgentServer`] accept loop on a
//! loopback port inside this process. The cheapest backend, used by tests
//! and single-process deployments.

use super::{generate_nonce, pending_agent, Spawner, SpawnerError};
use crate::handler::{EchoHandler, TurnHandler};
use crate::ports::PortAllocator;
use crate::registry::AgentRegistry;
use crate::server::{AgentServer, ServerHandle};
use async_trait::async_trait;
use hive_core::{AgentId, AgentState, SpawnRequest, SpawnResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

type HandlerFactory = dyn Fn(&SpawnRequest) -> Arc<dyn TurnHandler> + Send + Sync;

/// Spawner that runs agents as in-process tasks.
pub struct LocalSpawner {
    registry: Arc<AgentRegistry>,
    ports: Arc<PortAllocator>,
    handler_factory: Arc<HandlerFactory>,
    handles: Mutex<HashMap<AgentId, ServerHandle>>,
}

impl LocalSpawner {
    /// Create a local spawner whose agents echo their input. Real handlers
    /// are injected via [`with_handler_factory`](Self::with_handler_factory).
    pub fn new(registry: Arc<AgentRegistry>, ports: Arc<PortAllocator>) -> Self {
        Self {
            registry,
            ports,
            handler_factory: Arc::new(|_| Arc::new(EchoHandler)),
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the per-agent handler constructor. The factory runs once per
    /// spawn and may inspect the request's `spawn_info`.
    pub fn with_handler_factory(
        mut self,
        factory: impl Fn(&SpawnRequest) -> Arc<dyn TurnHandler> + Send + Sync + 'static,
    ) -> Self {
        self.handler_factory = Arc::new(factory);
        self
    }
}

#[async_trait]
impl Spawner for LocalSpawner {
    async fn spawn(&self, request: SpawnRequest) -> Result<SpawnResult, SpawnerError> {
        let port = self.ports.allocate()?;
        let agent_id = AgentId::new();
        let nonce = generate_nonce();

        let handler = (self.handler_factory)(&request);
        let server = AgentServer::new(agent_id.clone(), nonce.clone(), handler);
        let handle = match server.start("127.0.0.1", port).await {
            Ok(handle) => handle,
            Err(e) => {
                self.ports.release(port);
                return Err(SpawnerError::SpawnFailed(format!("server bind failed: {}", e)));
            }
        };

        let agent = pending_agent(&request, agent_id.clone(), port);
        if let Err(e) = self.registry.register(agent.clone()) {
            handle.cleanup().await;
            self.ports.release(port);
            return Err(e.into());
        }

        // The server is bound and serving, so the agent is ready immediately.
        self.registry.update_state(&agent_id, AgentState::Running)?;
        self.handles.lock().insert(agent_id.clone(), handle);

        info!(%agent_id, port, "local agent spawned");

        let mut agent = agent;
        agent.state = AgentState::Running;
        Ok(SpawnResult { agent, nonce })
    }

    async fn stop(&self, agent_id: &AgentId) -> Result<(), SpawnerError> {
        let handle = self
            .handles
            .lock()
            .remove(agent_id)
            .ok_or_else(|| SpawnerError::NotFound(agent_id.clone()))?;

        handle.cleanup().await;

        let agent = self
            .registry
            .get(agent_id)
            .ok_or_else(|| SpawnerError::NotFound(agent_id.clone()))?;
        self.registry.update_state(agent_id, AgentState::Stopped)?;
        self.ports.release(agent.http_port);

        info!(%agent_id, port = agent.http_port, "local agent stopped");
        Ok(())
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
