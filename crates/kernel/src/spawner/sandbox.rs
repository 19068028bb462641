// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandboxed backend — agents run as isolated subprocesses.
//!
//! Each agent is a `hive-agent` process started with its identity, nonce,
//! and port passed through the environment. The process boundary is the
//! isolation unit; communication happens exclusively over the turn protocol
//! on loopback.

use super::{generate_nonce, pending_agent, poll_until_ready, Spawner, SpawnerError};
use crate::env;
use crate::ports::PortAllocator;
use crate::registry::AgentRegistry;
use async_trait::async_trait;
use hive_core::{AgentId, AgentState, SpawnInfo, SpawnRequest, SpawnResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::process::{Child, Command};
use tracing::{info, warn};

/// Spawner that runs each agent as a `hive-agent` subprocess.
pub struct SandboxSpawner {
    registry: Arc<AgentRegistry>,
    ports: Arc<PortAllocator>,
    agent_bin: String,
    children: Mutex<HashMap<AgentId, Child>>,
}

impl SandboxSpawner {
    /// Create a sandbox spawner. The agent binary path is taken from
    /// `HIVE_AGENT_BIN` (default `hive-agent` on `$PATH`).
    pub fn new(registry: Arc<AgentRegistry>, ports: Arc<PortAllocator>) -> Self {
        Self { registry, ports, agent_bin: env::sandbox_agent_bin(), children: Mutex::new(HashMap::new()) }
    }

    /// Override the agent binary path (tests point this at a build artifact).
    pub fn with_agent_bin(mut self, path: impl Into<String>) -> Self {
        self.agent_bin = path.into();
        self
    }

    fn start_process(
        &self,
        request: &SpawnRequest,
        agent_id: &AgentId,
        nonce: &str,
        port: u16,
    ) -> Result<Child, SpawnerError> {
        let mut cmd = Command::new(&self.agent_bin);
        cmd.env("HIVE_AGENT_ID", agent_id.as_str())
            .env("HIVE_AGENT_NONCE", nonce)
            .env("HIVE_AGENT_PORT", port.to_string())
            .env("HIVE_AGENT_HOST", "127.0.0.1")
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());

        if let SpawnInfo::Conversational { ref env, .. } = request.spawn_info {
            for (key, value) in env {
                cmd.env(key, value);
            }
        }

        cmd.spawn().map_err(|e| {
            SpawnerError::SpawnFailed(format!("failed to spawn {}: {}", self.agent_bin, e))
        })
    }

    /// Kill a child and reap it off the spawn path. Used on both the stop
    /// path and failed-spawn cleanup.
    fn kill_and_reap(agent_id: &AgentId, mut child: Child) {
        if let Err(e) = child.start_kill() {
            // Already exited is the common case here
            warn!(%agent_id, error = %e, "kill signal failed");
        }
        let reaper_agent_id = agent_id.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => info!(agent_id = %reaper_agent_id, %status, "agent process exited"),
                Err(e) => warn!(agent_id = %reaper_agent_id, error = %e, "failed to wait on agent process"),
            }
        });
    }
}

#[async_trait]
impl Spawner for SandboxSpawner {
    async fn spawn(&self, request: SpawnRequest) -> Result<SpawnResult, SpawnerError> {
        let port = self.ports.allocate()?;
        let agent_id = AgentId::new();
        let nonce = generate_nonce();

        let child = match self.start_process(&request, &agent_id, &nonce, port) {
            Ok(child) => child,
            Err(e) => {
                self.ports.release(port);
                return Err(e);
            }
        };

        info!(%agent_id, port, bin = %self.agent_bin, "agent process spawned");

        let agent = pending_agent(&request, agent_id.clone(), port);
        if let Err(e) = self.registry.register(agent.clone()) {
            Self::kill_and_reap(&agent_id, child);
            self.ports.release(port);
            return Err(e.into());
        }

        let addr = format!("127.0.0.1:{}", port);
        let ready = poll_until_ready(
            &addr,
            "sandbox",
            env::ready_poll_interval(),
            env::ready_poll_attempts(),
        )
        .await;
        if let Err(e) = ready {
            // No partial state: the pending record must not outlive the failure
            let _ = self.registry.delete(&agent_id);
            Self::kill_and_reap(&agent_id, child);
            self.ports.release(port);
            return Err(e);
        }

        self.registry.update_state(&agent_id, AgentState::Running)?;
        self.children.lock().insert(agent_id.clone(), child);

        let mut agent = agent;
        agent.state = AgentState::Running;
        Ok(SpawnResult { agent, nonce })
    }

    async fn stop(&self, agent_id: &AgentId) -> Result<(), SpawnerError> {
        let child = self
            .children
            .lock()
            .remove(agent_id)
            .ok_or_else(|| SpawnerError::NotFound(agent_id.clone()))?;

        Self::kill_and_reap(agent_id, child);

        let agent = self
            .registry
            .get(agent_id)
            .ok_or_else(|| SpawnerError::NotFound(agent_id.clone()))?;
        self.registry.update_state(agent_id, AgentState::Stopped)?;
        self.ports.release(agent.http_port);

        info!(%agent_id, port = agent.http_port, "sandboxed agent stopped");
        Ok(())
    }
}

#[cfg(test)]
#[path = "sandbox_tests.rs"]
mod tests;
