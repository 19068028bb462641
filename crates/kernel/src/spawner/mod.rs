// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pluggable execution backends.
//!
//! Backends differ only in isolation mechanism — in-process task, sandboxed
//! subprocess, or cluster pod. The spawn contract is identical across all
//! three: allocate a port, start the execution unit, register the agent as
//! pending, wait for readiness, flip it to running, and return the handle
//! plus its nonce. Startup failure releases the port and leaves no registry
//! entry behind.

pub mod cluster;
pub mod local;
pub mod sandbox;

use crate::ports::PortError;
use crate::registry::RegistryError;
use async_trait::async_trait;
use hive_core::{Agent, AgentId, AgentState, SpawnRequest, SpawnResult};

/// Errors from spawner operations.
#[derive(Debug, thiserror::Error)]
pub enum SpawnerError {
    #[error("spawn failed: {0}")]
    SpawnFailed(String),

    #[error("agent not found: {0}")]
    NotFound(AgentId),

    #[error(transparent)]
    Ports(#[from] PortError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Starts and stops agent execution units.
///
/// Callers depend only on this trait, never on a concrete backend.
#[async_trait]
pub trait Spawner: Send + Sync + 'static {
    /// Start an execution unit for the request and return its agent handle
    /// together with the turn-authorization nonce. The nonce is returned
    /// exactly once; it is not recoverable afterwards.
    async fn spawn(&self, request: SpawnRequest) -> Result<SpawnResult, SpawnerError>;

    /// Terminate the execution unit, transition the agent to stopped, and
    /// return its port to the pool.
    async fn stop(&self, agent_id: &AgentId) -> Result<(), SpawnerError>;
}

/// Per-agent turn-authorization capability.
fn generate_nonce() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Poll until a TCP connect to the agent's turn server succeeds.
///
/// Backends pass the interval and attempt count from `HIVE_READY_POLL_MS` /
/// `HIVE_READY_ATTEMPTS`.
async fn poll_until_ready(
    addr: &str,
    backend: &str,
    interval: std::time::Duration,
    max_attempts: usize,
) -> Result<(), SpawnerError> {
    for i in 0..max_attempts {
        if i > 0 {
            tokio::time::sleep(interval).await;
        }
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            tracing::info!(%addr, attempt = i, backend, "agent server ready");
            return Ok(());
        }
    }
    Err(SpawnerError::SpawnFailed(format!(
        "{} agent at {} not ready within {}s",
        backend,
        addr,
        (interval.as_millis() as u64 * max_attempts as u64) / 1000
    )))
}

/// Build the registry record for a freshly started execution unit.
fn pending_agent(request: &SpawnRequest, id: AgentId, port: u16) -> Agent {
    Agent {
        id,
        name: request.name.clone(),
        team_id: request.team_id.clone(),
        agent_type: request.agent_type.clone(),
        image_id: request.image_id.clone(),
        http_port: port,
        state: AgentState::Pending,
        metadata: request.metadata.clone(),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
