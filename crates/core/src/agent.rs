// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent identifier, record, and state types.
//!
//! An `Agent` is the registry's view of one running execution unit (local
//! task, sandboxed subprocess, or cluster pod). Records are created by a
//! spawner on successful spawn and mutated only through
//! `AgentRegistry::update_state`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

crate::define_id! {
    /// Unique identifier for an agent instance.
    ///
    /// Globally unique within a registry instance. The format is opaque to
    /// consumers; backends encode it into process args or pod names.
    pub struct AgentId("agt-");
}

crate::define_id! {
    /// Identifier for the team an agent belongs to.
    pub struct TeamId("team-");
}

/// Lifecycle state of an agent.
///
/// No other values are permitted. Transitions are recorded as-is; the
/// registry does not validate transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// Spawn accepted, execution unit not yet serving
    Pending,
    /// Execution unit is serving turns
    Running,
    /// Explicitly stopped via the spawner
    Stopped,
    /// Execution unit failed to start or died
    Failed,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AgentState::Pending => "pending",
            AgentState::Running => "running",
            AgentState::Stopped => "stopped",
            AgentState::Failed => "failed",
        })
    }
}

/// A live agent handle as tracked by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Agent instance ID
    pub id: AgentId,
    /// Human-readable name (e.g., "planner")
    pub name: String,
    /// Team this agent belongs to
    pub team_id: TeamId,
    /// Agent definition kind (opaque to the kernel)
    pub agent_type: String,
    /// Image the execution unit was started from
    pub image_id: crate::image::ImageId,
    /// Port the agent's turn server is bound to
    pub http_port: u16,
    /// Current lifecycle state
    pub state: AgentState,
    /// Free-form key/value metadata; backends may stash routing hints here
    /// (e.g., the pod IP under `host`)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Agent {
    /// True if every supplied key/value pair is present and equal in this
    /// agent's metadata map.
    pub fn metadata_matches(&self, filter: &HashMap<String, String>) -> bool {
        filter.iter().all(|(k, v)| self.metadata.get(k) == Some(v))
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
