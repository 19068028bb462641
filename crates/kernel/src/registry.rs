// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authoritative table of live agent handles.
//!
//! A single process-local store: one mutex-guarded map, mutated only through
//! these methods. Agent records are never handed out by reference, so no
//! external code can mutate a record in place.

use hive_core::{Agent, AgentId, AgentState, TeamId};
use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("agent not found: {0}")]
    NotFound(AgentId),

    #[error("agent already registered: {0}")]
    AlreadyRegistered(AgentId),
}

/// Conjunctive filters for [`AgentRegistry::list`]. Omitted filters match
/// everything.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub team_id: Option<TeamId>,
    pub state: Option<AgentState>,
    pub metadata: Option<HashMap<String, String>>,
}

impl ListFilter {
    fn matches(&self, agent: &Agent) -> bool {
        if let Some(ref team_id) = self.team_id {
            if &agent.team_id != team_id {
                return false;
            }
        }
        if let Some(state) = self.state {
            if agent.state != state {
                return false;
            }
        }
        if let Some(ref metadata) = self.metadata {
            if !agent.metadata_matches(metadata) {
                return false;
            }
        }
        true
    }
}

/// In-memory agent table guarded by a mutex.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: Mutex<HashMap<AgentId, Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new agent record. Fails if the id is already registered;
    /// conflicts are never auto-resolved.
    pub fn register(&self, agent: Agent) -> Result<(), RegistryError> {
        let mut agents = self.agents.lock();
        if agents.contains_key(&agent.id) {
            return Err(RegistryError::AlreadyRegistered(agent.id));
        }
        agents.insert(agent.id.clone(), agent);
        Ok(())
    }

    /// Look up an agent by id. Absence is a valid outcome.
    pub fn get(&self, id: &AgentId) -> Option<Agent> {
        self.agents.lock().get(id).cloned()
    }

    /// Remove an agent record. Fails if the id is unknown.
    pub fn delete(&self, id: &AgentId) -> Result<(), RegistryError> {
        self.agents
            .lock()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    /// Replace an agent's state in place. Fails if the id is unknown. No
    /// transition validation is applied beyond existence.
    pub fn update_state(&self, id: &AgentId, state: AgentState) -> Result<(), RegistryError> {
        let mut agents = self.agents.lock();
        let agent = agents.get_mut(id).ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        agent.state = state;
        Ok(())
    }

    /// List agents matching all supplied filters (AND semantics).
    pub fn list(&self, filter: &ListFilter) -> Vec<Agent> {
        self.agents.lock().values().filter(|a| filter.matches(a)).cloned().collect()
    }

    /// Snapshot of every registered agent id.
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.lock().keys().cloned().collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
