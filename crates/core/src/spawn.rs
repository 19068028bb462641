// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawn request/result types consumed by spawner backends.

use crate::agent::{Agent, TeamId};
use crate::image::ImageId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Backend-specific spawn payload.
///
/// Modeled as a tagged union rather than an untyped map so each backend can
/// validate the shape it expects at spawn time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnInfo {
    /// Conversational agent payload: system prompt, tool names, and
    /// credential environment to inject into the execution unit.
    Conversational {
        system_prompt: String,
        #[serde(default)]
        tools: Vec<String>,
        #[serde(default)]
        env: Vec<(String, String)>,
    },
    /// No payload; the execution unit runs with its image defaults.
    None,
}

impl Default for SpawnInfo {
    fn default() -> Self {
        SpawnInfo::None
    }
}

/// Request to spawn one agent. Transient — consumed once by a spawner and
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub name: String,
    pub agent_type: String,
    pub team_id: TeamId,
    pub image_id: ImageId,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub spawn_info: SpawnInfo,
}

impl SpawnRequest {
    pub fn new(name: impl Into<String>, agent_type: impl Into<String>, image_id: ImageId) -> Self {
        Self {
            name: name.into(),
            agent_type: agent_type.into(),
            team_id: TeamId::new(),
            image_id,
            metadata: HashMap::new(),
            spawn_info: SpawnInfo::None,
        }
    }

    pub fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = team_id;
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_spawn_info(mut self, spawn_info: SpawnInfo) -> Self {
        self.spawn_info = spawn_info;
        self
    }
}

/// Successful spawn outcome.
///
/// The nonce is the sole capability permitting turn calls against this
/// agent. It is returned exactly once to the spawning caller and never
/// stored in the registry.
#[derive(Debug, Clone)]
pub struct SpawnResult {
    pub agent: Agent,
    pub nonce: String,
}
