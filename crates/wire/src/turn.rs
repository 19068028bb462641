// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turn protocol message types.
//!
//! One connection carries exactly one [`Request`] followed by a sequence of
//! [`Response`] frames. A turn stream is terminated by exactly one chunk with
//! `done = true`; "no more output" is signaled by the sentinel, not by
//! connection close.

use hive_core::{AgentId, Message};
use serde::{Deserialize, Serialize};

/// A turn call addressed to one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRequest {
    pub agent_id: AgentId,
    /// Capability token returned by `spawn`. Required on every turn.
    pub nonce: String,
    /// Conversational messages to append for this turn.
    pub messages: Vec<Message>,
}

/// One incremental piece of a streamed turn response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnChunk {
    /// Incremental response text. May be empty on error or terminal chunks.
    #[serde(default)]
    pub body: String,
    /// Mid-stream error, if any. An error chunk may appear without a body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// True on the terminal chunk of a turn.
    #[serde(default)]
    pub done: bool,
}

impl TurnChunk {
    pub fn body(text: impl Into<String>) -> Self {
        Self { body: text.into(), error: None, done: false }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { body: String::new(), error: Some(message.into()), done: false }
    }

    pub fn done() -> Self {
        Self { body: String::new(), error: None, done: true }
    }
}

/// Requests accepted by an agent server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Turn(TurnRequest),
    GetHistory { agent_id: AgentId },
}

/// Responses emitted by an agent server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// One streamed piece of a turn reply.
    Chunk(TurnChunk),
    /// Full ordered history for a `GetHistory` request.
    History { messages: Vec<Message> },
    /// Request-level failure (unknown agent, bad nonce, malformed frame).
    Error { message: String },
}

#[cfg(test)]
#[path = "turn_tests.rs"]
mod tests;
