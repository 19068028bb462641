// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pluggable conversational handlers.
//!
//! The kernel never implements an LLM protocol; a handler is injected into
//! each agent server and invoked once per turn. Incremental output is pushed
//! through a token channel so the server can stream chunks while the handler
//! is still producing.

use async_trait::async_trait;
use hive_core::Message;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Look up a built-in handler by name.
///
/// `echo` is the only handler that ships; embedding callers inject their own
/// implementations directly rather than registering them here.
pub fn builtin(name: &str) -> Option<Arc<dyn TurnHandler>> {
    match name {
        "echo" => Some(Arc::new(EchoHandler)),
        _ => None,
    }
}

/// A handler failed mid-turn. Surfaced to the client as an error chunk.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

/// One agent's conversational loop.
#[async_trait]
pub trait TurnHandler: Send + Sync + 'static {
    /// Run one turn over the full message history.
    ///
    /// Push incremental output through `tokens` as it becomes available; the
    /// receiver assembles the assistant reply from the same tokens, so the
    /// concatenation of everything sent is the reply recorded in history.
    async fn handle(
        &self,
        messages: &[Message],
        tokens: mpsc::Sender<String>,
    ) -> Result<(), HandlerError>;
}

/// Echoes the last user message back token-by-token. Used by tests and as
/// the default handler of the `hive-agent` binary.
#[derive(Debug, Clone, Default)]
pub struct EchoHandler;

#[async_trait]
impl TurnHandler for EchoHandler {
    async fn handle(
        &self,
        messages: &[Message],
        tokens: mpsc::Sender<String>,
    ) -> Result<(), HandlerError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == hive_core::Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        // split_inclusive keeps separators, so the concatenation of all
        // tokens reproduces the input exactly
        for token in last_user.split_inclusive(' ') {
            if tokens.send(token.to_string()).await.is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
