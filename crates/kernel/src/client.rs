// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turn client: resolves an agent id to its server and drives streamed
//! responses.
//!
//! Responses are forwarded through a channel fed by a producer task, so the
//! caller consumes a plain receiver and can abandon it at any point; the
//! explicit `done = true` sentinel marks completion independent of
//! connection close.

use crate::resolver::Resolver;
use hive_core::{AgentId, Message};
use hive_wire::{read_frame, write_frame, ProtocolError, Request, Response, TurnChunk, TurnRequest};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::debug;

/// Errors from turn client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The agent id could not be resolved. Raised before any network I/O.
    #[error("agent not found: {0}")]
    NotFound(AgentId),

    #[error("connect failed: {0}")]
    Connect(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The server refused the request (bad nonce, unknown agent).
    #[error("{0}")]
    Rejected(String),
}

/// Client for the streaming turn protocol.
pub struct AgentClient {
    resolver: Arc<dyn Resolver>,
}

impl AgentClient {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self { resolver }
    }

    fn resolve(&self, agent_id: &AgentId) -> Result<String, ClientError> {
        self.resolver
            .resolve(agent_id)
            .ok_or_else(|| ClientError::NotFound(agent_id.clone()))
    }

    /// Open a turn stream against an agent.
    ///
    /// Chunks arrive on the returned receiver as the server emits them; the
    /// stream ends after the terminal `done = true` chunk. A server-side
    /// rejection surfaces as a terminal error chunk. Dropping the receiver
    /// abandons the stream without signaling the server.
    pub async fn turn(&self, request: TurnRequest) -> Result<mpsc::Receiver<TurnChunk>, ClientError> {
        // Resolution failure must surface before any network call
        let addr = self.resolve(&request.agent_id)?;
        let agent_id = request.agent_id.clone();

        let mut stream = TcpStream::connect(&addr).await?;
        write_frame(&mut stream, &Request::Turn(request)).await?;

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            loop {
                match read_frame::<_, Response>(&mut stream).await {
                    Ok(Response::Chunk(chunk)) => {
                        let done = chunk.done;
                        if tx.send(chunk).await.is_err() {
                            debug!(%agent_id, "turn receiver dropped, abandoning stream");
                            break;
                        }
                        if done {
                            break;
                        }
                    }
                    Ok(Response::Error { message }) => {
                        let _ = tx
                            .send(TurnChunk { body: String::new(), error: Some(message), done: true })
                            .await;
                        break;
                    }
                    Ok(Response::History { .. }) => {
                        debug!(%agent_id, "unexpected history frame mid-turn");
                        break;
                    }
                    Err(ProtocolError::ConnectionClosed) => break,
                    Err(e) => {
                        let _ = tx.send(TurnChunk::error(e.to_string())).await;
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }

    /// Fetch the full server-side history for an agent. Same resolution
    /// discipline as `turn`: unknown ids fail before any network I/O.
    pub async fn get_history(&self, agent_id: &AgentId) -> Result<Vec<Message>, ClientError> {
        let addr = self.resolve(agent_id)?;

        let mut stream = TcpStream::connect(&addr).await?;
        write_frame(&mut stream, &Request::GetHistory { agent_id: agent_id.clone() }).await?;

        match read_frame::<_, Response>(&mut stream).await? {
            Response::History { messages } => Ok(messages),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            Response::Chunk(_) => {
                Err(ClientError::Rejected("unexpected chunk for history request".to_string()))
            }
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
