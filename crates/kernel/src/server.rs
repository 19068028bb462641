// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-agent streaming turn server.
//!
//! One server hosts one agent's turn loop: it accepts connections, reads a
//! single request frame per connection, and streams response frames back.
//! Connection handling runs in spawned tasks so a slow client never blocks
//! the accept loop.
//!
//! An abandoned client stream does not interrupt the handler: no
//! cancellation signal is defined in the turn protocol, so the handler runs
//! to completion and history is appended regardless. Failed chunk writes are
//! dropped.

use crate::handler::TurnHandler;
use hive_core::{AgentId, Message};
use hive_wire::{read_frame, write_frame, Request, Response, TurnChunk, TurnRequest};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Errors from starting the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("bind failed: {0}")]
    Bind(#[from] std::io::Error),
}

/// Shared per-agent serving context.
struct ServeCtx {
    agent_id: AgentId,
    nonce: String,
    handler: Arc<dyn TurnHandler>,
    history: Mutex<Vec<Message>>,
}

/// Hosts one agent's turn loop.
pub struct AgentServer {
    ctx: Arc<ServeCtx>,
}

/// Handle to a running agent server. `cleanup` stops serving and releases
/// the bound socket.
pub struct ServerHandle {
    pub local_addr: SocketAddr,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Stop accepting connections and wait for the accept loop to exit.
    /// In-flight turn handlers run to completion in their own tasks.
    pub async fn cleanup(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                warn!(error = %e, "agent server task panicked during cleanup");
            }
        }
    }
}

impl AgentServer {
    /// Create a server for `agent_id`, authorizing only turns that present
    /// `nonce`.
    pub fn new(agent_id: AgentId, nonce: impl Into<String>, handler: Arc<dyn TurnHandler>) -> Self {
        Self {
            ctx: Arc::new(ServeCtx {
                agent_id,
                nonce: nonce.into(),
                handler,
                history: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Bind and begin serving. Port 0 asks the OS for an ephemeral port; the
    /// bound address is reported on the returned handle.
    pub async fn start(&self, host: &str, port: u16) -> Result<ServerHandle, ServerError> {
        let listener = TcpListener::bind((host, port)).await?;
        let local_addr = listener.local_addr()?;
        info!(agent_id = %self.ctx.agent_id, %local_addr, "agent server listening");

        let cancel = CancellationToken::new();
        let accept_cancel = cancel.clone();
        let ctx = Arc::clone(&self.ctx);
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = accept_cancel.cancelled() => {
                        debug!(agent_id = %ctx.agent_id, "agent server shutting down");
                        break;
                    }
                    result = listener.accept() => {
                        match result {
                            Ok((stream, peer)) => {
                                debug!(agent_id = %ctx.agent_id, %peer, "turn connection accepted");
                                let ctx = Arc::clone(&ctx);
                                tokio::spawn(async move {
                                    let (reader, writer) = stream.into_split();
                                    handle_connection(reader, writer, &ctx).await;
                                });
                            }
                            Err(e) => error!(agent_id = %ctx.agent_id, error = %e, "accept error"),
                        }
                    }
                }
            }
        });

        Ok(ServerHandle { local_addr, cancel, task })
    }

    /// Ordered role/content history maintained server-side.
    pub fn history(&self) -> Vec<Message> {
        self.ctx.history.lock().clone()
    }
}

/// Read one request frame and dispatch it.
async fn handle_connection<R, W>(mut reader: R, mut writer: W, ctx: &ServeCtx)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let request: Request = match read_frame(&mut reader).await {
        Ok(r) => r,
        Err(e) => {
            debug!(agent_id = %ctx.agent_id, error = %e, "bad request frame");
            let response = Response::Error { message: format!("bad request: {}", e) };
            let _ = write_frame(&mut writer, &response).await;
            return;
        }
    };

    match request {
        Request::GetHistory { agent_id } => {
            let response = if agent_id == ctx.agent_id {
                Response::History { messages: ctx.history.lock().clone() }
            } else {
                Response::Error { message: format!("agent not found: {}", agent_id) }
            };
            let _ = write_frame(&mut writer, &response).await;
        }
        Request::Turn(turn) => handle_turn(&mut writer, ctx, turn).await,
    }
}

/// Run one turn: append the user messages, stream handler tokens as chunks,
/// append the assembled reply, emit the terminal chunk.
async fn handle_turn<W>(writer: &mut W, ctx: &ServeCtx, turn: TurnRequest)
where
    W: AsyncWrite + Unpin,
{
    if turn.agent_id != ctx.agent_id {
        let response = Response::Error { message: format!("agent not found: {}", turn.agent_id) };
        let _ = write_frame(writer, &response).await;
        return;
    }
    if turn.nonce != ctx.nonce {
        warn!(agent_id = %ctx.agent_id, "turn rejected: invalid nonce");
        let response = Response::Error { message: "invalid nonce".to_string() };
        let _ = write_frame(writer, &response).await;
        return;
    }

    let snapshot = {
        let mut history = ctx.history.lock();
        history.extend(turn.messages.iter().cloned());
        history.clone()
    };

    let (token_tx, mut token_rx) = mpsc::channel::<String>(64);
    let handler = Arc::clone(&ctx.handler);
    let handler_task =
        tokio::spawn(async move { handler.handle(&snapshot, token_tx).await });

    // Drain every token even if the client went away, so the assembled
    // reply still lands in history.
    let mut reply = String::new();
    let mut client_alive = true;
    while let Some(token) = token_rx.recv().await {
        reply.push_str(&token);
        if client_alive {
            let chunk = Response::Chunk(TurnChunk::body(token));
            if write_frame(writer, &chunk).await.is_err() {
                debug!(agent_id = %ctx.agent_id, "client abandoned turn stream");
                client_alive = false;
            }
        }
    }

    match handler_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            warn!(agent_id = %ctx.agent_id, error = %e, "turn handler failed");
            if client_alive {
                let chunk = Response::Chunk(TurnChunk::error(e.to_string()));
                if write_frame(writer, &chunk).await.is_err() {
                    client_alive = false;
                }
            }
        }
        Err(e) => {
            error!(agent_id = %ctx.agent_id, error = %e, "turn handler panicked");
            if client_alive {
                let chunk = Response::Chunk(TurnChunk::error("handler aborted".to_string()));
                if write_frame(writer, &chunk).await.is_err() {
                    client_alive = false;
                }
            }
        }
    }

    ctx.history.lock().push(Message::assistant(reply));

    if client_alive {
        let _ = write_frame(writer, &Response::Chunk(TurnChunk::done())).await;
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
