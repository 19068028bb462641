// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for the integration specs.

pub use hive_core::{
    AgentId, AgentState, ImageId, Message, Role, SourceBundle, SpawnInfo, SpawnRequest,
};
pub use hive_kernel::{AgentKernel, ListFilter};
pub use hive_store::{BlobStore, ImageStore, PackagingService};
pub use hive_wire::{TurnChunk, TurnRequest};
pub use tokio::sync::mpsc;

/// Build a single-user-message turn request.
pub fn turn_request(agent_id: &AgentId, nonce: &str, text: &str) -> TurnRequest {
    TurnRequest {
        agent_id: agent_id.clone(),
        nonce: nonce.to_string(),
        messages: vec![Message::user(text)],
    }
}

/// Drain a turn stream into (assembled reply, saw exactly one done chunk).
pub async fn drain_turn(mut rx: mpsc::Receiver<TurnChunk>) -> (String, usize) {
    let mut reply = String::new();
    let mut done_chunks = 0;
    while let Some(chunk) = rx.recv().await {
        assert!(chunk.error.is_none(), "unexpected error chunk: {:?}", chunk.error);
        if chunk.done {
            done_chunks += 1;
        } else {
            reply.push_str(&chunk.body);
        }
    }
    (reply, done_chunks)
}
