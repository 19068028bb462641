// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turn protocol specs at the server/client seam.

use crate::prelude::*;
use async_trait::async_trait;
use hive_kernel::{AgentClient, AgentServer, Resolver, TurnHandler};
use std::sync::Arc;

struct FixedResolver(String);

impl Resolver for FixedResolver {
    fn resolve(&self, _agent_id: &AgentId) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Emits a fixed token sequence, then fails if asked to.
struct ScriptedHandler {
    tokens: Vec<&'static str>,
    fail_with: Option<&'static str>,
}

#[async_trait]
impl TurnHandler for ScriptedHandler {
    async fn handle(
        &self,
        _messages: &[Message],
        tokens: mpsc::Sender<String>,
    ) -> Result<(), hive_kernel::handler::HandlerError> {
        for token in &self.tokens {
            if tokens.send((*token).to_string()).await.is_err() {
                break;
            }
        }
        match self.fail_with {
            Some(msg) => Err(hive_kernel::handler::HandlerError(msg.to_string())),
            None => Ok(()),
        }
    }
}

#[tokio::test]
async fn chunks_arrive_in_emission_order() {
    let agent_id = AgentId::new();
    let server = AgentServer::new(
        agent_id.clone(),
        "nonce",
        Arc::new(ScriptedHandler { tokens: vec!["a ", "b ", "c"], fail_with: None }),
    );
    let handle = server.start("127.0.0.1", 0).await.unwrap();

    let client = AgentClient::new(Arc::new(FixedResolver(handle.local_addr.to_string())));
    let mut rx = client.turn(turn_request(&agent_id, "nonce", "go")).await.unwrap();

    let mut bodies = Vec::new();
    while let Some(chunk) = rx.recv().await {
        if !chunk.done {
            bodies.push(chunk.body);
        }
    }
    assert_eq!(bodies, vec!["a ", "b ", "c"]);

    handle.cleanup().await;
}

#[tokio::test]
async fn handler_failure_surfaces_as_error_chunk_but_history_still_appends() {
    let agent_id = AgentId::new();
    let server = AgentServer::new(
        agent_id.clone(),
        "nonce",
        Arc::new(ScriptedHandler { tokens: vec!["partial"], fail_with: Some("model unavailable") }),
    );
    let handle = server.start("127.0.0.1", 0).await.unwrap();

    let client = AgentClient::new(Arc::new(FixedResolver(handle.local_addr.to_string())));
    let mut rx = client.turn(turn_request(&agent_id, "nonce", "go")).await.unwrap();

    let mut error = None;
    while let Some(chunk) = rx.recv().await {
        if let Some(e) = chunk.error {
            error = Some(e);
        }
    }
    assert_eq!(error.as_deref(), Some("model unavailable"));

    // The partial reply is still recorded server-side
    let history = client.get_history(&agent_id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content, "partial");

    handle.cleanup().await;
}

#[tokio::test]
async fn abandoned_stream_still_completes_the_turn() {
    let agent_id = AgentId::new();
    let server = AgentServer::new(
        agent_id.clone(),
        "nonce",
        Arc::new(ScriptedHandler { tokens: vec!["one ", "two ", "three"], fail_with: None }),
    );
    let handle = server.start("127.0.0.1", 0).await.unwrap();

    let client = AgentClient::new(Arc::new(FixedResolver(handle.local_addr.to_string())));
    let mut rx = client.turn(turn_request(&agent_id, "nonce", "go")).await.unwrap();

    // Take one chunk, then walk away
    let first = rx.recv().await.unwrap();
    assert!(!first.done);
    drop(rx);

    // The handler runs to completion and history is appended regardless
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        let history = client.get_history(&agent_id).await.unwrap();
        if history.len() == 2 {
            assert_eq!(history[1].content, "one two three");
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "history never completed");
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    handle.cleanup().await;
}
