// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kernel facade specs: spawn, turn, history, teardown.

use crate::prelude::*;

#[tokio::test]
async fn echoed_turn_reassembles_and_lands_in_history() {
    let kernel = AgentKernel::local(43000, 43010);
    let spawned = kernel.spawn(SpawnRequest::new("echo", "worker", ImageId::new())).await.unwrap();
    assert_eq!(spawned.agent.state, AgentState::Running);

    let rx = kernel
        .turn(turn_request(&spawned.agent.id, &spawned.nonce, "hello world"))
        .await
        .unwrap();
    let (reply, done_chunks) = drain_turn(rx).await;

    assert_eq!(reply, "hello world");
    assert_eq!(done_chunks, 1);

    let history = kernel.get_history(&spawned.agent.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].content, "hello world");
    assert_eq!(history[1].role, Role::Assistant);
    assert_eq!(history[1].content, "hello world");

    kernel.cleanup().await;
}

#[tokio::test]
async fn turn_for_unregistered_agent_fails_before_network_io() {
    let kernel = AgentKernel::local(43010, 43020);
    let never_spawned = AgentId::new();

    let err = kernel.turn(turn_request(&never_spawned, "nonce", "hi")).await.err();
    assert!(err.is_some(), "expected not-found before any network call");

    kernel.cleanup().await;
}

#[tokio::test]
async fn wrong_nonce_is_rejected_without_touching_history() {
    let kernel = AgentKernel::local(43020, 43030);
    let spawned = kernel.spawn(SpawnRequest::new("guarded", "worker", ImageId::new())).await.unwrap();

    let mut rx = kernel
        .turn(turn_request(&spawned.agent.id, "forged-nonce", "intrusion"))
        .await
        .unwrap();

    let mut saw_error = false;
    while let Some(chunk) = rx.recv().await {
        if chunk.error.is_some() {
            saw_error = true;
        }
    }
    assert!(saw_error);

    let history = kernel.get_history(&spawned.agent.id).await.unwrap();
    assert!(history.is_empty());

    kernel.cleanup().await;
}

#[tokio::test]
async fn metadata_and_team_filters_intersect() {
    let kernel = AgentKernel::local(43030, 43040);

    let mut worker_meta = std::collections::HashMap::new();
    worker_meta.insert("role".to_string(), "worker".to_string());

    let team = hive_core::TeamId::new();
    kernel
        .spawn(
            SpawnRequest::new("w1", "worker", ImageId::new())
                .with_team(team.clone())
                .with_metadata(worker_meta.clone()),
        )
        .await
        .unwrap();
    kernel
        .spawn(SpawnRequest::new("w2", "worker", ImageId::new()).with_metadata(worker_meta.clone()))
        .await
        .unwrap();
    kernel.spawn(SpawnRequest::new("other", "scout", ImageId::new())).await.unwrap();

    let by_meta =
        kernel.list(&ListFilter { metadata: Some(worker_meta.clone()), ..Default::default() });
    assert_eq!(by_meta.len(), 2);

    let by_both = kernel.list(&ListFilter {
        team_id: Some(team),
        metadata: Some(worker_meta),
        ..Default::default()
    });
    assert_eq!(by_both.len(), 1);
    assert_eq!(by_both[0].name, "w1");

    kernel.cleanup().await;
}

#[tokio::test]
async fn consecutive_turns_accumulate_history() {
    let kernel = AgentKernel::local(43040, 43050);
    let spawned = kernel.spawn(SpawnRequest::new("echo", "worker", ImageId::new())).await.unwrap();

    for text in ["first", "second"] {
        let rx = kernel.turn(turn_request(&spawned.agent.id, &spawned.nonce, text)).await.unwrap();
        let (reply, _) = drain_turn(rx).await;
        assert_eq!(reply, text);
    }

    let history = kernel.get_history(&spawned.agent.id).await.unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[2].content, "second");

    kernel.cleanup().await;
}
