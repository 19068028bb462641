// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hive_core::ImageId;

#[tokio::test]
async fn missing_binary_fails_without_partial_state() {
    let registry = Arc::new(AgentRegistry::new());
    let ports = Arc::new(PortAllocator::new(42300, 42310));
    let spawner = SandboxSpawner::new(Arc::clone(&registry), Arc::clone(&ports))
        .with_agent_bin("/nonexistent/hive-agent");

    let result = spawner.spawn(SpawnRequest::new("a", "worker", ImageId::new())).await;

    assert!(matches!(result, Err(SpawnerError::SpawnFailed(_))));
    assert_eq!(ports.leased(), 0);
    assert!(registry.ids().is_empty());
}

#[tokio::test]
async fn stop_unknown_agent_is_not_found() {
    let registry = Arc::new(AgentRegistry::new());
    let ports = Arc::new(PortAllocator::new(42310, 42320));
    let spawner = SandboxSpawner::new(registry, ports);

    let missing = AgentId::new();
    match spawner.stop(&missing).await {
        Err(SpawnerError::NotFound(id)) => assert_eq!(id, missing),
        other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn conversational_env_is_forwarded_to_the_process() {
    use hive_core::SpawnInfo;

    let registry = Arc::new(AgentRegistry::new());
    let ports = Arc::new(PortAllocator::new(42320, 42330));
    let spawner = SandboxSpawner::new(registry, ports).with_agent_bin("hive-agent");

    let request = SpawnRequest::new("a", "worker", ImageId::new()).with_spawn_info(
        SpawnInfo::Conversational {
            system_prompt: "be brief".to_string(),
            tools: vec![],
            env: vec![("API_KEY".to_string(), "k".to_string())],
        },
    );

    // Building the command must not fail for a conversational payload; the
    // spawn itself is covered by the workspace end-to-end suite. Either the
    // binary is on PATH (child started, kill it) or it is not; both are fine
    // here, we only assert the payload did not poison command setup.
    let agent_id = AgentId::new();
    match spawner.start_process(&request, &agent_id, "nonce", 42321) {
        Ok(child) => SandboxSpawner::kill_and_reap(&agent_id, child),
        Err(SpawnerError::SpawnFailed(msg)) => assert!(msg.contains("hive-agent")),
        Err(other) => panic!("unexpected error: {}", other),
    }
}
