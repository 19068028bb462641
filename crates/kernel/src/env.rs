// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the kernel crate.

use std::time::Duration;

/// Kubernetes namespace for agent pods.
pub fn k8s_namespace() -> String {
    std::env::var("HIVE_K8S_NAMESPACE").unwrap_or_else(|_| "default".to_string())
}

/// Path to the agent server binary used by the sandbox backend.
pub fn sandbox_agent_bin() -> String {
    std::env::var("HIVE_AGENT_BIN").unwrap_or_else(|_| "hive-agent".to_string())
}

/// Poll interval for readiness checks (pod IP assignment, server bind).
pub fn ready_poll_interval() -> Duration {
    std::env::var("HIVE_READY_POLL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(500))
}

/// Maximum readiness poll attempts before a spawn is declared failed.
pub fn ready_poll_attempts() -> usize {
    std::env::var("HIVE_READY_ATTEMPTS").ok().and_then(|s| s.parse().ok()).unwrap_or(120)
}
