// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent server process image.
//!
//! This is what the sandbox and cluster backends execute: identity, nonce,
//! and bind address arrive through the environment, and the process serves
//! turns until it receives ctrl-c / SIGTERM. Ships the echo handler; real
//! conversational handlers are injected by embedding callers.

use hive_core::AgentId;
use hive_kernel::{handler, AgentServer};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn required_env(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("{} must be set", key))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let agent_id = AgentId::from_string(required_env("HIVE_AGENT_ID")?);
    let nonce = required_env("HIVE_AGENT_NONCE")?;
    let port: u16 = required_env("HIVE_AGENT_PORT")?
        .parse()
        .map_err(|e| format!("invalid HIVE_AGENT_PORT: {}", e))?;
    let host = std::env::var("HIVE_AGENT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let handler_name =
        std::env::var("HIVE_AGENT_HANDLER").unwrap_or_else(|_| "echo".to_string());
    let handler = handler::builtin(&handler_name)
        .ok_or_else(|| format!("unknown handler: {}", handler_name))?;

    let server = AgentServer::new(agent_id.clone(), nonce, handler);
    let handle = server.start(&host, port).await?;

    info!(%agent_id, addr = %handle.local_addr, "agent process serving");

    tokio::signal::ctrl_c().await?;
    info!(%agent_id, "shutdown signal received");
    handle.cleanup().await;

    Ok(())
}
