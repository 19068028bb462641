// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster backend — agents run in Kubernetes pods.
//!
//! Each agent is a pod running the `hive-agent` image resolved from the
//! image store. The pod IP is recorded under the `host` metadata key at
//! registration time so the resolver routes turns off loopback.

use super::{generate_nonce, pending_agent, poll_until_ready, Spawner, SpawnerError};
use crate::env;
use crate::ports::PortAllocator;
use crate::registry::AgentRegistry;
use crate::resolver::HOST_METADATA_KEY;
use async_trait::async_trait;
use hive_core::{AgentId, AgentState, SpawnInfo, SpawnRequest, SpawnResult};
use hive_store::ImageStore;
use k8s_openapi::api::core::v1::{Container, ContainerPort, EnvVar, Pod, PodSpec, Probe, TCPSocketAction};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::Client;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pod label applied to every agent pod; stale-resource sweeps select on it.
const AGENT_POD_LABEL: &str = "app=hive-agent";

/// Cluster-specific state tracked per agent.
#[derive(Clone)]
struct PodMeta {
    pod_name: String,
    namespace: String,
}

/// Spawner that runs each agent inside a Kubernetes pod.
pub struct ClusterSpawner {
    client: Client,
    registry: Arc<AgentRegistry>,
    ports: Arc<PortAllocator>,
    images: Arc<ImageStore>,
    meta: Mutex<HashMap<AgentId, PodMeta>>,
}

impl ClusterSpawner {
    /// Create a cluster spawner against the ambient kubeconfig. The
    /// namespace comes from `HIVE_K8S_NAMESPACE` (default `default`).
    pub async fn new(
        registry: Arc<AgentRegistry>,
        ports: Arc<PortAllocator>,
        images: Arc<ImageStore>,
    ) -> Result<Self, SpawnerError> {
        let client = Client::try_default().await.map_err(|e| {
            SpawnerError::SpawnFailed(format!("failed to create kube client: {}", e))
        })?;
        Ok(Self { client, registry, ports, images, meta: Mutex::new(HashMap::new()) })
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Delete pods labeled as agent pods whose agent id is not in
    /// `known_agents`. Called after crashes or failed spawn cleanup to
    /// reclaim orphaned cluster resources.
    pub async fn cleanup_stale_pods(&self, known_agents: &HashSet<AgentId>) {
        let namespace = env::k8s_namespace();
        let pods = self.pods(&namespace);
        let lp = ListParams::default().labels(AGENT_POD_LABEL);
        let pod_list = match pods.list(&lp).await {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "failed to list pods for stale resource cleanup");
                return;
            }
        };

        for pod in pod_list {
            let Some(pod_name) = pod.metadata.name else { continue };
            // Pod names are "hive-<agent_id>"
            let Some(agent_id_str) = pod_name.strip_prefix("hive-") else { continue };
            let agent_id = AgentId::from_string(agent_id_str);
            if !known_agents.contains(&agent_id) {
                info!(%pod_name, "deleting orphaned pod");
                if let Err(e) = pods.delete(&pod_name, &DeleteParams::default()).await {
                    warn!(%pod_name, error = %e, "failed to delete orphaned pod");
                }
            }
        }
    }

    async fn create_pod(
        &self,
        request: &SpawnRequest,
        agent_id: &AgentId,
        nonce: &str,
        port: u16,
    ) -> Result<PodMeta, SpawnerError> {
        let image = self.images.get(&request.image_id).ok_or_else(|| {
            SpawnerError::SpawnFailed(format!("image not found: {}", request.image_id))
        })?;

        let namespace = env::k8s_namespace();
        let pod_name = format!("hive-{}", agent_id);
        let pod = build_pod(&PodParams {
            pod_name: pod_name.clone(),
            namespace: namespace.clone(),
            image: image.path,
            agent_id: agent_id.clone(),
            nonce: nonce.to_string(),
            container_port: i32::from(port),
            env: match request.spawn_info {
                SpawnInfo::Conversational { ref env, .. } => env.clone(),
                SpawnInfo::None => Vec::new(),
            },
        });

        info!(%agent_id, %pod_name, %namespace, "creating agent pod");
        self.pods(&namespace)
            .create(&PostParams::default(), &pod)
            .await
            .map_err(|e| SpawnerError::SpawnFailed(format!("pod creation failed: {}", e)))?;

        Ok(PodMeta { pod_name, namespace })
    }

    async fn delete_pod(&self, agent_id: &AgentId, meta: &PodMeta) {
        let pods = self.pods(&meta.namespace);
        if let Err(e) = pods.delete(&meta.pod_name, &DeleteParams::default()).await {
            warn!(%agent_id, pod = %meta.pod_name, error = %e, "failed to delete pod");
        }
    }
}

#[async_trait]
impl Spawner for ClusterSpawner {
    async fn spawn(&self, request: SpawnRequest) -> Result<SpawnResult, SpawnerError> {
        let port = self.ports.allocate()?;
        let agent_id = AgentId::new();
        let nonce = generate_nonce();

        let meta = match self.create_pod(&request, &agent_id, &nonce, port).await {
            Ok(meta) => meta,
            Err(e) => {
                self.ports.release(port);
                return Err(e);
            }
        };

        // After pod creation succeeds, any failure must clean up the pod.
        let result = async {
            let pod_ip = wait_for_pod_ip(&self.pods(&meta.namespace), &meta.pod_name).await?;
            let addr = format!("{}:{}", pod_ip, port);

            let mut agent = pending_agent(&request, agent_id.clone(), port);
            agent.metadata.insert(HOST_METADATA_KEY.to_string(), pod_ip);
            self.registry.register(agent.clone())?;

            let ready = poll_until_ready(
                &addr,
                "cluster",
                env::ready_poll_interval(),
                env::ready_poll_attempts(),
            )
            .await;
            if let Err(e) = ready {
                let _ = self.registry.delete(&agent_id);
                return Err(e);
            }

            self.registry.update_state(&agent_id, AgentState::Running)?;
            self.meta.lock().insert(agent_id.clone(), meta.clone());

            agent.state = AgentState::Running;
            Ok(SpawnResult { agent, nonce })
        }
        .await;

        if result.is_err() {
            self.delete_pod(&agent_id, &meta).await;
            self.ports.release(port);
        }
        result
    }

    async fn stop(&self, agent_id: &AgentId) -> Result<(), SpawnerError> {
        let meta = self
            .meta
            .lock()
            .remove(agent_id)
            .ok_or_else(|| SpawnerError::NotFound(agent_id.clone()))?;

        self.delete_pod(agent_id, &meta).await;

        let agent = self
            .registry
            .get(agent_id)
            .ok_or_else(|| SpawnerError::NotFound(agent_id.clone()))?;
        self.registry.update_state(agent_id, AgentState::Stopped)?;
        self.ports.release(agent.http_port);

        info!(%agent_id, pod = %meta.pod_name, "cluster agent stopped");
        Ok(())
    }
}

/// Parameters for building an agent pod.
struct PodParams {
    pod_name: String,
    namespace: String,
    image: String,
    agent_id: AgentId,
    nonce: String,
    container_port: i32,
    env: Vec<(String, String)>,
}

/// Build the pod spec for one agent.
fn build_pod(params: &PodParams) -> Pod {
    let mut env = vec![
        env_var("HIVE_AGENT_ID", params.agent_id.as_str()),
        env_var("HIVE_AGENT_NONCE", &params.nonce),
        env_var("HIVE_AGENT_PORT", &params.container_port.to_string()),
        env_var("HIVE_AGENT_HOST", "0.0.0.0"),
    ];
    for (k, v) in &params.env {
        env.push(env_var(k, v));
    }

    let probe = |period: i32| Probe {
        tcp_socket: Some(TCPSocketAction {
            port: IntOrString::Int(params.container_port),
            ..Default::default()
        }),
        period_seconds: Some(period),
        ..Default::default()
    };

    let container = Container {
        name: "agent".to_string(),
        image: Some(params.image.clone()),
        ports: Some(vec![ContainerPort {
            container_port: params.container_port,
            ..Default::default()
        }]),
        env: Some(env),
        readiness_probe: Some(probe(5)),
        liveness_probe: Some(probe(30)),
        ..Default::default()
    };

    Pod {
        metadata: ObjectMeta {
            name: Some(params.pod_name.clone()),
            namespace: Some(params.namespace.clone()),
            labels: Some(
                [
                    ("app".to_string(), "hive-agent".to_string()),
                    ("hive.dev/agent-id".to_string(), params.agent_id.to_string()),
                ]
                .into_iter()
                .collect(),
            ),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![container],
            restart_policy: Some("Never".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn env_var(name: &str, value: &str) -> EnvVar {
    EnvVar { name: name.to_string(), value: Some(value.to_string()), ..Default::default() }
}

/// Wait for a pod to receive a cluster IP.
async fn wait_for_pod_ip(pods: &Api<Pod>, name: &str) -> Result<String, SpawnerError> {
    let interval: Duration = env::ready_poll_interval();
    let max_attempts = env::ready_poll_attempts();

    for i in 0..max_attempts {
        if i > 0 {
            tokio::time::sleep(interval).await;
        }
        if let Ok(pod) = pods.get(name).await {
            if let Some(ip) = pod.status.as_ref().and_then(|s| s.pod_ip.as_ref()) {
                if !ip.is_empty() {
                    debug!(%name, %ip, attempt = i, "pod IP assigned");
                    return Ok(ip.clone());
                }
            }
        }
    }
    Err(SpawnerError::SpawnFailed(format!(
        "pod {} did not receive IP within {}s",
        name,
        (interval.as_millis() as u64 * max_attempts as u64) / 1000
    )))
}
