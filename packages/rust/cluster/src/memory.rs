//! In-process [`ClusterGateway`] for dry runs and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use kubeintent_shared::{
    ClusterContext, ClusterGateway, KubeIntentError, PodSummary, Result, WorkloadRef,
    WorkloadSpec,
};

/// Node name reported by [`MemoryGateway::context`].
const MEMORY_NODE: &str = "in-memory";

/// Pods listed per workload by [`MemoryGateway::context`]; the count covers all replicas.
const LISTED_PODS_PER_WORKLOAD: i32 = 16;

/// A gateway call, as recorded by [`MemoryGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    CreateOrReplace(WorkloadSpec),
    Delete { name: String, namespace: String },
}

#[derive(Debug, Default)]
struct MemoryState {
    workloads: BTreeMap<WorkloadRef, WorkloadSpec>,
    /// Call log, kept only for gateways built with [`MemoryGateway::recording`].
    calls: Option<Vec<GatewayCall>>,
    failure: Option<String>,
}

impl MemoryState {
    fn record(&mut self, call: impl FnOnce() -> GatewayCall) {
        if let Some(calls) = &mut self.calls {
            calls.push(call());
        }
    }
}

/// Keeps workloads in a map.
///
/// [`recording`](Self::recording) additionally logs every call. Create
/// replaces any workload with the same name + namespace. Deleting an absent
/// workload reports [`KubeIntentError::NotFound`], like a real API server
/// would.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway that also logs every call, for [`calls`](Self::calls).
    pub fn recording() -> Self {
        let gateway = Self::new();
        gateway.state.lock().calls = Some(Vec::new());
        gateway
    }

    /// Make every subsequent mutation fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        self.state.lock().failure = Some(message.into());
    }

    /// Current workload stored under `name` in `namespace`.
    pub fn get(&self, name: &str, namespace: &str) -> Option<WorkloadSpec> {
        let key = WorkloadRef {
            name: name.to_string(),
            namespace: namespace.to_string(),
        };
        self.state.lock().workloads.get(&key).cloned()
    }

    /// Every call received so far, in order. Empty unless recording.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().calls.clone().unwrap_or_default()
    }

    /// Number of workloads currently stored.
    pub fn len(&self) -> usize {
        self.state.lock().workloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ClusterGateway for MemoryGateway {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create_or_replace(&self, spec: &WorkloadSpec) -> Result<()> {
        let mut state = self.state.lock();
        state.record(|| GatewayCall::CreateOrReplace(spec.clone()));
        if let Some(message) = &state.failure {
            return Err(KubeIntentError::gateway(message.clone()));
        }

        let replaced = state.workloads.insert(spec.target(), spec.clone()).is_some();
        debug!(workload = %spec.target(), replaced, "stored workload");
        Ok(())
    }

    async fn delete(&self, name: &str, namespace: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.record(|| GatewayCall::Delete {
            name: name.to_string(),
            namespace: namespace.to_string(),
        });
        if let Some(message) = &state.failure {
            return Err(KubeIntentError::gateway(message.clone()));
        }

        let key = WorkloadRef {
            name: name.to_string(),
            namespace: namespace.to_string(),
        };
        match state.workloads.remove(&key) {
            Some(_) => Ok(()),
            None => Err(KubeIntentError::NotFound {
                name: key.name,
                namespace: key.namespace,
            }),
        }
    }

    async fn context(&self) -> Result<ClusterContext> {
        let state = self.state.lock();
        let pods: Vec<PodSummary> = state
            .workloads
            .values()
            .flat_map(|spec| {
                (0..spec.replicas.min(LISTED_PODS_PER_WORKLOAD)).map(move |i| PodSummary {
                    name: format!("{}-{i}", spec.name),
                    namespace: spec.namespace.clone(),
                    status: "Running".into(),
                })
            })
            .collect();
        let pod_count = state
            .workloads
            .values()
            .map(|spec| usize::try_from(spec.replicas).unwrap_or(0))
            .sum();

        Ok(ClusterContext {
            node_count: 1,
            nodes: vec![MEMORY_NODE.to_string()],
            pod_count,
            pods,
        })
    }
}
