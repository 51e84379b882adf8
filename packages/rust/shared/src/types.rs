//! Core domain types for kubeintent.

use serde::{Deserialize, Serialize};

use crate::error::KubeIntentError;

// ---------------------------------------------------------------------------
// Workloads
// ---------------------------------------------------------------------------

/// The fields describing a single deployable workload.
///
/// `name` doubles as the resource identifier and the `app` label value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSpec {
    /// Resource name, unique per namespace.
    pub name: String,
    /// Target namespace.
    pub namespace: String,
    /// Container image reference.
    pub image: String,
    /// Desired replica count.
    pub replicas: i32,
    /// Container port.
    pub port: i32,
}

impl WorkloadSpec {
    /// Name + namespace handle for this workload.
    pub fn target(&self) -> WorkloadRef {
        WorkloadRef {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

/// Identifies an existing workload (what `delete` needs).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkloadRef {
    pub name: String,
    pub namespace: String,
}

impl std::fmt::Display for WorkloadRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// The single workload kind this system manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Deployment,
}

impl ResourceKind {
    /// Wire name as carried in `resource_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deployment => "deployment",
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = KubeIntentError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "deployment" => Ok(Self::Deployment),
            other => Err(KubeIntentError::UnsupportedResourceKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// A recognized action together with the data it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Create-or-replace the described workload.
    Create(WorkloadSpec),
    /// Delete the workload identified by name + namespace.
    Delete(WorkloadRef),
}

impl Action {
    /// Wire name as carried in `action`.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Delete(_) => "delete",
        }
    }

    /// Name + namespace of the targeted workload.
    pub fn target(&self) -> WorkloadRef {
        match self {
            Self::Create(spec) => spec.target(),
            Self::Delete(target) => target.clone(),
        }
    }
}

/// A validated request describing one desired cluster mutation.
///
/// Built by the validator in `kubeintent-core`; an `Intent` that exists is
/// fully valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub kind: ResourceKind,
    pub action: Action,
}

// ---------------------------------------------------------------------------
// DispatchResult
// ---------------------------------------------------------------------------

/// Outcome status of a dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Success,
    Failure,
}

/// Classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CauseKind {
    StreamBroken,
    MalformedDocument,
    UnrecognizedAction,
    UnsupportedResourceKind,
    InvalidSpec,
    GatewayFailure,
}

impl CauseKind {
    /// True for the four ways an inbound document can fail validation.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::MalformedDocument
                | Self::UnrecognizedAction
                | Self::UnsupportedResourceKind
                | Self::InvalidSpec
        )
    }
}

/// Uniform response envelope, produced once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub status: DispatchStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause_kind: Option<CauseKind>,
}

impl DispatchResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: DispatchStatus::Success,
            message: message.into(),
            cause_kind: None,
        }
    }

    /// Build a failure envelope, passing the error message through.
    pub fn failure(err: &KubeIntentError) -> Self {
        Self {
            status: DispatchStatus::Failure,
            message: err.to_string(),
            cause_kind: err.cause_kind(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DispatchStatus::Success
    }
}

// ---------------------------------------------------------------------------
// ClusterContext
// ---------------------------------------------------------------------------

/// Basic cluster inventory: node names and a summary of every pod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterContext {
    pub node_count: usize,
    pub nodes: Vec<String>,
    pub pod_count: usize,
    pub pods: Vec<PodSummary>,
}

impl ClusterContext {
    /// Build a context, deriving the counts from the lists.
    pub fn new(nodes: Vec<String>, pods: Vec<PodSummary>) -> Self {
        Self {
            node_count: nodes.len(),
            nodes,
            pod_count: pods.len(),
            pods,
        }
    }
}

/// One pod in a [`ClusterContext`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodSummary {
    pub name: String,
    pub namespace: String,
    /// Pod phase (`Running`, `Pending`, ...), empty when unreported.
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nginx() -> WorkloadSpec {
        WorkloadSpec {
            name: "nginx-app".into(),
            namespace: "default".into(),
            image: "nginx:latest".into(),
            replicas: 2,
            port: 80,
        }
    }

    #[test]
    fn success_envelope_omits_cause() {
        let result = DispatchResult::success("Apply request accepted (stubbed)");
        let json = serde_json::to_string(&result).expect("serialize");
        assert_eq!(
            json,
            r#"{"status":"success","message":"Apply request accepted (stubbed)"}"#
        );
    }

    #[test]
    fn failure_envelope_carries_cause() {
        let err = KubeIntentError::invalid_spec("spec.name must be a non-empty string");
        let result = DispatchResult::failure(&err);
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["status"], "failure");
        assert_eq!(json["cause_kind"], "invalid_spec");
        assert!(!result.is_success());
    }

    #[test]
    fn resource_kind_parses_only_deployment() {
        assert_eq!(
            "deployment".parse::<ResourceKind>().unwrap(),
            ResourceKind::Deployment
        );
        let err = "Deployment".parse::<ResourceKind>().unwrap_err();
        assert!(matches!(err, KubeIntentError::UnsupportedResourceKind { .. }));
    }

    #[test]
    fn action_target_and_verb() {
        let create = Action::Create(nginx());
        assert_eq!(create.verb(), "create");
        assert_eq!(create.target().to_string(), "default/nginx-app");

        let delete = Action::Delete(nginx().target());
        assert_eq!(delete.verb(), "delete");
        assert_eq!(delete.target(), create.target());
    }

    #[test]
    fn cluster_context_counts_follow_lists() {
        let ctx = ClusterContext::new(
            vec!["node-a".into(), "node-b".into()],
            vec![PodSummary {
                name: "nginx-app-0".into(),
                namespace: "default".into(),
                status: "Running".into(),
            }],
        );
        assert_eq!(ctx.node_count, 2);
        assert_eq!(ctx.pod_count, 1);
    }
}
