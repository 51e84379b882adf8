//! The cluster gateway seam.
//!
//! The pipeline never talks to a cluster directly; it hands validated
//! workloads to a [`ClusterGateway`], which owns the session and credential
//! lifecycle.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ClusterContext, WorkloadSpec};

/// Mutations and inventory against the managed workload kind.
///
/// # Errors
///
/// Every method surfaces failures as [`KubeIntentError::Gateway`] with the
/// underlying message. `delete` returns [`KubeIntentError::NotFound`] when
/// the target does not exist and the backend can tell.
///
/// [`KubeIntentError::Gateway`]: crate::KubeIntentError::Gateway
/// [`KubeIntentError::NotFound`]: crate::KubeIntentError::NotFound
#[async_trait]
pub trait ClusterGateway: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Create the workload, or replace it if one with the same name exists.
    async fn create_or_replace(&self, spec: &WorkloadSpec) -> Result<()>;

    /// Delete the workload `name` in `namespace`.
    async fn delete(&self, name: &str, namespace: &str) -> Result<()>;

    /// Summarize nodes and pods across all namespaces.
    async fn context(&self) -> Result<ClusterContext>;
}
