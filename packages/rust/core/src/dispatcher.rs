//! Action dispatch: validated intents → cluster gateway calls.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use kubeintent_shared::{
    Action, ClusterGateway, DispatchResult, Intent, KubeIntentError, ResourceKind,
};

use crate::validator;

/// Message returned for an accepted create.
pub const CREATE_ACCEPTED: &str = "Apply request accepted (stubbed)";
/// Message returned for an accepted delete.
pub const DELETE_ACCEPTED: &str = "Delete request accepted";

/// Routes each intent to exactly one gateway operation.
///
/// Cheap to clone; all clones share the same gateway.
#[derive(Clone)]
pub struct ActionDispatcher {
    gateway: Arc<dyn ClusterGateway>,
}

impl ActionDispatcher {
    pub fn new(gateway: Arc<dyn ClusterGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<dyn ClusterGateway> {
        &self.gateway
    }

    /// Validate `raw` and dispatch it.
    ///
    /// Rejections never reach the gateway.
    pub async fn handle_document(&self, raw: &str) -> DispatchResult {
        match validator::validate(raw) {
            Ok(intent) => self.dispatch(&intent).await,
            Err(err) => {
                warn!(error = %err, "rejected document");
                DispatchResult::failure(&err)
            }
        }
    }

    /// Perform the one gateway call the intent asks for.
    #[instrument(skip_all, fields(
        action = intent.action.verb(),
        kind = intent.kind.as_str(),
        name = %intent.action.target().name,
        namespace = %intent.action.target().namespace,
        gateway = self.gateway.name(),
    ))]
    pub async fn dispatch(&self, intent: &Intent) -> DispatchResult {
        let outcome = match (&intent.kind, &intent.action) {
            (ResourceKind::Deployment, Action::Create(spec)) => self
                .gateway
                .create_or_replace(spec)
                .await
                .map(|()| CREATE_ACCEPTED),
            (ResourceKind::Deployment, Action::Delete(target)) => {
                match self.gateway.delete(&target.name, &target.namespace).await {
                    // The desired state (absent) already holds.
                    Err(KubeIntentError::NotFound { .. }) => {
                        info!("workload already absent");
                        Ok(DELETE_ACCEPTED)
                    }
                    other => other.map(|()| DELETE_ACCEPTED),
                }
            }
        };

        match outcome {
            Ok(message) => {
                info!("dispatched");
                DispatchResult::success(message)
            }
            Err(err) => {
                warn!(error = %err, "gateway call failed");
                DispatchResult::failure(&into_gateway_failure(err))
            }
        }
    }
}

impl std::fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("gateway", &self.gateway.name())
            .finish()
    }
}

/// Anything the gateway reports is a gateway failure, whatever its variant.
fn into_gateway_failure(err: KubeIntentError) -> KubeIntentError {
    match err {
        KubeIntentError::Gateway(_) | KubeIntentError::NotFound { .. } => err,
        other => KubeIntentError::gateway(other.to_string()),
    }
}
