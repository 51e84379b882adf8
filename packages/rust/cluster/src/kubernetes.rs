//! [`ClusterGateway`] backed by a real Kubernetes API server.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::api::{Api, DeleteParams, ListParams, Patch, PatchParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tokio::sync::OnceCell;
use tracing::{info, instrument, warn};

use kubeintent_shared::{
    ClusterConfig, ClusterContext, ClusterGateway, KubeIntentError, PodSummary, Result,
    WorkloadSpec,
};

use crate::manifest::deployment_manifest;

/// Gateway talking to the cluster described by [`ClusterConfig`].
///
/// The session is established on first use. A failed attempt is not cached,
/// so the next request tries again.
pub struct KubeGateway {
    settings: ClusterConfig,
    client: OnceCell<Client>,
}

impl KubeGateway {
    pub fn new(settings: ClusterConfig) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&Client> {
        self.client
            .get_or_try_init(|| connect(&self.settings))
            .await
    }
}

/// Resolve cluster credentials and open a client.
///
/// Without an explicit kubeconfig or context this is the client's standard
/// inference: in-cluster service account first, then `~/.kube/config`.
async fn connect(settings: &ClusterConfig) -> Result<Client> {
    let options = KubeConfigOptions {
        context: settings.context.clone(),
        ..Default::default()
    };

    let config = match (&settings.kubeconfig, &settings.context) {
        (Some(path), _) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                KubeIntentError::gateway(format!("failed to read kubeconfig {path}: {e}"))
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .map_err(|e| KubeIntentError::gateway(format!("failed to load kubeconfig: {e}")))?
        }
        (None, Some(_)) => Config::from_kubeconfig(&options)
            .await
            .map_err(|e| KubeIntentError::gateway(format!("failed to load kubeconfig: {e}")))?,
        (None, None) => Config::infer().await.map_err(|e| {
            KubeIntentError::gateway(format!("failed to create k8s config: {e}"))
        })?,
    };

    let client = Client::try_from(config)
        .map_err(|e| KubeIntentError::gateway(format!("failed to create cluster client: {e}")))?;
    info!(default_namespace = %client.default_namespace(), "cluster session established");
    Ok(client)
}

#[async_trait]
impl ClusterGateway for KubeGateway {
    fn name(&self) -> &'static str {
        "kubernetes"
    }

    #[instrument(skip_all, fields(name = %spec.name, namespace = %spec.namespace))]
    async fn create_or_replace(&self, spec: &WorkloadSpec) -> Result<()> {
        let client = self.client().await?;
        let api: Api<Deployment> = Api::namespaced(client.clone(), &spec.namespace);
        let params = PatchParams::apply(&self.settings.field_manager).force();

        api.patch(&spec.name, &params, &Patch::Apply(deployment_manifest(spec)))
            .await
            .map_err(|e| KubeIntentError::gateway(e.to_string()))?;

        info!(image = %spec.image, replicas = spec.replicas, "deployment applied");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, name: &str, namespace: &str) -> Result<()> {
        let client = self.client().await?;
        let api: Api<Deployment> = Api::namespaced(client.clone(), namespace);

        match api.delete(name, &DeleteParams::foreground()).await {
            Ok(_) => {
                info!("deployment deletion started");
                Ok(())
            }
            Err(kube::Error::Api(response)) if response.code == 404 => {
                warn!("deployment not found");
                Err(KubeIntentError::NotFound {
                    name: name.to_string(),
                    namespace: namespace.to_string(),
                })
            }
            Err(e) => Err(KubeIntentError::gateway(e.to_string())),
        }
    }

    #[instrument(skip_all)]
    async fn context(&self) -> Result<ClusterContext> {
        let client = self.client().await?;
        let params = ListParams::default();

        let nodes = Api::<Node>::all(client.clone())
            .list(&params)
            .await
            .map_err(|e| KubeIntentError::gateway(e.to_string()))?;
        let pods = Api::<Pod>::all(client.clone())
            .list(&params)
            .await
            .map_err(|e| KubeIntentError::gateway(e.to_string()))?;

        let node_names = nodes
            .items
            .into_iter()
            .filter_map(|node| node.metadata.name)
            .collect();

        let pod_summaries = pods
            .items
            .into_iter()
            .map(|pod| PodSummary {
                name: pod.metadata.name.unwrap_or_default(),
                namespace: pod.metadata.namespace.unwrap_or_default(),
                status: pod.status.and_then(|s| s.phase).unwrap_or_default(),
            })
            .collect();

        Ok(ClusterContext::new(node_names, pod_summaries))
    }
}
