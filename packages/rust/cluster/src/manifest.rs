//! Renders a [`WorkloadSpec`] into an `apps/v1` Deployment object.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, ContainerPort, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};

use kubeintent_shared::WorkloadSpec;

/// Label key used for the selector and the pod template.
pub const APP_LABEL: &str = "app";

/// Build the Deployment for `spec`.
///
/// The workload name is the object name, the container name, and the value
/// of the `app` label that ties the selector to the pod template.
pub fn deployment_manifest(spec: &WorkloadSpec) -> Deployment {
    let labels = BTreeMap::from([(APP_LABEL.to_string(), spec.name.clone())]);

    Deployment {
        metadata: ObjectMeta {
            name: Some(spec.name.clone()),
            namespace: Some(spec.namespace.clone()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(spec.replicas),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: spec.name.clone(),
                        image: Some(spec.image.clone()),
                        ports: Some(vec![ContainerPort {
                            container_port: spec.port,
                            ..Default::default()
                        }]),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
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
    fn manifest_carries_all_five_fields() {
        let deployment = deployment_manifest(&nginx());

        assert_eq!(deployment.metadata.name.as_deref(), Some("nginx-app"));
        assert_eq!(deployment.metadata.namespace.as_deref(), Some("default"));

        let spec = deployment.spec.expect("deployment spec");
        assert_eq!(spec.replicas, Some(2));

        let pod = spec.template.spec.expect("pod spec");
        assert_eq!(pod.containers.len(), 1);
        let container = &pod.containers[0];
        assert_eq!(container.name, "nginx-app");
        assert_eq!(container.image.as_deref(), Some("nginx:latest"));
        let ports = container.ports.as_ref().expect("ports");
        assert_eq!(ports[0].container_port, 80);
    }

    #[test]
    fn selector_matches_template_labels() {
        let deployment = deployment_manifest(&nginx());
        let spec = deployment.spec.expect("deployment spec");

        let selector = spec.selector.match_labels.expect("match labels");
        let template_labels = spec
            .template
            .metadata
            .and_then(|m| m.labels)
            .expect("template labels");

        assert_eq!(selector.get(APP_LABEL).map(String::as_str), Some("nginx-app"));
        assert_eq!(selector, template_labels);
    }

    #[test]
    fn manifest_serializes_with_type_meta() {
        let json = serde_json::to_value(deployment_manifest(&nginx())).expect("serialize");
        assert_eq!(json["apiVersion"], "apps/v1");
        assert_eq!(json["kind"], "Deployment");
        assert_eq!(json["spec"]["template"]["spec"]["containers"][0]["ports"][0]["containerPort"], 80);
    }
}
