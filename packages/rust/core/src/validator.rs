//! Intent validation.
//!
//! Turns a raw request body into an [`Intent`] or rejects it. Checks run in
//! a fixed order and the first violated rule decides the rejection:
//!
//! 1. the body parses as a JSON object (`MalformedDocument`)
//! 2. `action` is `create` or `delete` (`UnrecognizedAction`)
//! 3. `resource_type` is `deployment` (`UnsupportedResourceKind`)
//! 4. `spec` carries what the action needs (`InvalidSpec`)
//!
//! Validation has no side effects.

use serde_json::{Map, Value};

use kubeintent_shared::{
    Action, Intent, KubeIntentError, ResourceKind, Result, WorkloadRef, WorkloadSpec,
};

/// Highest valid container port.
const MAX_PORT: i64 = 65_535;

/// Which action the document asks for, before its spec is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Create,
    Delete,
}

/// Validate a raw request body.
pub fn validate(raw: &str) -> Result<Intent> {
    let document: Value = serde_json::from_str(raw)
        .map_err(|e| KubeIntentError::malformed(format!("not a JSON document: {e}")))?;
    validate_value(&document)
}

/// Validate an already-parsed document.
pub fn validate_value(document: &Value) -> Result<Intent> {
    let fields = document
        .as_object()
        .ok_or_else(|| KubeIntentError::malformed("document must be a JSON object"))?;

    let verb = parse_verb(fields)?;
    let kind = parse_kind(fields)?;

    let spec = fields
        .get("spec")
        .and_then(Value::as_object)
        .ok_or_else(|| KubeIntentError::invalid_spec("spec must be an object"))?;

    let action = match verb {
        Verb::Create => Action::Create(parse_workload(spec)?),
        Verb::Delete => Action::Delete(parse_target(spec)?),
    };

    Ok(Intent { kind, action })
}

fn parse_verb(fields: &Map<String, Value>) -> Result<Verb> {
    match fields.get("action") {
        None | Some(Value::Null) => Err(KubeIntentError::unrecognized_action("action is missing")),
        Some(Value::String(action)) => match action.as_str() {
            "create" => Ok(Verb::Create),
            "delete" => Ok(Verb::Delete),
            other => Err(KubeIntentError::unrecognized_action(format!(
                "'{other}' is not one of create, delete"
            ))),
        },
        Some(other) => Err(KubeIntentError::unrecognized_action(format!(
            "action must be a string, got {other}"
        ))),
    }
}

fn parse_kind(fields: &Map<String, Value>) -> Result<ResourceKind> {
    match fields.get("resource_type") {
        Some(Value::String(kind)) => kind.parse(),
        Some(other) => Err(KubeIntentError::UnsupportedResourceKind {
            kind: other.to_string(),
        }),
        None => Err(KubeIntentError::UnsupportedResourceKind {
            kind: "<missing>".into(),
        }),
    }
}

/// Name + namespace, required by both actions.
fn parse_target(spec: &Map<String, Value>) -> Result<WorkloadRef> {
    Ok(WorkloadRef {
        name: required_str(spec, "name")?,
        namespace: required_str(spec, "namespace")?,
    })
}

/// The full workload, required by `create`.
fn parse_workload(spec: &Map<String, Value>) -> Result<WorkloadSpec> {
    let WorkloadRef { name, namespace } = parse_target(spec)?;
    let image = required_str(spec, "image")?;

    let replicas = required_int(spec, "replicas")?;
    if replicas < 0 {
        return Err(KubeIntentError::invalid_spec(format!(
            "spec.replicas must be non-negative (got {replicas})"
        )));
    }
    let replicas = i32::try_from(replicas).map_err(|_| {
        KubeIntentError::invalid_spec(format!("spec.replicas is too large (got {replicas})"))
    })?;

    let port = required_int(spec, "port")?;
    if !(1..=MAX_PORT).contains(&port) {
        return Err(KubeIntentError::invalid_spec(format!(
            "spec.port must be between 1 and {MAX_PORT} (got {port})"
        )));
    }

    Ok(WorkloadSpec {
        name,
        namespace,
        image,
        replicas,
        // In range after the check above.
        port: port as i32,
    })
}

fn required_str(spec: &Map<String, Value>, field: &str) -> Result<String> {
    spec.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            KubeIntentError::invalid_spec(format!("spec.{field} must be a non-empty string"))
        })
}

fn required_int(spec: &Map<String, Value>, field: &str) -> Result<i64> {
    match spec.get(field) {
        None | Some(Value::Null) => Err(KubeIntentError::invalid_spec(format!(
            "spec.{field} is required"
        ))),
        Some(value) => value.as_i64().ok_or_else(|| {
            KubeIntentError::invalid_spec(format!("spec.{field} must be an integer, got {value}"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_doc() -> Value {
        json!({
            "action": "create",
            "resource_type": "deployment",
            "spec": {
                "name": "nginx-app",
                "namespace": "default",
                "image": "nginx:latest",
                "replicas": 2,
                "port": 80
            }
        })
    }

    fn rejection(doc: &Value) -> KubeIntentError {
        validate(&doc.to_string()).expect_err("document should be rejected")
    }

    #[test]
    fn accepts_create() {
        let intent = validate(&create_doc().to_string()).expect("valid create");
        assert_eq!(intent.kind, ResourceKind::Deployment);
        assert_eq!(
            intent.action,
            Action::Create(WorkloadSpec {
                name: "nginx-app".into(),
                namespace: "default".into(),
                image: "nginx:latest".into(),
                replicas: 2,
                port: 80,
            })
        );
    }

    #[test]
    fn accepts_delete_with_only_name_and_namespace() {
        let doc = json!({
            "action": "delete",
            "resource_type": "deployment",
            "spec": { "name": "nginx-app", "namespace": "default" }
        });
        let intent = validate(&doc.to_string()).expect("valid delete");
        assert_eq!(
            intent.action,
            Action::Delete(WorkloadRef {
                name: "nginx-app".into(),
                namespace: "default".into(),
            })
        );
    }

    #[test]
    fn accepts_zero_replicas() {
        let mut doc = create_doc();
        doc["spec"]["replicas"] = json!(0);
        assert!(validate(&doc.to_string()).is_ok());
    }

    #[test]
    fn rejects_non_json() {
        let err = validate("Sure! Here is your deployment: {").unwrap_err();
        assert!(matches!(err, KubeIntentError::MalformedDocument { .. }));

        let err = validate("").unwrap_err();
        assert!(matches!(err, KubeIntentError::MalformedDocument { .. }));
    }

    #[test]
    fn rejects_non_object() {
        let err = validate(r#"["create","deployment"]"#).unwrap_err();
        assert!(matches!(err, KubeIntentError::MalformedDocument { .. }));
    }

    #[test]
    fn rejects_missing_or_unknown_action() {
        let mut doc = create_doc();
        doc.as_object_mut().unwrap().remove("action");
        assert!(matches!(rejection(&doc), KubeIntentError::UnrecognizedAction { .. }));

        for action in [json!("scale"), json!("CREATE"), json!(""), json!(1), json!(null)] {
            let mut doc = create_doc();
            doc["action"] = action;
            assert!(matches!(rejection(&doc), KubeIntentError::UnrecognizedAction { .. }));
        }
    }

    #[test]
    fn rejects_unsupported_kind() {
        for kind in [json!("statefulset"), json!("Deployment"), json!(7)] {
            let mut doc = create_doc();
            doc["resource_type"] = kind;
            assert!(matches!(
                rejection(&doc),
                KubeIntentError::UnsupportedResourceKind { .. }
            ));
        }

        let mut doc = create_doc();
        doc.as_object_mut().unwrap().remove("resource_type");
        assert!(matches!(
            rejection(&doc),
            KubeIntentError::UnsupportedResourceKind { .. }
        ));
    }

    #[test]
    fn action_is_checked_before_kind() {
        let doc = json!({ "action": "scale", "resource_type": "pod", "spec": {} });
        assert!(matches!(rejection(&doc), KubeIntentError::UnrecognizedAction { .. }));
    }

    #[test]
    fn rejects_create_with_empty_identity() {
        for field in ["name", "namespace"] {
            let mut doc = create_doc();
            doc["spec"][field] = json!("");
            assert!(matches!(rejection(&doc), KubeIntentError::InvalidSpec { .. }));

            let mut doc = create_doc();
            doc["spec"][field] = json!("   ");
            assert!(matches!(rejection(&doc), KubeIntentError::InvalidSpec { .. }));
        }
    }

    #[test]
    fn rejects_negative_or_fractional_replicas() {
        let mut doc = create_doc();
        doc["spec"]["replicas"] = json!(-1);
        let err = rejection(&doc);
        assert!(matches!(err, KubeIntentError::InvalidSpec { .. }));
        assert!(err.to_string().contains("non-negative"));

        let mut doc = create_doc();
        doc["spec"]["replicas"] = json!(1.5);
        assert!(matches!(rejection(&doc), KubeIntentError::InvalidSpec { .. }));

        let mut doc = create_doc();
        doc["spec"]["replicas"] = json!("2");
        assert!(matches!(rejection(&doc), KubeIntentError::InvalidSpec { .. }));

        let mut doc = create_doc();
        doc["spec"]["replicas"] = json!(i64::from(i32::MAX) + 1);
        assert!(matches!(rejection(&doc), KubeIntentError::InvalidSpec { .. }));
    }

    #[test]
    fn rejects_create_without_image_or_port() {
        let mut doc = create_doc();
        doc["spec"].as_object_mut().unwrap().remove("image");
        assert!(matches!(rejection(&doc), KubeIntentError::InvalidSpec { .. }));

        let mut doc = create_doc();
        doc["spec"].as_object_mut().unwrap().remove("port");
        assert!(matches!(rejection(&doc), KubeIntentError::InvalidSpec { .. }));
    }

    #[test]
    fn rejects_out_of_range_port() {
        for port in [0, -80, 65_536] {
            let mut doc = create_doc();
            doc["spec"]["port"] = json!(port);
            let err = rejection(&doc);
            assert!(matches!(err, KubeIntentError::InvalidSpec { .. }));
            assert!(err.to_string().contains("between 1 and 65535"));
        }
    }

    #[test]
    fn rejects_delete_without_namespace() {
        let doc = json!({
            "action": "delete",
            "resource_type": "deployment",
            "spec": { "name": "nginx-app" }
        });
        assert!(matches!(rejection(&doc), KubeIntentError::InvalidSpec { .. }));
    }

    #[test]
    fn rejects_missing_spec() {
        let doc = json!({ "action": "delete", "resource_type": "deployment" });
        assert!(matches!(rejection(&doc), KubeIntentError::InvalidSpec { .. }));
    }
}
