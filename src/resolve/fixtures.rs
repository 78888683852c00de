//! Object builders shared by the resolver tests.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Pod, Service};
use serde_json::{json, Value};

fn object<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).unwrap()
}

pub fn deployment(namespace: &str, name: &str, match_labels: Value) -> Deployment {
    object(json!({
        "metadata": { "name": name, "namespace": namespace },
        "spec": {
            "selector": { "matchLabels": match_labels },
            "template": {}
        }
    }))
}

pub fn pod(namespace: &str, name: &str, labels: Value) -> Pod {
    object(json!({
        "metadata": { "name": name, "namespace": namespace, "labels": labels }
    }))
}

pub fn service(namespace: &str, name: &str, selector: Value, ports: Value) -> Service {
    object(json!({
        "metadata": { "name": name, "namespace": namespace },
        "spec": { "selector": selector, "ports": ports }
    }))
}
