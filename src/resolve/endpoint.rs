//! Service lookup for a resolved workload.
//!
//! # Strategies
//! - Deployment: the first service in the deployment's namespace whose
//!   selector formats identically to the deployment's own selector
//! - Pod: the first service in the pod's namespace whose non-empty selector
//!   matches the pod's labels
//!
//! A service without a selector never matches anything. Ties go to the
//! first service in listing order, which the API server does not guarantee.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Pod, Service};
use kube::ResourceExt;
use std::time::Duration;

use crate::cluster::Cluster;
use crate::resolve::selector::{Labels, Selector};
use crate::resolve::workload::Workload;
use crate::resolve::{deadline, ResolveError};

pub async fn resolve_endpoint(
    cluster: &dyn Cluster,
    workload: &Workload,
    timeout: Duration,
) -> Result<Service, ResolveError> {
    match workload {
        Workload::Deployment(deployment) => by_selector(cluster, deployment, timeout).await,
        Workload::Replica(pod) => by_labels(cluster, pod, timeout).await,
    }
}

fn service_selector(service: &Service) -> Selector {
    let selector = service.spec.as_ref().and_then(|spec| spec.selector.as_ref());
    Selector::from_map(selector.unwrap_or(&Labels::new()))
}

async fn by_selector(
    cluster: &dyn Cluster,
    deployment: &Deployment,
    timeout: Duration,
) -> Result<Service, ResolveError> {
    let namespace = deployment.namespace().unwrap_or_else(|| "default".to_string());
    let name = deployment.name_any();

    let selector = match deployment.spec.as_ref() {
        Some(spec) => Selector::from_label_selector(&spec.selector).map_err(|e| {
            ResolveError::InvalidSelector {
                namespace: namespace.clone(),
                workload: name.clone(),
                reason: e.to_string(),
            }
        })?,
        None => Selector::default(),
    };
    if selector.is_empty() {
        return Err(ResolveError::NoSelectorDefined {
            namespace,
            workload: name,
        });
    }

    let wanted = selector.to_string();
    tracing::debug!(%namespace, deployment = %name, selector = %wanted, "Looking up service by selector");

    let services = deadline(timeout, cluster.list_services(&namespace)).await?;
    services
        .into_iter()
        .find(|svc| service_selector(svc).to_string() == wanted)
        .ok_or(ResolveError::EndpointNotFound {
            namespace,
            workload: name,
        })
}

async fn by_labels(cluster: &dyn Cluster, pod: &Pod, timeout: Duration) -> Result<Service, ResolveError> {
    let namespace = pod.namespace().unwrap_or_else(|| "default".to_string());
    let name = pod.name_any();

    let labels = pod.labels();
    if labels.is_empty() {
        return Err(ResolveError::NoLabelsOnWorkload {
            namespace,
            workload: name,
        });
    }

    let services = deadline(timeout, cluster.list_services(&namespace)).await?;
    if services.is_empty() {
        return Err(ResolveError::NoEndpointsInNamespace { namespace });
    }

    for service in services {
        let selector = service_selector(&service);
        if selector.is_empty() {
            tracing::trace!(service = %service.name_any(), "Skipping service without selector");
            continue;
        }
        if selector.matches(labels) {
            return Ok(service);
        }
    }

    Err(ResolveError::EndpointNotFound {
        namespace,
        workload: name,
    })
}
