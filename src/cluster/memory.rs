//! Fixed, in-memory object set implementing [`Cluster`].
//!
//! Objects are returned in insertion order. An optional artificial latency
//! makes it possible to exercise discovery deadlines.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Pod, Service};
use kube::ResourceExt;
use std::collections::BTreeSet;
use std::time::Duration;

use crate::cluster::{Cluster, ClusterError, Scope};

#[derive(Debug, Clone, Default)]
pub struct InMemoryCluster {
    deployments: Vec<Deployment>,
    pods: Vec<Pod>,
    services: Vec<Service>,
    namespaces: BTreeSet<String>,
    latency: Option<Duration>,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.insert(namespace.into());
        self
    }

    pub fn with_deployment(mut self, deployment: Deployment) -> Self {
        self.namespaces.insert(deployment.namespace().unwrap_or_default());
        self.deployments.push(deployment);
        self
    }

    pub fn with_pod(mut self, pod: Pod) -> Self {
        self.namespaces.insert(pod.namespace().unwrap_or_default());
        self.pods.push(pod);
        self
    }

    pub fn with_service(mut self, service: Service) -> Self {
        self.namespaces.insert(service.namespace().unwrap_or_default());
        self.services.push(service);
        self
    }

    /// Delay every query by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn wait(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl Cluster for InMemoryCluster {
    async fn deployments_named(&self, scope: &Scope, name: &str) -> Result<Vec<Deployment>, ClusterError> {
        self.wait().await;
        Ok(self
            .deployments
            .iter()
            .filter(|d| d.name_any() == name && scope.contains(d.namespace().as_deref()))
            .cloned()
            .collect())
    }

    async fn list_pods(&self, scope: &Scope) -> Result<Vec<Pod>, ClusterError> {
        self.wait().await;
        Ok(self
            .pods
            .iter()
            .filter(|p| scope.contains(p.namespace().as_deref()))
            .cloned()
            .collect())
    }

    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, ClusterError> {
        self.wait().await;
        Ok(self
            .services
            .iter()
            .filter(|s| s.namespace().as_deref() == Some(namespace))
            .cloned()
            .collect())
    }

    async fn check_namespace(&self, namespace: &str) -> Result<(), ClusterError> {
        self.wait().await;
        if self.namespaces.contains(namespace) {
            Ok(())
        } else {
            Err(ClusterError::NamespaceNotFound(namespace.to_string()))
        }
    }

    async fn check_access(&self) -> Result<(), ClusterError> {
        self.wait().await;
        Ok(())
    }
}
