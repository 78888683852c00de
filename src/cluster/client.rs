//! Live cluster access through `kube`.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Pod, Service};
use k8s_openapi::NamespaceResourceScope;
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use crate::cluster::{Cluster, ClusterError, Scope};
use crate::config::ClusterConfig;

/// [`Cluster`] backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from an explicit kubeconfig, or infer one from the
    /// in-cluster service account and the default kubeconfig.
    pub async fn connect(config: &ClusterConfig) -> Result<Self, ClusterError> {
        let kube_config = match &config.kubeconfig {
            Some(path) => {
                let kubeconfig =
                    Kubeconfig::read_from(path).map_err(|e| ClusterError::Config(Box::new(e)))?;
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .map_err(|e| ClusterError::Config(Box::new(e)))?
            }
            None => Config::infer()
                .await
                .map_err(|e| ClusterError::Config(Box::new(e)))?,
        };

        tracing::debug!(cluster_url = %kube_config.cluster_url, "Cluster client configured");

        let client = Client::try_from(kube_config)?;
        Ok(Self::new(client))
    }

    fn scoped<K>(&self, scope: &Scope) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        match scope {
            Scope::All => Api::all(self.client.clone()),
            Scope::Namespace(ns) => Api::namespaced(self.client.clone(), ns),
        }
    }
}

async fn list_all<K>(api: Api<K>, params: &ListParams) -> Result<Vec<K>, ClusterError>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    Ok(api.list(params).await?.items)
}

#[async_trait]
impl Cluster for KubeCluster {
    async fn deployments_named(&self, scope: &Scope, name: &str) -> Result<Vec<Deployment>, ClusterError> {
        let params = ListParams::default().fields(&format!("metadata.name={}", name));
        let deployments = list_all(self.scoped::<Deployment>(scope), &params).await?;

        // The field selector is built from caller input; re-check the name.
        Ok(deployments
            .into_iter()
            .filter(|d| d.metadata.name.as_deref() == Some(name))
            .collect())
    }

    async fn list_pods(&self, scope: &Scope) -> Result<Vec<Pod>, ClusterError> {
        list_all(self.scoped::<Pod>(scope), &ListParams::default()).await
    }

    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, ClusterError> {
        list_all(
            self.scoped::<Service>(&Scope::Namespace(namespace.to_string())),
            &ListParams::default(),
        )
        .await
    }

    async fn check_namespace(&self, namespace: &str) -> Result<(), ClusterError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        match api.get_opt(namespace).await? {
            Some(_) => Ok(()),
            None => Err(ClusterError::NamespaceNotFound(namespace.to_string())),
        }
    }

    async fn check_access(&self) -> Result<(), ClusterError> {
        let version = self.client.apiserver_version().await?;
        tracing::debug!(version = %version.git_version, "API server reachable");
        Ok(())
    }
}
